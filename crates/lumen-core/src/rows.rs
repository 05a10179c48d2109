//! Turning text rows into list items for `lumen filter`.

use crate::error::{LumenError, LumenResult};
use crate::page::{Action, Effect, ListItem};

/// How each input row is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFormat {
    /// Columns split on `delimiter`. `with_nth` picks columns by 1-based
    /// index for title, subtitle, then accessories; 0 means blank.
    Delimited {
        delimiter: String,
        with_nth: Option<Vec<usize>>,
    },
    /// Each row is a JSON list item.
    Json,
}

impl Default for RowFormat {
    fn default() -> Self {
        RowFormat::Delimited {
            delimiter: "\t".to_string(),
            with_nth: None,
        }
    }
}

/// Parse `input` into list items, one per line.
///
/// Delimited rows get a "Confirm" action printing the raw row. JSON rows keep
/// their own actions and only get "Confirm" when they declare none.
pub fn parse_rows(input: &str, format: &RowFormat) -> LumenResult<Vec<ListItem>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(LumenError::EmptyInput);
    }

    input
        .lines()
        .enumerate()
        .map(|(index, row)| {
            let mut item = match format {
                RowFormat::Json => serde_json::from_str::<ListItem>(row)
                    .map_err(|e| LumenError::InvalidPage(format!("row {}: {}", index + 1, e)))?,
                RowFormat::Delimited {
                    delimiter,
                    with_nth,
                } => columns(row, delimiter, with_nth.as_deref()),
            };

            if item.id.is_empty() {
                item.id = format!("#{}", index);
            }
            if item.actions.is_empty() {
                item.actions.push(Action::new(
                    "Confirm",
                    Effect::Print {
                        text: row.to_string(),
                    },
                ));
            }
            Ok(item)
        })
        .collect()
}

fn columns(row: &str, delimiter: &str, with_nth: Option<&[usize]>) -> ListItem {
    let tokens: Vec<&str> = if delimiter.is_empty() {
        vec![row]
    } else {
        row.split(delimiter).collect()
    };

    let picked: Vec<String> = match with_nth {
        Some(indexes) if !indexes.is_empty() => {
            indexes.iter().map(|&n| nth(&tokens, n).to_string()).collect()
        }
        _ => tokens.iter().map(|t| t.to_string()).collect(),
    };

    let mut picked = picked.into_iter();
    ListItem {
        title: picked.next().unwrap_or_default(),
        subtitle: picked.next().unwrap_or_default(),
        accessories: picked.collect(),
        ..Default::default()
    }
}

fn nth<'a>(tokens: &[&'a str], index: usize) -> &'a str {
    if index == 0 {
        return "";
    }
    tokens.get(index - 1).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delimited(delimiter: &str, with_nth: Option<Vec<usize>>) -> RowFormat {
        RowFormat::Delimited {
            delimiter: delimiter.to_string(),
            with_nth,
        }
    }

    #[test]
    fn test_tab_separated_columns() {
        let items = parse_rows("main.rs\tsrc\t4kb\tmodified\nlib.rs\n", &RowFormat::default()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "main.rs");
        assert_eq!(items[0].subtitle, "src");
        assert_eq!(items[0].accessories, vec!["4kb", "modified"]);
        assert_eq!(items[1].title, "lib.rs");
        assert!(items[1].subtitle.is_empty());
        assert_eq!(items[1].id, "#1");

        match items[0].actions[0].effect {
            Effect::Print { ref text } => assert_eq!(text, "main.rs\tsrc\t4kb\tmodified"),
            ref other => panic!("expected print action, got {:?}", other),
        }
        assert_eq!(items[0].actions[0].title, "Confirm");
    }

    #[test]
    fn test_with_nth_picks_columns() {
        let items = parse_rows("a,b,c", &delimited(",", Some(vec![3, 0, 1, 9]))).unwrap();

        assert_eq!(items[0].title, "c");
        assert_eq!(items[0].subtitle, "");
        assert_eq!(items[0].accessories, vec!["a", ""]);
    }

    #[test]
    fn test_json_rows() {
        let input = r#"{"title": "one", "subtitle": "first"}
{"id": "two", "title": "two", "actions": [{"type": "copy", "title": "Copy", "text": "2"}]}"#;
        let items = parse_rows(input, &RowFormat::Json).unwrap();

        assert_eq!(items[0].subtitle, "first");
        assert_eq!(items[0].actions[0].title, "Confirm");
        assert_eq!(items[1].id, "two");
        assert!(matches!(items[1].actions[0].effect, Effect::Copy { .. }));
    }

    #[test]
    fn test_invalid_json_row_names_line() {
        let err = parse_rows("{\"title\": \"ok\"}\nnot json", &RowFormat::Json).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(
            parse_rows("  \n\n", &RowFormat::default()),
            Err(LumenError::EmptyInput)
        ));
    }
}
