use std::io::{self, IsTerminal, Read};

use anyhow::{bail, Context};
use clap::Args;

use lumen_core::{parse_rows, HistoryStore, Registry, RowFormat};
use lumen_platform::Platform;
use lumen_tui::root::ROOT_TITLE;
use lumen_tui::{ListPage, Page, Session};

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Column delimiter of each row
    #[arg(short, long, default_value = "\t", conflicts_with = "json")]
    pub delimiter: String,

    /// Columns shown as title, subtitle, then accessories (1-based, 0 leaves a blank)
    #[arg(long, value_delimiter = ',', conflicts_with = "json")]
    pub with_nth: Option<Vec<usize>>,

    /// Read every row as a JSON list item
    #[arg(long)]
    pub json: bool,

    /// Title of the list
    #[arg(long, default_value = ROOT_TITLE)]
    pub title: String,
}

impl FilterArgs {
    fn format(&self) -> RowFormat {
        if self.json {
            RowFormat::Json
        } else {
            RowFormat::Delimited {
                delimiter: self.delimiter.clone(),
                with_nth: self.with_nth.clone(),
            }
        }
    }
}

/// `lumen filter`: pick a row from stdin; the chosen row is printed once the
/// terminal is restored.
pub fn run(platform: Platform, args: FilterArgs) -> anyhow::Result<()> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("no input: pipe rows into `lumen filter`");
    }

    let mut input = String::new();
    stdin
        .lock()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    let items = parse_rows(&input, &args.format())?;
    tracing::debug!(rows = items.len(), "filtering rows");

    let session = Session::new(Registry::default(), platform, HistoryStore::new());
    let page = Page::List(ListPage::new(args.title, items));
    super::interactive(session, page)
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use lumen_core::RowFormat;

    fn parse(args: &[&str]) -> Result<RowFormat, clap::Error> {
        match Cli::try_parse_from(args)?.command {
            Some(Commands::Filter(filter)) => Ok(filter.format()),
            _ => panic!("expected filter command"),
        }
    }

    #[test]
    fn test_defaults_to_tab_rows() {
        assert_eq!(parse(&["lumen", "filter"]).unwrap(), RowFormat::default());
    }

    #[test]
    fn test_with_nth_is_comma_separated() {
        let format = parse(&["lumen", "filter", "-d", ",", "--with-nth", "2,0,1"]).unwrap();
        assert_eq!(
            format,
            RowFormat::Delimited {
                delimiter: ",".to_string(),
                with_nth: Some(vec![2, 0, 1]),
            }
        );
    }

    #[test]
    fn test_json_excludes_columns() {
        assert_eq!(parse(&["lumen", "filter", "--json"]).unwrap(), RowFormat::Json);

        let err = parse(&["lumen", "filter", "--json", "--with-nth", "1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        let err = parse(&["lumen", "filter", "--json", "-d", ","]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
