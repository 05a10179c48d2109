//! Keyboard shortcut matching for action shortcuts such as `ctrl+y`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Parse a shortcut like `ctrl+shift+o`, `alt+enter` or `f5`.
pub fn parse_shortcut(shortcut: &str) -> Option<(KeyCode, KeyModifiers)> {
    let mut modifiers = KeyModifiers::NONE;
    let mut parts: Vec<&str> = shortcut.split('+').map(str::trim).collect();
    let key = parts.pop()?;

    for part in parts {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" | "option" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    let code = match key.to_ascii_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        name if name.len() > 1 && name.starts_with('f') => KeyCode::F(name[1..].parse().ok()?),
        name => {
            let mut chars = name.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(c)
        }
    };

    Some((code, modifiers))
}

/// Whether `key` triggers `shortcut`. Letter case is ignored.
pub fn matches_shortcut(shortcut: &str, key: &KeyEvent) -> bool {
    let Some((code, modifiers)) = parse_shortcut(shortcut) else {
        return false;
    };

    match (code, key.code) {
        (KeyCode::Char(expected), KeyCode::Char(actual)) => {
            expected.eq_ignore_ascii_case(&actual)
                && without_shift(modifiers) == without_shift(key.modifiers)
        }
        (expected, actual) => expected == actual && modifiers == key.modifiers,
    }
}

/// Whether `key` types a character into a query.
pub fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(c)
        }
        _ => None,
    }
}

pub fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn without_shift(modifiers: KeyModifiers) -> KeyModifiers {
    modifiers.difference(KeyModifiers::SHIFT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            parse_shortcut("ctrl+y"),
            Some((KeyCode::Char('y'), KeyModifiers::CONTROL))
        );
        assert_eq!(
            parse_shortcut("alt+shift+enter"),
            Some((KeyCode::Enter, KeyModifiers::ALT | KeyModifiers::SHIFT))
        );
        assert_eq!(parse_shortcut("f5"), Some((KeyCode::F(5), KeyModifiers::NONE)));
        assert_eq!(parse_shortcut("hyper+x"), None);
        assert_eq!(parse_shortcut("ctrl+xy"), None);
    }

    #[test]
    fn test_matches() {
        assert!(matches_shortcut(
            "ctrl+y",
            &key(KeyCode::Char('y'), KeyModifiers::CONTROL)
        ));
        assert!(matches_shortcut(
            "ctrl+Y",
            &key(KeyCode::Char('y'), KeyModifiers::CONTROL | KeyModifiers::SHIFT)
        ));
        assert!(!matches_shortcut("ctrl+y", &key(KeyCode::Char('y'), KeyModifiers::NONE)));
        assert!(matches_shortcut("enter", &key(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn test_typed_char() {
        assert_eq!(typed_char(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)), Some('A'));
        assert_eq!(typed_char(&key(KeyCode::Char('a'), KeyModifiers::CONTROL)), None);
        assert!(is_ctrl(&key(KeyCode::Char('n'), KeyModifiers::CONTROL), 'n'));
    }
}
