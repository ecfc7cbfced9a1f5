use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A physical key, independent of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Space,
    Enter,
    Tab,
    Backspace,
    Delete,
    /// Function key F1..F12.
    F(u8),
    /// A printable key. `Key` constructors fold it to lowercase.
    Char(char),
}

/// A key plus the control modifier, e.g. `control-\``.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    pub code: KeyCode,
    pub control: bool,
}

impl KeyCode {
    /// Folds printable keys to lowercase; other codes pass through.
    pub const fn normalized(self) -> Self {
        match self {
            Self::Char(c) => Self::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

impl Key {
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code: code.normalized(),
            control: false,
        }
    }

    pub const fn control(code: KeyCode) -> Self {
        Self {
            code: code.normalized(),
            control: true,
        }
    }

    /// A printable key; `'L'` and `'l'` name the same key.
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    /// The same key without modifiers.
    pub fn bare(self) -> Self {
        Self::new(self.code)
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Errors from parsing a key name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("empty key name")]
    Empty,
    #[error("unknown key name '{0}'")]
    Unknown(String),
}

impl FromStr for KeyCode {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let code = match lower.as_str() {
            "" => return Err(KeyParseError::Empty),
            "arrow_up" => Self::ArrowUp,
            "arrow_down" => Self::ArrowDown,
            "arrow_left" => Self::ArrowLeft,
            "arrow_right" => Self::ArrowRight,
            "escape" => Self::Escape,
            "space" => Self::Space,
            "enter" => Self::Enter,
            "tab" => Self::Tab,
            "backspace" => Self::Backspace,
            "delete" => Self::Delete,
            other => {
                if let Some(n) = other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    if (1..=12).contains(&n) {
                        return Ok(Self::F(n));
                    }
                }
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_whitespace() => Self::Char(c),
                    _ => return Err(KeyParseError::Unknown(s.to_string())),
                }
            }
        };
        Ok(code)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArrowUp => f.write_str("arrow_up"),
            Self::ArrowDown => f.write_str("arrow_down"),
            Self::ArrowLeft => f.write_str("arrow_left"),
            Self::ArrowRight => f.write_str("arrow_right"),
            Self::Escape => f.write_str("escape"),
            Self::Space => f.write_str("space"),
            Self::Enter => f.write_str("enter"),
            Self::Tab => f.write_str("tab"),
            Self::Backspace => f.write_str("backspace"),
            Self::Delete => f.write_str("delete"),
            Self::F(n) => write!(f, "f{n}"),
            Self::Char(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "control--" is control plus the minus key.
        match s.strip_prefix("control-") {
            Some(rest) if !rest.is_empty() => Ok(Self::control(rest.parse()?)),
            _ => Ok(Self::new(s.parse()?)),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.control {
            f.write_str("control-")?;
        }
        write!(f, "{}", self.code)
    }
}

impl TryFrom<String> for Key {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,
}

/// A key transition delivered by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub state: KeyState,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Released,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_binding_names() {
        assert_eq!("arrow_up".parse::<Key>(), Ok(Key::new(KeyCode::ArrowUp)));
        assert_eq!("f1".parse::<Key>(), Ok(Key::new(KeyCode::F(1))));
        assert_eq!("escape".parse::<Key>(), Ok(Key::new(KeyCode::Escape)));
        assert_eq!("t".parse::<Key>(), Ok(Key::char('t')));
        assert_eq!(
            "control-`".parse::<Key>(),
            Ok(Key::control(KeyCode::Char('`')))
        );
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!("".parse::<Key>(), Err(KeyParseError::Empty));
        assert!(matches!("f13".parse::<Key>(), Err(KeyParseError::Unknown(_))));
        assert!(matches!("hyper".parse::<Key>(), Err(KeyParseError::Unknown(_))));
    }

    #[test]
    fn display_matches_parse() {
        for name in ["arrow_left", "f12", "control-`", "space", "q"] {
            assert_eq!(name.parse::<Key>().unwrap().to_string(), name);
        }
    }

    #[test]
    fn control_minus_is_a_chord() {
        assert_eq!(
            "control--".parse::<Key>(),
            Ok(Key::control(KeyCode::Char('-')))
        );
        assert_eq!("-".parse::<Key>(), Ok(Key::char('-')));
    }

    #[test]
    fn char_keys_fold_to_lowercase() {
        let key = Key::char('L');
        assert_eq!(key, Key::char('l'));
        assert_eq!(key.to_string().parse::<Key>(), Ok(key));
        assert_eq!(Key::control(KeyCode::Char('Q')), "control-q".parse().unwrap());
    }

    #[test]
    fn bare_strips_control() {
        assert_eq!(Key::control(KeyCode::Tab).bare(), Key::new(KeyCode::Tab));
    }
}
