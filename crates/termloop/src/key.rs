//! Keyboard input handling.
//!
//! Key presses reach a model as [`KeyMsg`] values. The `Display`
//! implementation produces the canonical binding string (`"enter"`,
//! `"shift+tab"`, `"ctrl+c"`, `"a"`), which is what [`crate::Binding`]
//! matches against.

use std::fmt;

/// Keyboard key event message.
///
/// # Example
///
/// ```rust
/// use termloop::{KeyMsg, KeyType};
///
/// let key = KeyMsg::from_type(KeyType::ShiftTab);
/// assert_eq!(key.to_string(), "shift+tab");
///
/// let key = KeyMsg::from_char('y');
/// assert_eq!(key.to_string(), "y");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMsg {
    /// The type of key pressed.
    pub key_type: KeyType,
    /// For [`KeyType::Runes`], the characters typed.
    pub runes: Vec<char>,
    /// Whether Alt was held.
    pub alt: bool,
    /// Whether this came from a paste operation.
    pub paste: bool,
}

impl KeyMsg {
    /// Create a new key message from a key type.
    pub fn from_type(key_type: KeyType) -> Self {
        Self {
            key_type,
            runes: Vec::new(),
            alt: false,
            paste: false,
        }
    }

    /// Create a new key message from a character.
    ///
    /// A space character becomes [`KeyType::Space`].
    pub fn from_char(c: char) -> Self {
        if c == ' ' {
            return Self::from_type(KeyType::Space);
        }
        Self {
            key_type: KeyType::Runes,
            runes: vec![c],
            alt: false,
            paste: false,
        }
    }

    /// Create a new key message from multiple characters (e.g. a paste).
    pub fn from_runes(runes: Vec<char>) -> Self {
        Self {
            key_type: KeyType::Runes,
            runes,
            alt: false,
            paste: false,
        }
    }

    /// Set the alt modifier.
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Set the paste flag.
    pub fn with_paste(mut self) -> Self {
        self.paste = true;
        self
    }
}

impl fmt::Display for KeyMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.key_type == KeyType::Runes {
            if self.paste {
                write!(f, "[")?;
            }
            for c in &self.runes {
                write!(f, "{c}")?;
            }
            if self.paste {
                write!(f, "]")?;
            }
            Ok(())
        } else {
            write!(f, "{}", self.key_type)
        }
    }
}

/// Key type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Regular character(s) input.
    Runes,
    /// Ctrl+A.
    CtrlA,
    /// Ctrl+B.
    CtrlB,
    /// Ctrl+C.
    CtrlC,
    /// Ctrl+D.
    CtrlD,
    /// Ctrl+E.
    CtrlE,
    /// Ctrl+F.
    CtrlF,
    /// Ctrl+G.
    CtrlG,
    /// Ctrl+J.
    CtrlJ,
    /// Ctrl+K.
    CtrlK,
    /// Ctrl+L.
    CtrlL,
    /// Ctrl+N.
    CtrlN,
    /// Ctrl+O.
    CtrlO,
    /// Ctrl+P.
    CtrlP,
    /// Ctrl+Q.
    CtrlQ,
    /// Ctrl+R.
    CtrlR,
    /// Ctrl+S.
    CtrlS,
    /// Ctrl+T.
    CtrlT,
    /// Ctrl+U.
    CtrlU,
    /// Ctrl+V.
    CtrlV,
    /// Ctrl+W.
    CtrlW,
    /// Ctrl+X.
    CtrlX,
    /// Ctrl+Y.
    CtrlY,
    /// Ctrl+Z.
    CtrlZ,
    /// Tab.
    Tab,
    /// Shift+Tab.
    ShiftTab,
    /// Enter.
    Enter,
    /// Escape.
    Esc,
    /// Backspace.
    Backspace,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
    /// Space bar.
    Space,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Right arrow.
    Right,
    /// Left arrow.
    Left,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up.
    PgUp,
    /// Page Down.
    PgDown,
    /// F1.
    F1,
    /// F2.
    F2,
    /// F3.
    F3,
    /// F4.
    F4,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::Runes => "runes",
            KeyType::CtrlA => "ctrl+a",
            KeyType::CtrlB => "ctrl+b",
            KeyType::CtrlC => "ctrl+c",
            KeyType::CtrlD => "ctrl+d",
            KeyType::CtrlE => "ctrl+e",
            KeyType::CtrlF => "ctrl+f",
            KeyType::CtrlG => "ctrl+g",
            KeyType::CtrlJ => "ctrl+j",
            KeyType::CtrlK => "ctrl+k",
            KeyType::CtrlL => "ctrl+l",
            KeyType::CtrlN => "ctrl+n",
            KeyType::CtrlO => "ctrl+o",
            KeyType::CtrlP => "ctrl+p",
            KeyType::CtrlQ => "ctrl+q",
            KeyType::CtrlR => "ctrl+r",
            KeyType::CtrlS => "ctrl+s",
            KeyType::CtrlT => "ctrl+t",
            KeyType::CtrlU => "ctrl+u",
            KeyType::CtrlV => "ctrl+v",
            KeyType::CtrlW => "ctrl+w",
            KeyType::CtrlX => "ctrl+x",
            KeyType::CtrlY => "ctrl+y",
            KeyType::CtrlZ => "ctrl+z",
            KeyType::Tab => "tab",
            KeyType::ShiftTab => "shift+tab",
            KeyType::Enter => "enter",
            KeyType::Esc => "esc",
            KeyType::Backspace => "backspace",
            KeyType::Delete => "delete",
            KeyType::Insert => "insert",
            KeyType::Space => " ",
            KeyType::Up => "up",
            KeyType::Down => "down",
            KeyType::Right => "right",
            KeyType::Left => "left",
            KeyType::Home => "home",
            KeyType::End => "end",
            KeyType::PgUp => "pgup",
            KeyType::PgDown => "pgdown",
            KeyType::F1 => "f1",
            KeyType::F2 => "f2",
            KeyType::F3 => "f3",
            KeyType::F4 => "f4",
        };
        write!(f, "{name}")
    }
}

fn ctrl_key_type(c: char) -> Option<KeyType> {
    let kt = match c.to_ascii_lowercase() {
        'a' => KeyType::CtrlA,
        'b' => KeyType::CtrlB,
        'c' => KeyType::CtrlC,
        'd' => KeyType::CtrlD,
        'e' => KeyType::CtrlE,
        'f' => KeyType::CtrlF,
        'g' => KeyType::CtrlG,
        'h' => KeyType::Backspace,
        'i' => KeyType::Tab,
        'j' => KeyType::CtrlJ,
        'k' => KeyType::CtrlK,
        'l' => KeyType::CtrlL,
        'm' => KeyType::Enter,
        'n' => KeyType::CtrlN,
        'o' => KeyType::CtrlO,
        'p' => KeyType::CtrlP,
        'q' => KeyType::CtrlQ,
        'r' => KeyType::CtrlR,
        's' => KeyType::CtrlS,
        't' => KeyType::CtrlT,
        'u' => KeyType::CtrlU,
        'v' => KeyType::CtrlV,
        'w' => KeyType::CtrlW,
        'x' => KeyType::CtrlX,
        'y' => KeyType::CtrlY,
        'z' => KeyType::CtrlZ,
        _ => return None,
    };
    Some(kt)
}

/// Map a raw control byte to its key type.
pub(crate) fn control_key_type(byte: u8) -> Option<KeyType> {
    match byte {
        0x08 | 0x7F => Some(KeyType::Backspace),
        0x09 => Some(KeyType::Tab),
        0x0D => Some(KeyType::Enter),
        0x1B => Some(KeyType::Esc),
        0x20 => Some(KeyType::Space),
        0x01..=0x1A => ctrl_key_type(char::from(b'a' + byte - 1)),
        _ => None,
    }
}

/// Convert a crossterm key event into a [`KeyMsg`].
pub fn from_crossterm_key(
    code: crossterm::event::KeyCode,
    modifiers: crossterm::event::KeyModifiers,
) -> KeyMsg {
    use crossterm::event::{KeyCode, KeyModifiers};

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let alt = modifiers.contains(KeyModifiers::ALT);

    let key = match code {
        KeyCode::Char(c) if ctrl => match ctrl_key_type(c) {
            Some(kt) => KeyMsg::from_type(kt),
            None => KeyMsg::from_char(c),
        },
        KeyCode::Char(c) => KeyMsg::from_char(c),
        KeyCode::Enter => KeyMsg::from_type(KeyType::Enter),
        KeyCode::Backspace => KeyMsg::from_type(KeyType::Backspace),
        KeyCode::Tab if shift => KeyMsg::from_type(KeyType::ShiftTab),
        KeyCode::BackTab => KeyMsg::from_type(KeyType::ShiftTab),
        KeyCode::Tab => KeyMsg::from_type(KeyType::Tab),
        KeyCode::Esc => KeyMsg::from_type(KeyType::Esc),
        KeyCode::Delete => KeyMsg::from_type(KeyType::Delete),
        KeyCode::Insert => KeyMsg::from_type(KeyType::Insert),
        KeyCode::Up => KeyMsg::from_type(KeyType::Up),
        KeyCode::Down => KeyMsg::from_type(KeyType::Down),
        KeyCode::Left => KeyMsg::from_type(KeyType::Left),
        KeyCode::Right => KeyMsg::from_type(KeyType::Right),
        KeyCode::Home => KeyMsg::from_type(KeyType::Home),
        KeyCode::End => KeyMsg::from_type(KeyType::End),
        KeyCode::PageUp => KeyMsg::from_type(KeyType::PgUp),
        KeyCode::PageDown => KeyMsg::from_type(KeyType::PgDown),
        KeyCode::F(1) => KeyMsg::from_type(KeyType::F1),
        KeyCode::F(2) => KeyMsg::from_type(KeyType::F2),
        KeyCode::F(3) => KeyMsg::from_type(KeyType::F3),
        KeyCode::F(4) => KeyMsg::from_type(KeyType::F4),
        _ => KeyMsg::from_runes(Vec::new()),
    };

    if alt { key.with_alt() } else { key }
}

const SEQUENCES: &[(&[u8], KeyType)] = &[
    (b"\x1b[A", KeyType::Up),
    (b"\x1b[B", KeyType::Down),
    (b"\x1b[C", KeyType::Right),
    (b"\x1b[D", KeyType::Left),
    (b"\x1bOA", KeyType::Up),
    (b"\x1bOB", KeyType::Down),
    (b"\x1bOC", KeyType::Right),
    (b"\x1bOD", KeyType::Left),
    (b"\x1b[H", KeyType::Home),
    (b"\x1b[F", KeyType::End),
    (b"\x1b[1~", KeyType::Home),
    (b"\x1b[4~", KeyType::End),
    (b"\x1b[2~", KeyType::Insert),
    (b"\x1b[3~", KeyType::Delete),
    (b"\x1b[5~", KeyType::PgUp),
    (b"\x1b[6~", KeyType::PgDown),
    (b"\x1b[Z", KeyType::ShiftTab),
    (b"\x1bOP", KeyType::F1),
    (b"\x1bOQ", KeyType::F2),
    (b"\x1bOR", KeyType::F3),
    (b"\x1bOS", KeyType::F4),
];

/// Decode a known escape sequence at the start of `buf`.
///
/// Returns the key and the number of bytes consumed.
pub(crate) fn parse_sequence_prefix(buf: &[u8]) -> Option<(KeyMsg, usize)> {
    SEQUENCES
        .iter()
        .filter(|(seq, _)| buf.starts_with(seq))
        .max_by_key(|(seq, _)| seq.len())
        .map(|(seq, kt)| (KeyMsg::from_type(*kt), seq.len()))
}

/// Returns true if `buf` is a strict prefix of some known escape sequence.
pub(crate) fn is_sequence_prefix(buf: &[u8]) -> bool {
    SEQUENCES
        .iter()
        .any(|(seq, _)| seq.len() > buf.len() && seq.starts_with(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_key_msg_display() {
        assert_eq!(KeyMsg::from_type(KeyType::Enter).to_string(), "enter");
        assert_eq!(KeyMsg::from_char('a').to_string(), "a");
        assert_eq!(KeyMsg::from_char('a').with_alt().to_string(), "alt+a");
        assert_eq!(KeyMsg::from_char(' ').to_string(), " ");

        let key = KeyMsg::from_runes(vec!['h', 'i']).with_paste();
        assert_eq!(key.to_string(), "[hi]");
    }

    #[test]
    fn test_from_crossterm_ctrl() {
        let key = from_crossterm_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key.key_type, KeyType::CtrlC);

        let key = from_crossterm_key(KeyCode::Tab, KeyModifiers::SHIFT);
        assert_eq!(key.to_string(), "shift+tab");

        let key = from_crossterm_key(KeyCode::Enter, KeyModifiers::ALT);
        assert_eq!(key.to_string(), "alt+enter");
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(control_key_type(0x03), Some(KeyType::CtrlC));
        assert_eq!(control_key_type(0x0D), Some(KeyType::Enter));
        assert_eq!(control_key_type(0x09), Some(KeyType::Tab));
        assert_eq!(control_key_type(0x7F), Some(KeyType::Backspace));
        assert_eq!(control_key_type(b'a'), None);
    }

    #[test]
    fn test_parse_sequence_prefix() {
        let (key, len) = parse_sequence_prefix(b"\x1b[Zrest").unwrap();
        assert_eq!(key.key_type, KeyType::ShiftTab);
        assert_eq!(len, 3);

        let (key, len) = parse_sequence_prefix(b"\x1b[3~").unwrap();
        assert_eq!(key.key_type, KeyType::Delete);
        assert_eq!(len, 4);

        assert!(parse_sequence_prefix(b"abc").is_none());
    }

    #[test]
    fn test_is_sequence_prefix() {
        assert!(is_sequence_prefix(b"\x1b["));
        assert!(is_sequence_prefix(b"\x1b[3"));
        assert!(!is_sequence_prefix(b"\x1b[A"));
        assert!(!is_sequence_prefix(b"x"));
    }
}
