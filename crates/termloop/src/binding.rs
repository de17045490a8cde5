//! Key bindings and matching.
//!
//! # Example
//!
//! ```rust
//! use termloop::binding::{Binding, matches};
//!
//! let up = Binding::new().keys(&["k", "up"]).help("↑/k", "move up");
//! let down = Binding::new().keys(&["j", "down"]).help("↓/j", "move down");
//!
//! assert!(matches("k", &[&up, &down]));
//! assert!(matches("down", &[&up, &down]));
//! assert!(!matches("x", &[&up, &down]));
//! ```

use std::fmt;

use crate::key::KeyMsg;

/// Help information for a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// The key(s) shown in help text, e.g. `"↑/k"`.
    pub key: String,
    /// What the binding does.
    pub desc: String,
}

impl Help {
    /// Creates new help information.
    #[must_use]
    pub fn new(key: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            desc: desc.into(),
        }
    }
}

/// A key binding with associated help text.
///
/// A binding is enabled when it has at least one key and has not been
/// switched off with [`Binding::set_enabled`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    keys: Vec<String>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates a new empty binding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the keys for this binding.
    #[must_use]
    pub fn keys(mut self, keys: &[&str]) -> Self {
        self.keys = keys.iter().map(|&s| s.to_string()).collect();
        self
    }

    /// Sets the help text for this binding.
    #[must_use]
    pub fn help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help::new(key, desc);
        self
    }

    /// Returns the keys for this binding.
    #[must_use]
    pub fn get_keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the help information for this binding.
    #[must_use]
    pub fn get_help(&self) -> &Help {
        &self.help
    }

    /// Returns whether this binding is enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding in place.
    pub fn enable(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// Enables or disables the binding (builder version).
    #[must_use]
    pub fn set_enabled(mut self, enabled: bool) -> Self {
        self.disabled = !enabled;
        self
    }

    /// Returns true if the key message triggers this binding.
    #[must_use]
    pub fn matches_key(&self, key: &KeyMsg) -> bool {
        matches(key, &[self])
    }
}

/// Checks if the given key matches any of the given enabled bindings.
pub fn matches<K: fmt::Display>(key: K, bindings: &[&Binding]) -> bool {
    let key_str = key.to_string();
    bindings
        .iter()
        .filter(|b| b.enabled())
        .any(|b| b.keys.iter().any(|k| *k == key_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyType;

    #[test]
    fn test_binding_enabled() {
        let b = Binding::new().keys(&["q"]);
        assert!(b.enabled());

        let b = b.set_enabled(false);
        assert!(!b.enabled());

        let empty = Binding::new();
        assert!(!empty.enabled());
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let b = Binding::new().keys(&["enter"]).set_enabled(false);
        assert!(!b.matches_key(&KeyMsg::from_type(KeyType::Enter)));
    }

    #[test]
    fn test_matches_key_message() {
        let next = Binding::new().keys(&["enter", "tab"]).help("enter", "next");
        assert!(next.matches_key(&KeyMsg::from_type(KeyType::Tab)));
        assert!(next.matches_key(&KeyMsg::from_type(KeyType::Enter)));
        assert!(!next.matches_key(&KeyMsg::from_type(KeyType::ShiftTab)));
        assert_eq!(next.get_help().desc, "next");
    }

    #[test]
    fn test_enable_in_place() {
        let mut b = Binding::new().keys(&["x"]);
        b.enable(false);
        assert!(!matches("x", &[&b]));
        b.enable(true);
        assert!(matches("x", &[&b]));
    }
}
