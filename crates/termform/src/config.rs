//! Form configuration that can be loaded from TOML or the environment.
//!
//! [`FormConfig`] carries the same options as the [`Form`](crate::Form)
//! builder methods, in a serializable shape:
//!
//! ```toml
//! width = 60
//! theme = "dracula"
//! timeout_ms = 30000
//!
//! [layout]
//! kind = "columns"
//! columns = 2
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FormError, Result};
use crate::layout::{self, Layout};
use crate::theme::ThemeName;

/// Serializable form options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Form width in columns. `None` uses the terminal width.
    pub width: Option<usize>,
    /// Height every group is clipped to. `None` leaves groups unclipped.
    pub height: Option<usize>,
    pub show_help: bool,
    pub show_errors: bool,
    pub theme: ThemeName,
    pub layout: LayoutKind,
    /// Run as line-oriented prompts instead of the interactive loop.
    pub accessible: bool,
    /// Deadline in milliseconds; 0 disables it.
    pub timeout_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            show_help: true,
            show_errors: true,
            theme: ThemeName::default(),
            layout: LayoutKind::default(),
            accessible: false,
            timeout_ms: 0,
        }
    }
}

/// Layout choice as it appears in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Default,
    Stack,
    Columns { columns: usize },
    Grid { rows: usize, columns: usize },
}

impl LayoutKind {
    pub fn build(self) -> Box<dyn Layout> {
        match self {
            Self::Default => Box::new(layout::default()),
            Self::Stack => Box::new(layout::stack()),
            Self::Columns { columns } => Box::new(layout::columns(columns)),
            Self::Grid { rows, columns } => Box::new(layout::grid(rows, columns)),
        }
    }
}

impl FormConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|err| FormError::config(err.message()))
    }

    /// Defaults overridden by the environment.
    ///
    /// `ACCESSIBLE` set to anything but `""`, `0` or `false` turns on
    /// accessible mode; `TERMFORM_THEME` names a theme preset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, var: F) -> Result<()> {
        if let Some(value) = var("ACCESSIBLE") {
            self.accessible = !matches!(value.trim(), "" | "0" | "false");
        }
        if let Some(name) = var("TERMFORM_THEME") {
            self.theme = ThemeName::parse(&name)
                .ok_or_else(|| FormError::config(format!("unknown theme {name:?}")))?;
        }
        tracing::debug!(accessible = self.accessible, theme = ?self.theme, "config from env");
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        assert_eq!(FormConfig::from_toml("").unwrap(), FormConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = FormConfig::from_toml(
            r#"
            width = 60
            show_help = false
            theme = "dracula"
            accessible = true
            timeout_ms = 1500

            [layout]
            kind = "grid"
            rows = 2
            columns = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.width, Some(60));
        assert!(!config.show_help);
        assert_eq!(config.theme, ThemeName::Dracula);
        assert_eq!(config.layout, LayoutKind::Grid { rows: 2, columns: 3 });
        assert_eq!(config.timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_bad_document_is_config_error() {
        let err = FormConfig::from_toml("theme = \"neon\"").unwrap_err();
        assert!(matches!(err, FormError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = FormConfig::default();
        config
            .apply_env(|name| match name {
                "ACCESSIBLE" => Some("1".into()),
                "TERMFORM_THEME" => Some("Base16".into()),
                _ => None,
            })
            .unwrap();
        assert!(config.accessible);
        assert_eq!(config.theme, ThemeName::Base16);

        let err = config
            .apply_env(|name| (name == "TERMFORM_THEME").then(|| "neon".into()))
            .unwrap_err();
        assert_eq!(err, FormError::Config("unknown theme \"neon\"".into()));
    }
}
