//! Themes for form rendering.
//!
//! A [`Theme`] is plain data handed to every group and field through
//! `with_theme`; nothing is global. Four presets ship with the crate and can
//! be chosen by name from configuration via [`ThemeName`].

use serde::{Deserialize, Serialize};
use termloop::help::HelpStyles;
use termloop::{Border, Style};

/// Collection of styles for form components.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style wrapped around the whole form.
    pub form: Style,
    /// Styles for group headers.
    pub group: GroupStyles,
    /// Rendered between fields of a group.
    pub field_separator: Style,
    /// Styles for the focused field.
    pub focused: FieldStyles,
    /// Styles for every other field.
    pub blurred: FieldStyles,
    /// Styles for the help line.
    pub help: HelpStyles,
}

impl Default for Theme {
    fn default() -> Self {
        theme_charm()
    }
}

/// Styles for group headers.
#[derive(Debug, Clone, Default)]
pub struct GroupStyles {
    /// Title style.
    pub title: Style,
    /// Description style.
    pub description: Style,
}

/// Styles for a field in one focus state.
#[derive(Debug, Clone, Default)]
pub struct FieldStyles {
    pub base: Style,
    pub title: Style,
    pub description: Style,
    pub error_indicator: Style,
    pub error_message: Style,

    // Select
    pub select_selector: Style,
    pub option: Style,
    pub next_indicator: Style,
    pub prev_indicator: Style,

    // Multi-select
    pub multi_select_selector: Style,
    pub selected_option: Style,
    pub selected_prefix: Style,
    pub unselected_option: Style,
    pub unselected_prefix: Style,

    // Input and text
    pub text_input: TextInputStyles,

    // Confirm
    pub focused_button: Style,
    pub blurred_button: Style,

    // Note
    pub note_title: Style,

    // Table
    pub table_header: Style,
}

/// Styles for single and multi-line text entry.
#[derive(Debug, Clone, Default)]
pub struct TextInputStyles {
    pub cursor: Style,
    pub placeholder: Style,
    pub prompt: Style,
    pub text: Style,
}

/// Named preset, as used in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Base,
    #[default]
    Charm,
    Dracula,
    Base16,
}

impl ThemeName {
    /// Builds the preset.
    pub fn theme(self) -> Theme {
        match self {
            Self::Base => theme_base(),
            Self::Charm => theme_charm(),
            Self::Dracula => theme_dracula(),
            Self::Base16 => theme_base16(),
        }
    }

    /// Looks a preset up by its lowercase name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "base" => Some(Self::Base),
            "charm" => Some(Self::Charm),
            "dracula" => Some(Self::Dracula),
            "base16" => Some(Self::Base16),
            _ => None,
        }
    }
}

/// Derives the blurred styles from the focused ones: hidden border, no
/// inline arrows.
fn blur(focused: &FieldStyles) -> FieldStyles {
    let mut blurred = focused.clone();
    blurred.base = focused.base.clone().border(Border::hidden());
    blurred.next_indicator = Style::new();
    blurred.prev_indicator = Style::new();
    blurred
}

/// The uncoloured base all presets start from.
#[allow(clippy::field_reassign_with_default)]
pub fn theme_base() -> Theme {
    let button = Style::new().padding((0, 2)).margin_right(1);

    let mut focused = FieldStyles::default();
    focused.base = Style::new()
        .padding_left(1)
        .border(Border::thick())
        .border_left(true);
    focused.error_indicator = Style::new().set_string(" *");
    focused.error_message = Style::new().set_string("* ");
    focused.select_selector = Style::new().set_string("> ");
    focused.next_indicator = Style::new().margin_left(1).set_string("→");
    focused.prev_indicator = Style::new().margin_right(1).set_string("←");
    focused.multi_select_selector = Style::new().set_string("> ");
    focused.selected_prefix = Style::new().set_string("[•] ");
    focused.unselected_prefix = Style::new().set_string("[ ] ");
    focused.focused_button = button.clone().foreground("0").background("7");
    focused.blurred_button = button.foreground("7").background("0");
    focused.text_input.placeholder = Style::new().foreground("8");
    focused.table_header = Style::new().bold();

    let mut blurred = blur(&focused);
    blurred.multi_select_selector = Style::new().set_string("  ");
    blurred.select_selector = Style::new().set_string("  ");

    Theme {
        form: Style::new(),
        group: GroupStyles::default(),
        field_separator: Style::new().set_string("\n\n"),
        focused,
        blurred,
        help: HelpStyles {
            key: Style::new().foreground("8"),
            desc: Style::new().foreground("7"),
            separator: Style::new().foreground("8"),
            ellipsis: Style::new().foreground("8"),
        },
    }
}

/// The default preset.
pub fn theme_charm() -> Theme {
    let mut t = theme_base();

    let indigo = "#7571F9";
    let fuchsia = "#F780E2";
    let green = "#02BF87";
    let red = "#ED567A";
    let normal_fg = "252";

    let f = &mut t.focused;
    f.base = f.base.clone().border_foreground("238");
    f.title = f.title.clone().foreground(indigo).bold();
    f.note_title = f.note_title.clone().foreground(indigo).bold().margin_bottom(1);
    f.description = f.description.clone().foreground("243");
    f.error_indicator = f.error_indicator.clone().foreground(red);
    f.error_message = f.error_message.clone().foreground(red);
    f.select_selector = f.select_selector.clone().foreground(fuchsia);
    f.next_indicator = f.next_indicator.clone().foreground(fuchsia);
    f.prev_indicator = f.prev_indicator.clone().foreground(fuchsia);
    f.option = f.option.clone().foreground(normal_fg);
    f.multi_select_selector = f.multi_select_selector.clone().foreground(fuchsia);
    f.selected_option = f.selected_option.clone().foreground(green);
    f.selected_prefix = Style::new().foreground("#02A877").set_string("✓ ");
    f.unselected_prefix = Style::new().foreground("243").set_string("• ");
    f.unselected_option = f.unselected_option.clone().foreground(normal_fg);
    f.focused_button = f.focused_button.clone().foreground("#FFFDF5").background(fuchsia);
    f.blurred_button = f.blurred_button.clone().foreground(normal_fg).background("237");
    f.text_input.cursor = f.text_input.cursor.clone().foreground(green);
    f.text_input.placeholder = f.text_input.placeholder.clone().foreground("238");
    f.text_input.prompt = f.text_input.prompt.clone().foreground(fuchsia);
    f.table_header = f.table_header.clone().foreground(indigo);

    t.blurred = blur(&t.focused);
    t.blurred.select_selector = Style::new().set_string("  ");
    t.blurred.multi_select_selector = Style::new().set_string("  ");
    t.group.title = t.focused.title.clone();
    t.group.description = t.focused.description.clone();
    t
}

/// Dracula palette.
pub fn theme_dracula() -> Theme {
    let mut t = theme_base();

    let selection = "#44475a";
    let foreground = "#f8f8f2";
    let comment = "#6272a4";
    let green = "#50fa7b";
    let purple = "#bd93f9";
    let red = "#ff5555";
    let yellow = "#f1fa8c";

    let f = &mut t.focused;
    f.base = f.base.clone().border_foreground(selection);
    f.title = f.title.clone().foreground(purple);
    f.note_title = f.note_title.clone().foreground(purple);
    f.description = f.description.clone().foreground(comment);
    f.error_indicator = f.error_indicator.clone().foreground(red);
    f.error_message = f.error_message.clone().foreground(red);
    f.select_selector = f.select_selector.clone().foreground(yellow);
    f.next_indicator = f.next_indicator.clone().foreground(yellow);
    f.prev_indicator = f.prev_indicator.clone().foreground(yellow);
    f.option = f.option.clone().foreground(foreground);
    f.multi_select_selector = f.multi_select_selector.clone().foreground(yellow);
    f.selected_option = f.selected_option.clone().foreground(green);
    f.selected_prefix = f.selected_prefix.clone().foreground(green);
    f.unselected_option = f.unselected_option.clone().foreground(foreground);
    f.unselected_prefix = f.unselected_prefix.clone().foreground(comment);
    f.focused_button = f.focused_button.clone().foreground(yellow).background(purple).bold();
    f.blurred_button = f.blurred_button.clone().foreground(foreground).background("#282a36");
    f.text_input.cursor = f.text_input.cursor.clone().foreground(yellow);
    f.text_input.placeholder = f.text_input.placeholder.clone().foreground(comment);
    f.text_input.prompt = f.text_input.prompt.clone().foreground(yellow);
    f.table_header = f.table_header.clone().foreground(purple);

    t.blurred = blur(&t.focused);
    t.group.title = t.focused.title.clone();
    t.group.description = t.focused.description.clone();
    t.help.key = Style::new().foreground(comment);
    t.help.desc = Style::new().foreground(foreground);
    t
}

/// Sixteen-colour palette that follows the terminal's own colours.
pub fn theme_base16() -> Theme {
    let mut t = theme_base();

    let f = &mut t.focused;
    f.base = f.base.clone().border_foreground("8");
    f.title = f.title.clone().foreground("6");
    f.note_title = f.note_title.clone().foreground("6");
    f.description = f.description.clone().foreground("8");
    f.error_indicator = f.error_indicator.clone().foreground("9");
    f.error_message = f.error_message.clone().foreground("9");
    f.select_selector = f.select_selector.clone().foreground("3");
    f.next_indicator = f.next_indicator.clone().foreground("3");
    f.prev_indicator = f.prev_indicator.clone().foreground("3");
    f.option = f.option.clone().foreground("7");
    f.multi_select_selector = f.multi_select_selector.clone().foreground("3");
    f.selected_option = f.selected_option.clone().foreground("2");
    f.selected_prefix = f.selected_prefix.clone().foreground("2");
    f.unselected_option = f.unselected_option.clone().foreground("7");
    f.focused_button = f.focused_button.clone().foreground("7").background("5");
    f.blurred_button = f.blurred_button.clone().foreground("7").background("0");

    t.blurred = blur(&t.focused);
    t.blurred.note_title = t.blurred.note_title.clone().foreground("8");
    t.blurred.title = t.blurred.title.clone().foreground("8");
    t.blurred.text_input.prompt = t.blurred.text_input.prompt.clone().foreground("8");
    t.blurred.text_input.text = t.blurred.text_input.text.clone().foreground("7");
    t.group.title = t.focused.title.clone();
    t.group.description = t.focused.description.clone();
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use termloop::style::strip_ansi;

    #[test]
    fn test_theme_name_round_trip() {
        for name in ["base", "charm", "dracula", "base16"] {
            assert!(ThemeName::parse(name).is_some(), "{name}");
        }
        assert_eq!(ThemeName::parse(" Dracula "), Some(ThemeName::Dracula));
        assert_eq!(ThemeName::parse("solarized"), None);
    }

    #[test]
    fn test_blurred_base_keeps_width() {
        let t = theme_charm();
        let focused = strip_ansi(&t.focused.base.render("x"));
        let blurred = strip_ansi(&t.blurred.base.render("x"));
        assert_eq!(focused, "┃ x");
        assert_eq!(blurred, "  x");
    }

    #[test]
    fn test_selector_prefixes() {
        let t = theme_base();
        assert_eq!(strip_ansi(&t.focused.select_selector.render("")), "> ");
        assert_eq!(strip_ansi(&t.blurred.select_selector.render("")), "  ");
    }
}
