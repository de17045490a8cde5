//! Short help rendering for key bindings.

use unicode_width::UnicodeWidthStr;

use crate::binding::Binding;
use crate::style::Style;

/// Styles for the help line.
#[derive(Debug, Clone, Default)]
pub struct HelpStyles {
    /// Style for the key part of each item.
    pub key: Style,
    /// Style for the description part of each item.
    pub desc: Style,
    /// Style for the separator between items.
    pub separator: Style,
    /// Style for the ellipsis shown when the line is truncated.
    pub ellipsis: Style,
}

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "…";

/// Renders `key desc • key desc` for every enabled binding that has help
/// text.
///
/// With a non-zero `width`, items that would overflow are dropped and an
/// ellipsis is appended if it still fits.
///
/// # Example
///
/// ```rust
/// use termloop::Binding;
/// use termloop::help::{HelpStyles, short_help_view};
///
/// let quit = Binding::new().keys(&["q"]).help("q", "quit");
/// let save = Binding::new().keys(&["ctrl+s"]).help("ctrl+s", "save");
/// let view = short_help_view(&[&quit, &save], 0, &HelpStyles::default());
/// assert_eq!(view, "q quit • ctrl+s save");
/// ```
#[must_use]
pub fn short_help_view(bindings: &[&Binding], width: usize, styles: &HelpStyles) -> String {
    let mut result = String::new();
    let mut total_width = 0;

    for binding in bindings {
        if !binding.enabled() {
            continue;
        }

        let help = binding.get_help();
        if help.key.is_empty() && help.desc.is_empty() {
            continue;
        }

        let (sep, sep_width) = if total_width > 0 {
            (styles.separator.render(SEPARATOR), SEPARATOR.width())
        } else {
            (String::new(), 0)
        };

        let item_width = sep_width + help.key.width() + 1 + help.desc.width();

        if width > 0 && total_width + item_width > width {
            if total_width + 1 + ELLIPSIS.width() < width {
                result.push(' ');
                result.push_str(&styles.ellipsis.render(ELLIPSIS));
            }
            break;
        }

        total_width += item_width;
        result.push_str(&sep);
        result.push_str(&styles.key.render(&help.key));
        result.push(' ');
        result.push_str(&styles.desc.render(&help.desc));
    }

    result
}
