//! Terminal styling and layout helpers.
//!
//! [`Style`] renders text with colors, attributes, padding, a fixed width,
//! borders and margins. Colors are given as strings: `"#RRGGBB"` for true
//! color or a number for an ANSI-256 index. ANSI output is produced through
//! crossterm's [`ContentStyle`].
//!
//! # Example
//!
//! ```rust
//! use termloop::{Border, Style};
//!
//! let boxed = Style::new()
//!     .padding_left(1)
//!     .border(Border::normal())
//!     .render("hi");
//! assert_eq!(boxed, "┌───┐\n│ hi│\n└───┘");
//! ```

use crossterm::style::{Attribute, Attributes, Color, ContentStyle};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Horizontal or vertical alignment used when joining blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Align to the top (vertical joins) or left (horizontal joins).
    #[default]
    Top,
    /// Align to the left.
    Left,
    /// Center.
    Center,
    /// Align to the bottom.
    Bottom,
    /// Align to the right.
    Right,
}

impl Position {
    fn factor(self) -> f64 {
        match self {
            Position::Top | Position::Left => 0.0,
            Position::Center => 0.5,
            Position::Bottom | Position::Right => 1.0,
        }
    }
}

/// Border characters for edges and corners.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Border {
    /// Top edge.
    pub top: &'static str,
    /// Bottom edge.
    pub bottom: &'static str,
    /// Left edge.
    pub left: &'static str,
    /// Right edge.
    pub right: &'static str,
    /// Top-left corner.
    pub top_left: &'static str,
    /// Top-right corner.
    pub top_right: &'static str,
    /// Bottom-left corner.
    pub bottom_left: &'static str,
    /// Bottom-right corner.
    pub bottom_right: &'static str,
}

impl Border {
    /// Standard border (┌─┐).
    pub const fn normal() -> Self {
        Self {
            top: "─",
            bottom: "─",
            left: "│",
            right: "│",
            top_left: "┌",
            top_right: "┐",
            bottom_left: "└",
            bottom_right: "┘",
        }
    }

    /// Rounded corners (╭─╮).
    pub const fn rounded() -> Self {
        Self {
            top: "─",
            bottom: "─",
            left: "│",
            right: "│",
            top_left: "╭",
            top_right: "╮",
            bottom_left: "╰",
            bottom_right: "╯",
        }
    }

    /// Thick lines (┏━┓).
    pub const fn thick() -> Self {
        Self {
            top: "━",
            bottom: "━",
            left: "┃",
            right: "┃",
            top_left: "┏",
            top_right: "┓",
            bottom_left: "┗",
            bottom_right: "┛",
        }
    }

    /// Invisible border that still takes up space.
    pub const fn hidden() -> Self {
        Self {
            top: " ",
            bottom: " ",
            left: " ",
            right: " ",
            top_left: " ",
            top_right: " ",
            bottom_left: " ",
            bottom_right: " ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Sides {
    top: u16,
    right: u16,
    bottom: u16,
    left: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Edges {
    top: bool,
    right: bool,
    bottom: bool,
    left: bool,
}

impl Edges {
    const ALL: Self = Self {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };
}

/// A set of display rules applied by [`Style::render`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    value: String,
    content: ContentStyle,
    padding: Sides,
    margin: Sides,
    border: Option<Border>,
    edges: Option<Edges>,
    border_fg: Option<Color>,
    width: u16,
}

/// Parse `"#RRGGBB"` or an ANSI-256 index.
fn parse_color(s: &str) -> Option<Color> {
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb { r, g, b });
    }
    s.parse::<u8>().ok().map(Color::AnsiValue)
}

impl Style {
    /// Creates an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a string that is rendered in front of every rendered text.
    pub fn set_string(mut self, s: impl Into<String>) -> Self {
        self.value = s.into();
        self
    }

    /// Returns the prefix set with [`Style::set_string`].
    pub fn value(&self) -> &str {
        &self.value
    }

    fn attr(mut self, attr: Attribute) -> Self {
        self.content.attributes.set(attr);
        self
    }

    /// Bold text.
    pub fn bold(self) -> Self {
        self.attr(Attribute::Bold)
    }

    /// Italic text.
    pub fn italic(self) -> Self {
        self.attr(Attribute::Italic)
    }

    /// Faint text.
    pub fn faint(self) -> Self {
        self.attr(Attribute::Dim)
    }

    /// Underlined text.
    pub fn underline(self) -> Self {
        self.attr(Attribute::Underlined)
    }

    /// Sets the foreground color. Unparseable colors are ignored.
    pub fn foreground(mut self, color: impl AsRef<str>) -> Self {
        self.content.foreground_color = parse_color(color.as_ref());
        self
    }

    /// Sets the background color. Unparseable colors are ignored.
    pub fn background(mut self, color: impl AsRef<str>) -> Self {
        self.content.background_color = parse_color(color.as_ref());
        self
    }

    /// Sets a fixed width. Lines are wrapped and padded to it.
    pub fn width(mut self, w: u16) -> Self {
        self.width = w;
        self
    }

    /// Sets vertical and horizontal padding.
    pub fn padding(mut self, (vertical, horizontal): (u16, u16)) -> Self {
        self.padding = Sides {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        };
        self
    }

    /// Sets left padding.
    pub fn padding_left(mut self, n: u16) -> Self {
        self.padding.left = n;
        self
    }

    /// Sets right padding.
    pub fn padding_right(mut self, n: u16) -> Self {
        self.padding.right = n;
        self
    }

    /// Sets top margin.
    pub fn margin_top(mut self, n: u16) -> Self {
        self.margin.top = n;
        self
    }

    /// Sets right margin.
    pub fn margin_right(mut self, n: u16) -> Self {
        self.margin.right = n;
        self
    }

    /// Sets bottom margin.
    pub fn margin_bottom(mut self, n: u16) -> Self {
        self.margin.bottom = n;
        self
    }

    /// Sets left margin.
    pub fn margin_left(mut self, n: u16) -> Self {
        self.margin.left = n;
        self
    }

    /// Sets the border. All edges are drawn unless individual edges are
    /// selected with `border_top`/`border_right`/`border_bottom`/`border_left`.
    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    fn edges_mut(&mut self) -> &mut Edges {
        self.edges.get_or_insert_with(Edges::default)
    }

    /// Draws or hides the top edge.
    pub fn border_top(mut self, v: bool) -> Self {
        self.edges_mut().top = v;
        self
    }

    /// Draws or hides the right edge.
    pub fn border_right(mut self, v: bool) -> Self {
        self.edges_mut().right = v;
        self
    }

    /// Draws or hides the bottom edge.
    pub fn border_bottom(mut self, v: bool) -> Self {
        self.edges_mut().bottom = v;
        self
    }

    /// Draws or hides the left edge.
    pub fn border_left(mut self, v: bool) -> Self {
        self.edges_mut().left = v;
        self
    }

    /// Sets the border color.
    pub fn border_foreground(mut self, color: impl AsRef<str>) -> Self {
        self.border_fg = parse_color(color.as_ref());
        self
    }

    fn has_ansi(&self) -> bool {
        self.content.foreground_color.is_some()
            || self.content.background_color.is_some()
            || !self.content.attributes.is_empty()
    }

    /// Render the given text with this style applied.
    pub fn render(&self, text: &str) -> String {
        let mut s = if self.value.is_empty() {
            text.replace("\r\n", "\n")
        } else {
            format!("{}{}", self.value, text).replace("\r\n", "\n")
        };

        if self.width > 0 {
            let inner = usize::from(self.width)
                .saturating_sub(usize::from(self.padding.left + self.padding.right))
                .max(1);
            s = s
                .split('\n')
                .map(|line| wrap_plain(line, inner))
                .collect::<Vec<_>>()
                .join("\n");
        }

        if self.has_ansi() {
            s = s
                .split('\n')
                .map(|line| {
                    if line.is_empty() {
                        String::new()
                    } else {
                        self.content.apply(line).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
        }

        s = pad_block(&s, self.padding);

        if self.width > 0 {
            let target = usize::from(self.width);
            s = s
                .split('\n')
                .map(|line| pad_right(line, target))
                .collect::<Vec<_>>()
                .join("\n");
        }

        s = self.apply_border(&s);
        pad_block(&s, self.margin)
    }

    fn apply_border(&self, s: &str) -> String {
        let Some(border) = &self.border else {
            return s.to_string();
        };
        let edges = self.edges.unwrap_or(Edges::ALL);
        if !(edges.top || edges.right || edges.bottom || edges.left) {
            return s.to_string();
        }

        let paint = |piece: &str| match self.border_fg {
            Some(fg) => ContentStyle {
                foreground_color: Some(fg),
                ..ContentStyle::new()
            }
            .apply(piece)
            .to_string(),
            None => piece.to_string(),
        };

        let lines: Vec<&str> = s.split('\n').collect();
        let content_width = lines.iter().map(|l| visible_width(l)).max().unwrap_or(0);
        let mut out = Vec::with_capacity(lines.len() + 2);

        if edges.top {
            let mut row = String::new();
            if edges.left {
                row.push_str(&paint(border.top_left));
            }
            row.push_str(&paint(&border.top.repeat(content_width.max(1))));
            if edges.right {
                row.push_str(&paint(border.top_right));
            }
            out.push(row);
        }

        for line in &lines {
            let mut row = String::new();
            if edges.left {
                row.push_str(&paint(border.left));
            }
            row.push_str(line);
            if edges.right {
                row.push_str(&" ".repeat(content_width - visible_width(line)));
                row.push_str(&paint(border.right));
            }
            out.push(row);
        }

        if edges.bottom {
            let mut row = String::new();
            if edges.left {
                row.push_str(&paint(border.bottom_left));
            }
            row.push_str(&paint(&border.bottom.repeat(content_width.max(1))));
            if edges.right {
                row.push_str(&paint(border.bottom_right));
            }
            out.push(row);
        }

        out.join("\n")
    }
}

fn pad_right(line: &str, target: usize) -> String {
    let w = visible_width(line);
    if w >= target {
        line.to_string()
    } else {
        format!("{line}{}", " ".repeat(target - w))
    }
}

fn pad_block(s: &str, sides: Sides) -> String {
    if sides == Sides::default() {
        return s.to_string();
    }

    let left = " ".repeat(usize::from(sides.left));
    let right = " ".repeat(usize::from(sides.right));
    let mut lines: Vec<String> = s
        .split('\n')
        .map(|line| format!("{left}{line}{right}"))
        .collect();

    let blank = " ".repeat(lines.iter().map(|l| visible_width(l)).max().unwrap_or(0));
    for _ in 0..sides.top {
        lines.insert(0, blank.clone());
    }
    for _ in 0..sides.bottom {
        lines.push(blank.clone());
    }
    lines.join("\n")
}

/// Hard-wrap a line without escape sequences at `width` columns.
///
/// Lines that already carry ANSI sequences are returned unchanged.
fn wrap_plain(line: &str, width: usize) -> String {
    if line.contains('\x1b') || line.width() <= width {
        return line.to_string();
    }

    let mut out = String::new();
    let mut col = 0;
    for ch in line.chars() {
        let w = ch.width().unwrap_or(0);
        if col + w > width && col > 0 {
            out.push('\n');
            col = 0;
        }
        out.push(ch);
        col += w;
    }
    out
}

/// Strip ANSI CSI escape sequences.
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// Display width of a single line, ignoring ANSI escape sequences.
pub fn visible_width(s: &str) -> usize {
    strip_ansi(s).width()
}

/// Width of the widest line in a block.
pub fn width(s: &str) -> usize {
    s.split('\n').map(visible_width).max().unwrap_or(0)
}

/// Number of lines in a block.
pub fn height(s: &str) -> usize {
    s.split('\n').count()
}

/// Join blocks side by side, aligning them vertically by `pos`.
pub fn join_horizontal(pos: Position, blocks: &[&str]) -> String {
    if blocks.is_empty() {
        return String::new();
    }

    let max_height = blocks.iter().map(|b| height(b)).max().unwrap_or(0);
    let columns: Vec<Vec<String>> = blocks
        .iter()
        .map(|block| {
            let w = width(block);
            let lines: Vec<String> = block.split('\n').map(|l| pad_right(l, w)).collect();
            let extra = max_height - lines.len();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let top = (extra as f64 * pos.factor()).round() as usize;
            let blank = " ".repeat(w);
            let mut col = vec![blank.clone(); top];
            col.extend(lines);
            col.resize(max_height, blank);
            col
        })
        .collect();

    (0..max_height)
        .map(|row| columns.iter().map(|c| c[row].as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stack blocks vertically, aligning them horizontally by `pos`.
pub fn join_vertical(pos: Position, blocks: &[&str]) -> String {
    let max_width = blocks.iter().map(|b| width(b)).max().unwrap_or(0);
    blocks
        .iter()
        .flat_map(|block| block.split('\n'))
        .map(|line| {
            let extra = max_width - visible_width(line);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let left = (extra as f64 * pos.factor()).round() as usize;
            format!("{}{line}{}", " ".repeat(left), " ".repeat(extra - left))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_render_is_identity() {
        assert_eq!(Style::new().render("hello\nworld"), "hello\nworld");
        assert_eq!(Style::new().render(""), "");
    }

    #[test]
    fn test_set_string_prefix() {
        assert_eq!(Style::new().set_string("> ").render("a"), "> a");
        assert_eq!(Style::new().set_string(" *").render(""), " *");
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(
            parse_color("#7571F9"),
            Some(Color::Rgb {
                r: 0x75,
                g: 0x71,
                b: 0xF9
            })
        );
        assert_eq!(parse_color("243"), Some(Color::AnsiValue(243)));
        assert_eq!(parse_color("nope"), None);
    }

    #[test]
    fn test_colored_render_has_same_visible_width() {
        let out = Style::new().foreground("#ff0000").bold().render("abc");
        assert_ne!(out, "abc");
        assert_eq!(strip_ansi(&out), "abc");
        assert_eq!(visible_width(&out), 3);
    }

    #[test]
    fn test_width_pads_and_wraps() {
        let out = Style::new().width(4).render("ab");
        assert_eq!(out, "ab  ");

        let out = Style::new().width(3).render("abcdef");
        assert_eq!(out, "abc\ndef");
    }

    #[test]
    fn test_left_border_only() {
        let out = Style::new()
            .border(Border::thick())
            .border_left(true)
            .render("a\nb");
        assert_eq!(out, "┃a\n┃b");
    }

    #[test]
    fn test_margins() {
        let out = Style::new().margin_left(2).margin_bottom(1).render("x");
        assert_eq!(out, "  x\n   ");
    }

    #[test]
    fn test_join_horizontal() {
        let out = join_horizontal(Position::Top, &["a\nb", "cc"]);
        assert_eq!(out, "acc\nb  ");
    }

    #[test]
    fn test_join_vertical() {
        let out = join_vertical(Position::Left, &["abc", "d"]);
        assert_eq!(out, "abc\nd  ");
    }

    #[test]
    fn test_width_and_height() {
        assert_eq!(width("ab\nabcd"), 4);
        assert_eq!(height("ab\nabcd\n"), 3);
    }
}
