//! How the groups of a form are arranged on screen.
//!
//! A layout is a pure function of the form: it decides which groups are
//! visible next to the active one and how wide each may be. Only the active
//! group takes input whatever the layout shows.

use termloop::Style;
use termloop::style::{Position, join_horizontal, join_vertical};

use crate::form::Form;

/// Arranges a form's groups.
pub trait Layout: Send + Sync {
    /// Renders the form.
    fn view(&self, form: &Form) -> String;

    /// Width available to group `group` when the form is `width` wide.
    fn group_width(&self, form: &Form, group: usize, width: usize) -> usize;
}

/// One group at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLayout;

/// Every visible group, one below the other.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackLayout;

/// Up to `columns` groups side by side, paging in blocks.
#[derive(Debug, Clone, Copy)]
pub struct ColumnsLayout {
    columns: usize,
}

/// Groups on a `rows` × `columns` grid, paging in blocks.
#[derive(Debug, Clone, Copy)]
pub struct GridLayout {
    rows: usize,
    columns: usize,
}

pub fn default() -> DefaultLayout {
    DefaultLayout
}

pub fn stack() -> StackLayout {
    StackLayout
}

pub fn columns(columns: usize) -> ColumnsLayout {
    ColumnsLayout {
        columns: columns.max(1),
    }
}

pub fn grid(rows: usize, columns: usize) -> GridLayout {
    GridLayout {
        rows: rows.max(1),
        columns: columns.max(1),
    }
}

impl Layout for DefaultLayout {
    fn view(&self, form: &Form) -> String {
        form.groups()
            .get(form.current_group())
            .map(|g| g.view())
            .unwrap_or_default()
    }

    fn group_width(&self, _form: &Form, _group: usize, width: usize) -> usize {
        width
    }
}

impl Layout for StackLayout {
    fn view(&self, form: &Form) -> String {
        let contents: Vec<String> = form
            .visible_groups()
            .into_iter()
            .map(|i| form.groups()[i].content())
            .collect();
        with_footer(contents.join("\n\n"), form)
    }

    fn group_width(&self, _form: &Form, _group: usize, width: usize) -> usize {
        width
    }
}

impl Layout for ColumnsLayout {
    fn view(&self, form: &Form) -> String {
        let page = visible_page(form, self.columns);
        let width = self.group_width(form, 0, form.render_width());
        let row = side_by_side(form, &page, width);
        with_footer(row, form)
    }

    fn group_width(&self, _form: &Form, _group: usize, width: usize) -> usize {
        width / self.columns
    }
}

impl Layout for GridLayout {
    fn view(&self, form: &Form) -> String {
        let page = visible_page(form, self.rows * self.columns);
        let width = self.group_width(form, 0, form.render_width());
        let rows: Vec<String> = page
            .chunks(self.columns)
            .map(|chunk| side_by_side(form, chunk, width))
            .collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        with_footer(join_vertical(Position::Left, &refs), form)
    }

    fn group_width(&self, _form: &Form, _group: usize, width: usize) -> usize {
        width / self.columns
    }
}

/// The block of `per_page` visible groups containing the active one.
fn visible_page(form: &Form, per_page: usize) -> Vec<usize> {
    let visible = form.visible_groups();
    let pos = visible
        .iter()
        .position(|&i| i == form.current_group())
        .unwrap_or(0);
    let start = (pos / per_page) * per_page;
    visible.into_iter().skip(start).take(per_page).collect()
}

fn side_by_side(form: &Form, groups: &[usize], width: usize) -> String {
    let cells: Vec<String> = groups
        .iter()
        .map(|&i| {
            let content = form.groups()[i].content();
            if width == 0 {
                content
            } else {
                Style::new()
                    .width(u16::try_from(width).unwrap_or(u16::MAX))
                    .render(&content)
            }
        })
        .collect();
    let refs: Vec<&str> = cells.iter().map(String::as_str).collect();
    join_horizontal(Position::Top, &refs)
}

fn with_footer(body: String, form: &Form) -> String {
    let footer = form
        .groups()
        .get(form.current_group())
        .map(|g| g.footer())
        .unwrap_or_default();
    if footer.is_empty() {
        body
    } else {
        format!("{body}\n\n{footer}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Note;
    use crate::group::Group;
    use termloop::Model;
    use termloop::style::strip_ansi;

    fn four_pages() -> Form {
        let groups = ["one", "two", "three", "four"]
            .into_iter()
            .map(|t| Group::new(vec![Box::new(Note::new().title(t).next(true))]))
            .collect();
        Form::new(groups).show_help(false)
    }

    #[test]
    fn test_columns_show_the_block_with_active_group() {
        let mut form = four_pages().layout(columns(2)).width(40);
        form.init();
        let view = strip_ansi(&form.view());
        assert!(view.contains("one") && view.contains("two"));
        assert!(!view.contains("three"));

        form.next_group();
        form.next_group();
        let view = strip_ansi(&form.view());
        assert!(view.contains("three") && view.contains("four"));
        assert!(!view.contains("one"));
    }

    #[test]
    fn test_stack_shows_everything() {
        let mut form = four_pages().layout(stack());
        form.init();
        let view = strip_ansi(&form.view());
        for t in ["one", "two", "three", "four"] {
            assert!(view.contains(t));
        }
    }

    #[test]
    fn test_group_widths() {
        let form = four_pages();
        assert_eq!(columns(2).group_width(&form, 0, 80), 40);
        assert_eq!(grid(2, 4).group_width(&form, 3, 80), 20);
        assert_eq!(default().group_width(&form, 0, 80), 80);
    }

    #[test]
    fn test_grid_pages_in_blocks() {
        let mut form = four_pages().layout(grid(1, 2));
        form.init();
        let view = strip_ansi(&form.view());
        assert!(view.contains("two"));
        assert!(!view.contains("three"));
    }
}
