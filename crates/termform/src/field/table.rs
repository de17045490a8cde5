//! Row selection from tabular data.

use std::any::Any;
use std::io::{BufRead, Write};

use termloop::binding::matches;
use termloop::{Binding, Cmd, KeyMsg, Message};
use unicode_width::UnicodeWidthStr;

use super::select::window_start;
use super::{Common, Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::accessible;
use crate::accessor::{Accessor, EmbeddedAccessor};
use crate::error::Result;
use crate::eval::Bindings;
use crate::keymap::{KeyMap, TableKeyMap};
use crate::theme::Theme;
use crate::validate::{Validator, always_valid};

type Row = Vec<String>;

/// Pick one row of a table.
///
/// Like [`Select`](super::Select), moving the cursor does not touch the
/// stored value; the highlighted row is committed on confirm.
pub struct Table {
    common: Common,
    accessor: Box<dyn Accessor<Row>>,
    columns: Vec<String>,
    rows: Vec<Row>,
    cursor: usize,
    visible: usize,
    zoom: bool,
    validate: Validator<Row>,
    keymap: TableKeyMap,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self {
            common: Common::new(),
            accessor: Box::new(EmbeddedAccessor::new(Vec::new())),
            columns: Vec::new(),
            rows: Vec::new(),
            cursor: 0,
            visible: 0,
            zoom: false,
            validate: always_valid(),
            keymap: TableKeyMap::default(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.common.key = key.into();
        self
    }

    pub fn accessor(mut self, accessor: impl Accessor<Row> + 'static) -> Self {
        self.accessor = Box::new(accessor);
        self.position_on_committed();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.common.title.set(title.into());
        self
    }

    pub fn title_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.common.set_title_func(f, bindings);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.common.description.set(description.into());
        self
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self.position_on_committed();
        self
    }

    /// Number of rows to show; 0 shows all.
    pub fn height(mut self, rows: usize) -> Self {
        self.visible = rows;
        self
    }

    /// Requests the whole group area while focused.
    pub fn zoom(mut self, zoom: bool) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Row) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Box::new(validate);
        self
    }

    pub fn selected_row(&self) -> Row {
        self.accessor.get()
    }

    fn position_on_committed(&mut self) {
        let committed = self.accessor.get();
        if let Some(i) = self.rows.iter().position(|r| *r == committed) {
            self.cursor = i;
        }
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.width()).collect();
        for row in &self.rows {
            if row.len() > widths.len() {
                widths.resize(row.len(), 0);
            }
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.width());
            }
        }
        widths
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        self.common.err = None;
        let km = &self.keymap;
        let last = self.rows.len().saturating_sub(1);

        if matches(key, &[&km.prev]) {
            self.common.err = (self.validate)(&self.accessor.get());
            return self.common.err.is_none().then(|| Cmd::message(PrevFieldMsg));
        }
        if matches(key, &[&km.next, &km.submit]) {
            let Some(row) = self.rows.get(self.cursor).cloned() else {
                return Some(Cmd::message(NextFieldMsg));
            };
            self.common.err = (self.validate)(&row);
            if self.common.err.is_some() {
                return None;
            }
            self.accessor.set(row);
            return Some(Cmd::message(NextFieldMsg));
        }
        if matches(key, &[&km.up]) {
            self.cursor = self.cursor.saturating_sub(1);
        } else if matches(key, &[&km.down]) {
            self.cursor = (self.cursor + 1).min(last);
        } else if matches(key, &[&km.goto_top]) {
            self.cursor = 0;
        } else if matches(key, &[&km.goto_bottom]) {
            self.cursor = last;
        }
        None
    }

    fn grid(&self) -> String {
        let styles = self.common.styles();
        let widths = self.column_widths();
        let format_row = |cells: &[String]| -> String {
            widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let cell = cells.get(i).map_or("", String::as_str);
                    format!("{cell}{}", " ".repeat(w - cell.width()))
                })
                .collect::<Vec<_>>()
                .join("  ")
        };

        let mut lines = Vec::new();
        if !self.columns.is_empty() {
            lines.push(styles.table_header.render(&format!("  {}", format_row(&self.columns))));
        }

        let rows = if self.visible > 0 {
            self.visible
        } else {
            self.common.height.saturating_sub(3)
        };
        let start = window_start(self.cursor, self.rows.len(), rows);
        let end = if rows == 0 {
            self.rows.len()
        } else {
            (start + rows).min(self.rows.len())
        };
        for (i, row) in self.rows[start..end].iter().enumerate() {
            if start + i == self.cursor {
                lines.push(styles.select_selector.render(&styles.option.render(&format_row(row))));
            } else {
                lines.push(format!("  {}", styles.option.render(&format_row(row))));
            }
        }
        lines.join("\n")
    }
}

impl Field for Table {
    fn get_key(&self) -> &str {
        &self.common.key
    }

    fn get_value(&self) -> Box<dyn Any> {
        Box::new(self.accessor.get())
    }

    fn zoom(&self) -> bool {
        self.zoom
    }

    fn error(&self) -> Option<&str> {
        self.common.err.as_deref()
    }

    fn init(&mut self) -> Option<Cmd> {
        self.common.refresh_with(Vec::new(), false)
    }

    fn update(&mut self, msg: &Message) -> Option<Cmd> {
        if self.common.handle_eval(msg) {
            return None;
        }
        let loading = self.common.title.is_loading() || self.common.description.is_loading();
        if let Some(next) = self.common.tick(msg, loading) {
            return next;
        }
        if msg.is::<UpdateFieldMsg>() {
            return self.init();
        }
        if !self.common.focused {
            return None;
        }
        self.handle_key(msg.downcast_ref::<KeyMsg>()?)
    }

    fn view(&self) -> String {
        let mut lines = Vec::new();
        let header = self.common.header();
        if !header.is_empty() {
            lines.push(header);
        }
        if let Some(desc) = self.common.description_view() {
            lines.push(desc);
        }
        lines.push(self.grid());
        self.common.frame(&lines.join("\n"))
    }

    fn focus(&mut self) -> Option<Cmd> {
        self.common.focused = true;
        None
    }

    fn blur(&mut self) -> Option<Cmd> {
        self.common.focused = false;
        self.common.err = (self.validate)(&self.accessor.get());
        None
    }

    fn key_binds(&self) -> Vec<Binding> {
        let km = &self.keymap;
        vec![
            km.up.clone(),
            km.down.clone(),
            km.prev.clone(),
            km.submit.clone(),
            km.next.clone(),
        ]
    }

    fn with_theme(&mut self, theme: &Theme) {
        self.common.theme = theme.clone();
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.table.clone();
        self.with_position(self.common.position);
    }

    fn with_width(&mut self, width: usize) {
        self.common.width = width;
    }

    fn with_height(&mut self, height: usize) {
        self.common.height = height;
    }

    fn with_position(&mut self, position: FieldPosition) {
        self.common.position = position;
        Common::apply_position(
            position,
            &mut self.keymap.prev,
            &mut self.keymap.next,
            &mut self.keymap.submit,
        );
    }

    fn run_accessible(&mut self, out: &mut dyn Write, input: &mut dyn BufRead) -> Result<()> {
        super::settle(self);
        super::accessible_header(&self.common, out)?;
        if self.rows.is_empty() {
            return Ok(());
        }
        if !self.columns.is_empty() {
            writeln!(out, "   {}", self.columns.join(" | "))?;
        }
        for (i, row) in self.rows.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, row.join(" | "))?;
        }
        loop {
            let n = accessible::prompt_int_in_range(out, input, "Choose: ", 1, self.rows.len())?;
            let row = self.rows[n - 1].clone();
            if let Some(err) = (self.validate)(&row) {
                writeln!(out, "{err}")?;
                continue;
            }
            self.cursor = n - 1;
            self.accessor.set(row);
            self.common.err = None;
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Value;
    use termloop::KeyType;
    use termloop::style::strip_ansi;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn menu(store: &Value<Row>) -> Table {
        Table::new()
            .columns(["Item", "Price"])
            .rows(vec![
                row(&["Burger", "8"]),
                row(&["Fries", "3"]),
                row(&["Milkshake", "5"]),
            ])
            .accessor(store.clone())
    }

    #[test]
    fn test_commit_on_confirm_only() {
        let store = Value::new(Vec::new());
        let mut table = menu(&store);
        table.focus();
        table.update(&Message::new(KeyMsg::from_type(KeyType::Down)));
        assert!(store.get().is_empty());

        let cmd = table
            .update(&Message::new(KeyMsg::from_type(KeyType::Enter)))
            .unwrap();
        assert!(cmd.execute().unwrap().is::<NextFieldMsg>());
        assert_eq!(store.get(), row(&["Fries", "3"]));
    }

    #[test]
    fn test_cursor_starts_on_committed_row() {
        let store = Value::new(row(&["Milkshake", "5"]));
        let table = menu(&store);
        assert_eq!(table.cursor, 2);
    }

    #[test]
    fn test_columns_are_aligned() {
        let store = Value::new(Vec::new());
        let mut table = menu(&store);
        table.with_theme(&crate::theme::theme_base());
        let view = strip_ansi(&table.view());
        let lines: Vec<&str> = view.lines().collect();
        let header = lines.iter().find(|l| l.contains("Item")).unwrap();
        let fries = lines.iter().find(|l| l.contains("Fries")).unwrap();
        assert_eq!(header.find("Price"), fries.find('3'));
    }

    #[test]
    fn test_accessible_picks_row() {
        let store = Value::new(Vec::new());
        let mut table = menu(&store);
        let mut out = Vec::new();
        let mut input: &[u8] = b"3\n";
        table.run_accessible(&mut out, &mut input).unwrap();
        assert_eq!(store.get(), row(&["Milkshake", "5"]));
    }
}
