//! Single selection from a list of options.

use std::any::Any;
use std::fmt;
use std::io::{BufRead, Write};

use termloop::binding::matches;
use termloop::{Binding, Cmd, KeyMsg, KeyType, Message};

use super::{Common, Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::accessible;
use crate::accessor::{Accessor, EmbeddedAccessor};
use crate::error::Result;
use crate::eval::{Bindings, Eval, EvalTarget};
use crate::keymap::{KeyMap, SelectKeyMap};
use crate::theme::Theme;
use crate::validate::Validator;

/// An option for select fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectOption<T> {
    /// Text shown to the user.
    pub key: String,
    /// Value stored when the option is chosen.
    pub value: T,
    /// Whether the option starts out under the cursor (or ticked, in a
    /// multi-select).
    pub selected: bool,
}

impl<T> SelectOption<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl<T: fmt::Display> SelectOption<T> {
    /// Options labelled with each value's `Display` output.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Vec<Self> {
        values
            .into_iter()
            .map(|v| Self::new(v.to_string(), v))
            .collect()
    }
}

/// Options whose label and value are the same string.
///
/// ```rust
/// use termform::new_options;
///
/// let opts = new_options(["Soft", "Hard"]);
/// assert_eq!(opts[1].key, "Hard");
/// assert_eq!(opts[1].value, "Hard");
/// ```
pub fn new_options<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Vec<SelectOption<String>> {
    values
        .into_iter()
        .map(|v| {
            let s: String = v.into();
            SelectOption::new(s.clone(), s)
        })
        .collect()
}

/// Case-insensitive substring match on option labels.
pub(crate) fn filter_matches(key: &str, filter: &str) -> bool {
    filter.is_empty() || key.to_lowercase().contains(&filter.to_lowercase())
}

/// First row of a `rows`-high window that keeps `cursor` visible.
pub(crate) fn window_start(cursor: usize, len: usize, rows: usize) -> usize {
    if rows == 0 || len <= rows {
        return 0;
    }
    cursor.saturating_sub(rows - 1).min(len - rows)
}

/// Pick one value from a list.
///
/// The cursor moves freely; the accessor is written only when the user
/// confirms with enter/tab and the hovered value passes validation.
///
/// ```rust
/// use termform::{Select, SelectOption, Value};
///
/// let size = Value::new(String::new());
/// let select = Select::new()
///     .key("size")
///     .title("Size")
///     .options(termform::new_options(["Small", "Large"]))
///     .accessor(size.clone());
/// ```
pub struct Select<T: Clone + PartialEq + Default + Send + Sync + 'static> {
    common: Common,
    accessor: Box<dyn Accessor<T>>,
    options: Eval<Vec<SelectOption<T>>>,
    cursor: usize,
    filter: String,
    filtering: bool,
    inline: bool,
    rows: usize,
    validate: Validator<T>,
    keymap: SelectKeyMap,
}

impl<T: Clone + PartialEq + Default + Send + Sync + 'static> Default for Select<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Default + Send + Sync + 'static> Select<T> {
    pub fn new() -> Self {
        let mut select = Self {
            common: Common::new(),
            accessor: Box::new(EmbeddedAccessor::new(T::default())),
            options: Eval::new(Vec::new()),
            cursor: 0,
            filter: String::new(),
            filtering: false,
            inline: false,
            rows: 0,
            validate: Box::new(|_| None),
            keymap: SelectKeyMap::default(),
        };
        select.sync_bindings();
        select
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.common.key = key.into();
        self
    }

    /// Sets the initially committed value.
    pub fn value(mut self, value: T) -> Self {
        self.accessor.set(value);
        self.position_on_committed();
        self
    }

    pub fn accessor(mut self, accessor: impl Accessor<T> + 'static) -> Self {
        self.accessor = Box::new(accessor);
        self.position_on_committed();
        self
    }

    pub fn options(mut self, options: Vec<SelectOption<T>>) -> Self {
        let preselected = options.iter().position(|o| o.selected);
        self.options.set(options);
        match preselected {
            Some(i) => self.cursor = i,
            None => self.position_on_committed(),
        }
        self
    }

    /// Recomputes the options whenever `bindings` change. The list shows a
    /// spinner while the computation runs.
    pub fn options_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> Vec<SelectOption<T>> + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.options.set_func(f, bindings);
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

    pub fn description_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.common.set_description_func(f, bindings);
        self
    }

    /// Show the title and a single option with ←/→ to cycle.
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self.sync_bindings();
        self
    }

    /// Number of option rows to show; 0 shows all.
    pub fn height(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Box::new(validate);
        self
    }

    /// The committed value.
    pub fn selected_value(&self) -> T {
        self.accessor.get()
    }

    /// The option under the cursor.
    pub fn hovered(&self) -> Option<&SelectOption<T>> {
        self.filtered().into_iter().nth(self.cursor)
    }

    fn filtered(&self) -> Vec<&SelectOption<T>> {
        self.options
            .get()
            .iter()
            .filter(|o| filter_matches(&o.key, &self.filter))
            .collect()
    }

    fn position_on_committed(&mut self) {
        let committed = self.accessor.get();
        let found = self.filtered().iter().position(|o| o.value == committed);
        match found {
            Some(i) => self.cursor = i,
            None => self.clamp_cursor(),
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.filtered().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn visible_rows(&self) -> usize {
        if self.rows > 0 {
            self.rows
        } else {
            self.common.height.saturating_sub(2)
        }
    }

    fn sync_bindings(&mut self) {
        let km = &mut self.keymap;
        km.up.enable(!self.inline);
        km.down.enable(!self.inline);
        km.left.enable(self.inline);
        km.right.enable(self.inline);
        km.filter.enable(!self.inline && !self.filtering);
        km.set_filter.enable(self.filtering);
        km.clear_filter.enable(self.filtering || !self.filter.is_empty());
    }

    fn confirm(&mut self) -> Option<Cmd> {
        let Some(candidate) = self.hovered().map(|o| o.value.clone()) else {
            self.common.err = (self.validate)(&self.accessor.get());
            return self.common.err.is_none().then(|| Cmd::message(NextFieldMsg));
        };
        self.common.err = (self.validate)(&candidate);
        if self.common.err.is_some() {
            return None;
        }
        self.accessor.set(candidate);
        Some(Cmd::message(NextFieldMsg))
    }

    fn handle_filter_key(&mut self, key: &KeyMsg) {
        match key.key_type {
            KeyType::Enter => self.filtering = false,
            KeyType::Esc => {
                self.filtering = false;
                self.filter.clear();
            }
            KeyType::Backspace => {
                self.filter.pop();
            }
            KeyType::Runes if !key.alt => self.filter.extend(key.runes.iter()),
            KeyType::Space => self.filter.push(' '),
            KeyType::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyType::Down => self.cursor += 1,
            _ => {}
        }
        self.clamp_cursor();
        self.sync_bindings();
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        self.common.err = None;

        if self.filtering {
            self.handle_filter_key(key);
            return None;
        }

        let km = &self.keymap;
        if matches(key, &[&km.clear_filter]) {
            self.filter.clear();
            self.position_on_committed();
        } else if matches(key, &[&km.filter]) {
            self.filtering = true;
        } else if matches(key, &[&km.prev]) {
            self.common.err = (self.validate)(&self.accessor.get());
            if self.common.err.is_none() {
                return Some(Cmd::message(PrevFieldMsg));
            }
        } else if matches(key, &[&km.next, &km.submit]) {
            return self.confirm();
        } else if matches(key, &[&km.up, &km.left]) {
            self.cursor = self.cursor.saturating_sub(1);
        } else if matches(key, &[&km.down, &km.right]) {
            self.cursor += 1;
        } else if matches(key, &[&km.goto_top]) {
            self.cursor = 0;
        } else if matches(key, &[&km.goto_bottom]) {
            self.cursor = usize::MAX;
        }
        self.clamp_cursor();
        self.sync_bindings();
        None
    }

    fn loading(&self) -> bool {
        self.common.title.is_loading()
            || self.common.description.is_loading()
            || self.options.is_loading()
    }

    fn refresh(&mut self) -> Option<Cmd> {
        let revision = self.options.revision();
        let extra = vec![self.options.refresh(self.common.id, EvalTarget::Options)];
        if self.options.revision() != revision {
            // A cache hit swapped the list.
            self.position_on_committed();
        }
        let loading = self.options.is_loading();
        self.common.refresh_with(extra, loading)
    }

    fn inline_view(&self) -> String {
        let styles = self.common.styles();
        let filtered = self.filtered();
        let mut out = String::new();
        if self.cursor > 0 {
            out.push_str(&styles.prev_indicator.render(""));
        }
        if let Some(opt) = filtered.get(self.cursor) {
            out.push_str(&styles.option.render(&opt.key));
        }
        if self.cursor + 1 < filtered.len() {
            out.push_str(&styles.next_indicator.render(""));
        }
        out
    }

    fn options_view(&self) -> String {
        let styles = self.common.styles();
        if self.options.show_spinner() {
            return format!("{} Loading...", self.common.spinner_view());
        }

        let filtered = self.filtered();
        if filtered.is_empty() {
            let text = if self.options.is_loading() { "Loading..." } else { "No matches" };
            return styles.description.render(text);
        }

        let selector = styles.select_selector.render("");
        let pad = " ".repeat(termloop::style::width(&selector));
        let rows = self.visible_rows();
        let start = window_start(self.cursor, filtered.len(), rows);
        let end = if rows == 0 {
            filtered.len()
        } else {
            (start + rows).min(filtered.len())
        };

        filtered[start..end]
            .iter()
            .enumerate()
            .map(|(i, opt)| {
                if start + i == self.cursor {
                    format!("{selector}{}", styles.selected_option.render(&opt.key))
                } else {
                    format!("{pad}{}", styles.option.render(&opt.key))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<T: Clone + PartialEq + Default + Send + Sync + 'static> Field for Select<T> {
    fn get_key(&self) -> &str {
        &self.common.key
    }

    fn get_value(&self) -> Box<dyn Any> {
        Box::new(self.accessor.get())
    }

    fn error(&self) -> Option<&str> {
        self.common.err.as_deref()
    }

    fn init(&mut self) -> Option<Cmd> {
        self.refresh()
    }

    fn update(&mut self, msg: &Message) -> Option<Cmd> {
        if self.common.handle_eval(msg) {
            return None;
        }
        if self.options.handle(self.common.id, EvalTarget::Options, msg) {
            self.position_on_committed();
            return None;
        }
        let loading = self.loading();
        if let Some(next) = self.common.tick(msg, loading) {
            self.options.check_spinner_delay();
            return next;
        }
        if msg.is::<UpdateFieldMsg>() {
            return self.refresh();
        }
        if !self.common.focused {
            return None;
        }
        self.handle_key(msg.downcast_ref::<KeyMsg>()?)
    }

    fn view(&self) -> String {
        let styles = self.common.styles();
        let mut lines = Vec::new();
        let header = self.common.header();

        if self.inline {
            let mut line = header;
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&self.inline_view());
            lines.push(line);
            if let Some(desc) = self.common.description_view() {
                lines.push(desc);
            }
            return self.common.frame(&lines.join("\n"));
        }

        if !header.is_empty() {
            lines.push(header);
        }
        if self.filtering || !self.filter.is_empty() {
            lines.push(styles.description.render(&format!("/{}", self.filter)));
        }
        if let Some(desc) = self.common.description_view() {
            lines.push(desc);
        }
        lines.push(self.options_view());
        self.common.frame(&lines.join("\n"))
    }

    fn focus(&mut self) -> Option<Cmd> {
        self.common.focused = true;
        None
    }

    fn blur(&mut self) -> Option<Cmd> {
        self.common.focused = false;
        self.filtering = false;
        self.sync_bindings();
        self.common.err = (self.validate)(&self.accessor.get());
        None
    }

    fn key_binds(&self) -> Vec<Binding> {
        let km = &self.keymap;
        if self.filtering {
            return vec![
                km.up.clone(),
                km.down.clone(),
                km.set_filter.clone(),
                km.clear_filter.clone(),
            ];
        }
        vec![
            km.up.clone(),
            km.down.clone(),
            km.left.clone(),
            km.right.clone(),
            km.filter.clone(),
            km.clear_filter.clone(),
            km.prev.clone(),
            km.submit.clone(),
            km.next.clone(),
        ]
    }

    fn with_theme(&mut self, theme: &Theme) {
        self.common.theme = theme.clone();
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.select.clone();
        self.sync_bindings();
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

        let options = self.options.get().clone();
        if options.is_empty() {
            writeln!(out, "No options available.")?;
            return Ok(());
        }
        for (i, opt) in options.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, opt.key)?;
        }

        loop {
            let n = accessible::prompt_int_in_range(out, input, "Choose: ", 1, options.len())?;
            let candidate = options[n - 1].value.clone();
            if let Some(err) = (self.validate)(&candidate) {
                writeln!(out, "{err}")?;
                continue;
            }
            self.accessor.set(candidate);
            self.filter.clear();
            self.cursor = n - 1;
            self.common.err = None;
            return Ok(());
        }
    }
}
