//! Multiple selection from a list of options.

use std::any::Any;
use std::io::{BufRead, Write};

use termloop::binding::matches;
use termloop::{Binding, Cmd, KeyMsg, KeyType, Message};

use super::select::{SelectOption, filter_matches, window_start};
use super::{Common, Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::accessible;
use crate::accessor::{Accessor, EmbeddedAccessor};
use crate::error::Result;
use crate::eval::{Bindings, Eval, EvalTarget};
use crate::keymap::{KeyMap, MultiSelectKeyMap};
use crate::theme::Theme;
use crate::validate::{Validator, always_valid};

/// Pick any number of values from a list.
///
/// Ticks are tracked by value, so they survive filtering and option lists
/// that are recomputed. The accessor receives the ticked values, in option
/// order, when the user confirms.
pub struct MultiSelect<T: Clone + PartialEq + Send + Sync + 'static> {
    common: Common,
    accessor: Box<dyn Accessor<Vec<T>>>,
    options: Eval<Vec<SelectOption<T>>>,
    ticked: Vec<T>,
    cursor: usize,
    filter: String,
    filtering: bool,
    limit: usize,
    rows: usize,
    validate: Validator<Vec<T>>,
    keymap: MultiSelectKeyMap,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Default for MultiSelect<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> MultiSelect<T> {
    pub fn new() -> Self {
        Self {
            common: Common::new(),
            accessor: Box::new(EmbeddedAccessor::new(Vec::new())),
            options: Eval::new(Vec::new()),
            ticked: Vec::new(),
            cursor: 0,
            filter: String::new(),
            filtering: false,
            limit: 0,
            rows: 0,
            validate: always_valid(),
            keymap: MultiSelectKeyMap::default(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.common.key = key.into();
        self
    }

    /// Sets the options. Options marked `selected` start out ticked.
    pub fn options(mut self, options: Vec<SelectOption<T>>) -> Self {
        for opt in options.iter().filter(|o| o.selected) {
            if !self.ticked.contains(&opt.value) {
                self.ticked.push(opt.value.clone());
            }
        }
        self.options.set(options);
        self
    }

    pub fn options_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> Vec<SelectOption<T>> + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.options.set_func(f, bindings);
        self
    }

    /// Stores the selection in `accessor`; its current contents start out
    /// ticked.
    pub fn accessor(mut self, accessor: impl Accessor<Vec<T>> + 'static) -> Self {
        for v in accessor.get() {
            if !self.ticked.contains(&v) {
                self.ticked.push(v);
            }
        }
        self.accessor = Box::new(accessor);
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

    /// Maximum number of ticked options; 0 means unlimited.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Number of option rows to show; 0 shows all.
    pub fn height(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Vec<T>) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Box::new(validate);
        self
    }

    /// The committed selection.
    pub fn selected_values(&self) -> Vec<T> {
        self.accessor.get()
    }

    fn filtered(&self) -> Vec<&SelectOption<T>> {
        self.options
            .get()
            .iter()
            .filter(|o| filter_matches(&o.key, &self.filter))
            .collect()
    }

    fn is_ticked(&self, value: &T) -> bool {
        self.ticked.contains(value)
    }

    /// Ticked values in option order.
    fn candidate(&self) -> Vec<T> {
        self.options
            .get()
            .iter()
            .filter(|o| self.is_ticked(&o.value))
            .map(|o| o.value.clone())
            .collect()
    }

    fn at_limit(&self) -> bool {
        self.limit > 0 && self.ticked.len() >= self.limit
    }

    fn toggle(&mut self) {
        let Some(value) = self.filtered().get(self.cursor).map(|o| o.value.clone()) else {
            return;
        };
        if let Some(i) = self.ticked.iter().position(|v| *v == value) {
            self.ticked.remove(i);
        } else if !self.at_limit() {
            self.ticked.push(value);
        }
    }

    fn toggle_all(&mut self) {
        let visible: Vec<T> = self.filtered().iter().map(|o| o.value.clone()).collect();
        if visible.iter().all(|v| self.is_ticked(v)) {
            self.ticked.retain(|v| !visible.contains(v));
            return;
        }
        for v in visible {
            if self.at_limit() {
                break;
            }
            if !self.is_ticked(&v) {
                self.ticked.push(v);
            }
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.filtered().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn sync_bindings(&mut self) {
        let all_ticked = {
            let visible = self.filtered();
            !visible.is_empty() && visible.iter().all(|o| self.is_ticked(&o.value))
        };
        let km = &mut self.keymap;
        km.filter.enable(!self.filtering);
        km.set_filter.enable(self.filtering);
        km.clear_filter.enable(self.filtering || !self.filter.is_empty());
        km.select_all.enable(!all_ticked && self.limit == 0);
        km.select_none.enable(all_ticked && self.limit == 0);
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        self.common.err = None;

        if self.filtering {
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
            return None;
        }

        let km = &self.keymap;
        if matches(key, &[&km.clear_filter]) {
            self.filter.clear();
        } else if matches(key, &[&km.filter]) {
            self.filtering = true;
        } else if matches(key, &[&km.prev]) {
            self.common.err = (self.validate)(&self.accessor.get());
            if self.common.err.is_none() {
                return Some(Cmd::message(PrevFieldMsg));
            }
        } else if matches(key, &[&km.next, &km.submit]) {
            let candidate = self.candidate();
            self.common.err = (self.validate)(&candidate);
            if self.common.err.is_some() {
                return None;
            }
            self.accessor.set(candidate);
            return Some(Cmd::message(NextFieldMsg));
        } else if matches(key, &[&km.toggle]) {
            self.toggle();
        } else if matches(key, &[&km.select_all, &km.select_none]) {
            self.toggle_all();
        } else if matches(key, &[&km.up]) {
            self.cursor = self.cursor.saturating_sub(1);
        } else if matches(key, &[&km.down]) {
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
        let extra = vec![self.options.refresh(self.common.id, EvalTarget::Options)];
        self.clamp_cursor();
        let loading = self.options.is_loading();
        self.common.refresh_with(extra, loading)
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

        let rows = if self.rows > 0 {
            self.rows
        } else {
            self.common.height.saturating_sub(2)
        };
        let start = window_start(self.cursor, filtered.len(), rows);
        let end = if rows == 0 {
            filtered.len()
        } else {
            (start + rows).min(filtered.len())
        };

        let selector = styles.multi_select_selector.render("");
        let pad = " ".repeat(termloop::style::width(&selector));
        filtered[start..end]
            .iter()
            .enumerate()
            .map(|(i, opt)| {
                let lead = if start + i == self.cursor && self.common.focused {
                    selector.clone()
                } else {
                    pad.clone()
                };
                if self.is_ticked(&opt.value) {
                    format!(
                        "{lead}{}{}",
                        styles.selected_prefix.render(""),
                        styles.selected_option.render(&opt.key)
                    )
                } else {
                    format!(
                        "{lead}{}{}",
                        styles.unselected_prefix.render(""),
                        styles.unselected_option.render(&opt.key)
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Field for MultiSelect<T> {
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
        self.sync_bindings();
        self.refresh()
    }

    fn update(&mut self, msg: &Message) -> Option<Cmd> {
        if self.common.handle_eval(msg) {
            return None;
        }
        if self.options.handle(self.common.id, EvalTarget::Options, msg) {
            self.clamp_cursor();
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
        let mut header = self.common.header();
        if self.limit > 0 {
            header.push_str(&styles.description.render(&format!(
                " ({}/{})",
                self.ticked.len(),
                self.limit
            )));
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
            km.toggle.clone(),
            km.up.clone(),
            km.down.clone(),
            km.filter.clone(),
            km.clear_filter.clone(),
            km.select_all.clone(),
            km.select_none.clone(),
            km.prev.clone(),
            km.submit.clone(),
            km.next.clone(),
        ]
    }

    fn with_theme(&mut self, theme: &Theme) {
        self.common.theme = theme.clone();
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.multi_select.clone();
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
        loop {
            for (i, opt) in options.iter().enumerate() {
                let mark = if self.is_ticked(&opt.value) { "x" } else { " " };
                writeln!(out, "{}. [{mark}] {}", i + 1, opt.key)?;
            }
            writeln!(out, "0. Done")?;

            let n = accessible::prompt_int_in_range(out, input, "Toggle: ", 0, options.len())?;
            if n == 0 {
                let candidate = self.candidate();
                if let Some(err) = (self.validate)(&candidate) {
                    writeln!(out, "{err}")?;
                    continue;
                }
                self.accessor.set(candidate);
                self.common.err = None;
                return Ok(());
            }

            let value = &options[n - 1].value;
            if let Some(i) = self.ticked.iter().position(|v| v == value) {
                self.ticked.remove(i);
            } else if self.at_limit() {
                writeln!(out, "You can select at most {} options.", self.limit)?;
            } else {
                self.ticked.push(value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Value;
    use crate::field::new_options;

    fn key(kt: KeyType) -> Message {
        Message::new(KeyMsg::from_type(kt))
    }

    fn toppings(store: &Value<Vec<String>>) -> MultiSelect<String> {
        let mut ms = MultiSelect::new()
            .options(new_options(["Lettuce", "Tomato", "Cheese"]))
            .accessor(store.clone());
        ms.init();
        ms.focus();
        ms
    }

    #[test]
    fn test_toggle_commits_only_on_confirm() {
        let store = Value::new(Vec::new());
        let mut ms = toppings(&store);
        ms.update(&Message::new(KeyMsg::from_char('x')));
        ms.update(&key(KeyType::Down));
        ms.update(&key(KeyType::Down));
        ms.update(&key(KeyType::Space));
        assert!(store.get().is_empty());

        let cmd = ms.update(&key(KeyType::Enter)).unwrap();
        assert!(cmd.execute().unwrap().is::<NextFieldMsg>());
        assert_eq!(store.get(), vec!["Lettuce".to_string(), "Cheese".to_string()]);
    }

    #[test]
    fn test_limit_caps_ticks() {
        let store = Value::new(Vec::new());
        let mut ms = toppings(&store).limit(1);
        ms.focus();
        ms.update(&key(KeyType::Space));
        ms.update(&key(KeyType::Down));
        ms.update(&key(KeyType::Space));
        assert_eq!(ms.candidate(), vec!["Lettuce".to_string()]);
    }

    #[test]
    fn test_select_all_then_none() {
        let store = Value::new(Vec::new());
        let mut ms = toppings(&store);
        ms.update(&key(KeyType::CtrlA));
        assert_eq!(ms.candidate().len(), 3);
        ms.update(&key(KeyType::CtrlA));
        assert!(ms.candidate().is_empty());
    }

    #[test]
    fn test_ticks_survive_filter() {
        let store = Value::new(Vec::new());
        let mut ms = toppings(&store);
        ms.update(&Message::new(KeyMsg::from_char('/')));
        for c in "che".chars() {
            ms.update(&Message::new(KeyMsg::from_char(c)));
        }
        ms.update(&key(KeyType::Enter));
        ms.update(&key(KeyType::Space));
        ms.update(&key(KeyType::Esc));
        assert_eq!(ms.filtered().len(), 3);
        assert_eq!(ms.candidate(), vec!["Cheese".to_string()]);
    }

    #[test]
    fn test_validation_on_confirm() {
        let store = Value::new(Vec::new());
        let mut ms = toppings(&store)
            .validate(|v: &Vec<String>| v.is_empty().then(|| "pick one".to_string()));
        ms.focus();
        assert!(ms.update(&key(KeyType::Enter)).is_none());
        assert_eq!(ms.error(), Some("pick one"));
    }

    #[test]
    fn test_accessible_toggle_and_done() {
        let store = Value::new(Vec::new());
        let mut ms = MultiSelect::new()
            .options(new_options(["a", "b", "c"]))
            .accessor(store.clone());
        let mut out = Vec::new();
        let mut input: &[u8] = b"3\n1\n3\n2\n0\n";
        ms.run_accessible(&mut out, &mut input).unwrap();
        assert_eq!(store.get(), vec!["a".to_string(), "b".to_string()]);
    }
}
