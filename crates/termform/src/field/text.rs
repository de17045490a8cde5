//! Multi-line text entry.

use std::any::Any;
use std::io::{BufRead, Write};

use termloop::binding::matches;
use termloop::{Binding, Cmd, KeyMsg, KeyType, Message};

use super::{Common, Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::accessible;
use crate::accessor::{Accessor, EmbeddedAccessor};
use crate::error::Result;
use crate::eval::{Bindings, Eval, EvalTarget};
use crate::keymap::{KeyMap, TextKeyMap};
use crate::theme::Theme;

type StrValidator = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A multi-line text area. Enter moves on; alt+enter or ctrl+j inserts a
/// line break.
pub struct Text {
    common: Common,
    accessor: Box<dyn Accessor<String>>,
    value: Vec<char>,
    cursor: usize,
    placeholder: Eval<String>,
    char_limit: usize,
    line_count: usize,
    validate: StrValidator,
    keymap: TextKeyMap,
}

impl Default for Text {
    fn default() -> Self {
        Self::new()
    }
}

impl Text {
    pub fn new() -> Self {
        Self {
            common: Common::new(),
            accessor: Box::new(EmbeddedAccessor::new(String::new())),
            value: Vec::new(),
            cursor: 0,
            placeholder: Eval::new(String::new()),
            char_limit: 400,
            line_count: 5,
            validate: Box::new(|_| None),
            keymap: TextKeyMap::default(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.common.key = key.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.value = value.chars().collect();
        self.cursor = self.value.len();
        self.accessor.set(value);
        self
    }

    pub fn accessor(mut self, accessor: impl Accessor<String> + 'static) -> Self {
        self.value = accessor.get().chars().collect();
        self.cursor = self.value.len();
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

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder.set(placeholder.into());
        self
    }

    /// Maximum number of characters, line breaks included; 0 means
    /// unlimited.
    pub fn char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit;
        self
    }

    /// Number of visible lines.
    pub fn lines(mut self, lines: usize) -> Self {
        self.line_count = lines.max(1);
        self
    }

    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Box::new(validate);
        self
    }

    pub fn text(&self) -> String {
        self.value.iter().collect()
    }

    fn commit(&mut self) {
        let text = self.text();
        self.accessor.set(text);
    }

    fn run_validation(&mut self) -> bool {
        self.common.err = (self.validate)(&self.text());
        self.common.err.is_none()
    }

    fn insert(&mut self, c: char) {
        if self.char_limit > 0 && self.value.len() >= self.char_limit {
            return;
        }
        self.value.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Start index of the line containing `pos`.
    fn line_start(&self, pos: usize) -> usize {
        self.value[..pos]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1)
    }

    /// End index (exclusive, at the newline) of the line containing `pos`.
    fn line_end(&self, pos: usize) -> usize {
        self.value[pos..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(self.value.len(), |i| pos + i)
    }

    fn move_vertical(&mut self, down: bool) {
        let start = self.line_start(self.cursor);
        let column = self.cursor - start;
        let target_start = if down {
            let end = self.line_end(self.cursor);
            if end == self.value.len() {
                return;
            }
            end + 1
        } else {
            if start == 0 {
                return;
            }
            self.line_start(start - 1)
        };
        let target_end = self.line_end(target_start);
        self.cursor = (target_start + column).min(target_end);
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        self.common.err = None;

        if matches(key, &[&self.keymap.new_line]) {
            self.insert('\n');
            self.commit();
            return None;
        }
        if matches(key, &[&self.keymap.prev]) {
            return self.run_validation().then(|| Cmd::message(PrevFieldMsg));
        }
        if matches(key, &[&self.keymap.next, &self.keymap.submit]) {
            return self.run_validation().then(|| Cmd::message(NextFieldMsg));
        }

        match key.key_type {
            KeyType::Runes if !key.alt => {
                for &c in &key.runes {
                    self.insert(c);
                }
            }
            KeyType::Space => self.insert(' '),
            KeyType::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.value.remove(self.cursor);
            }
            KeyType::Delete if self.cursor < self.value.len() => {
                self.value.remove(self.cursor);
            }
            KeyType::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyType::Right => self.cursor = (self.cursor + 1).min(self.value.len()),
            KeyType::Up => self.move_vertical(false),
            KeyType::Down => self.move_vertical(true),
            KeyType::Home => self.cursor = self.line_start(self.cursor),
            KeyType::End => self.cursor = self.line_end(self.cursor),
            _ => return None,
        }
        self.commit();
        None
    }

    fn body(&self) -> String {
        let styles = &self.common.styles().text_input;
        if self.value.is_empty() {
            let mut lines = vec![styles.placeholder.render(self.placeholder.get())];
            lines.resize(self.line_count, String::new());
            return lines.join("\n");
        }

        let text = self.text();
        let lines: Vec<&str> = text.split('\n').collect();
        let cursor_line = self.value[..self.cursor].iter().filter(|&&c| c == '\n').count();
        let start = (cursor_line + 1).saturating_sub(self.line_count);
        let mut shown: Vec<String> = lines
            .iter()
            .skip(start)
            .take(self.line_count)
            .map(|line| styles.text.render(line))
            .collect();
        shown.resize(self.line_count, String::new());
        shown.join("\n")
    }
}

impl Field for Text {
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
        let extra = vec![self.placeholder.refresh(self.common.id, EvalTarget::Placeholder)];
        let loading = self.placeholder.is_loading();
        self.common.refresh_with(extra, loading)
    }

    fn update(&mut self, msg: &Message) -> Option<Cmd> {
        if self.common.handle_eval(msg)
            || self.placeholder.handle(self.common.id, EvalTarget::Placeholder, msg)
        {
            return None;
        }
        let loading = self.common.title.is_loading()
            || self.common.description.is_loading()
            || self.placeholder.is_loading();
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
        let mut parts = Vec::new();
        let header = self.common.header();
        if !header.is_empty() {
            parts.push(header);
        }
        if let Some(desc) = self.common.description_view() {
            parts.push(desc);
        }
        parts.push(self.body());
        self.common.frame(&parts.join("\n"))
    }

    fn focus(&mut self) -> Option<Cmd> {
        self.common.focused = true;
        None
    }

    fn blur(&mut self) -> Option<Cmd> {
        self.common.focused = false;
        self.run_validation();
        None
    }

    fn key_binds(&self) -> Vec<Binding> {
        vec![
            self.keymap.new_line.clone(),
            self.keymap.prev.clone(),
            self.keymap.submit.clone(),
            self.keymap.next.clone(),
        ]
    }

    fn with_theme(&mut self, theme: &Theme) {
        self.common.theme = theme.clone();
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.text.clone();
        self.with_position(self.common.position);
    }

    fn with_width(&mut self, width: usize) {
        self.common.width = width;
    }

    fn with_height(&mut self, height: usize) {
        self.common.height = height;
        // Leave room for title and description.
        if height > 2 {
            self.line_count = height - 2;
        }
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
        let char_limit = self.char_limit;
        let validate = &self.validate;
        let line = accessible::prompt_validated(out, input, "> ", |s| {
            if char_limit > 0 && s.chars().count() > char_limit {
                return Some(format!("Input cannot exceed {char_limit} characters"));
            }
            validate(s)
        })?;
        self.value = line.chars().collect();
        self.cursor = self.value.len();
        self.accessor.set(line);
        Ok(())
    }
}
