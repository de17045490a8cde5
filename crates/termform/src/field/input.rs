//! Single-line text input.

use std::any::Any;
use std::io::{BufRead, Write};

use termloop::binding::matches;
use termloop::{Binding, Cmd, KeyMsg, KeyType, Message};

use super::{Common, Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::accessible;
use crate::accessor::{Accessor, EmbeddedAccessor};
use crate::error::Result;
use crate::eval::{Bindings, Eval, EvalTarget};
use crate::keymap::{InputKeyMap, KeyMap};
use crate::theme::Theme;

type StrValidator = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// How typed characters are displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EchoMode {
    /// Show the text as typed.
    #[default]
    Normal,
    /// Show one `*` per character.
    Password,
    /// Show nothing.
    None,
}

/// A single-line text input.
///
/// Every edit is written to the accessor immediately.
///
/// ```rust
/// use termform::{Input, Value};
///
/// let name = Value::new(String::new());
/// let input = Input::new()
///     .key("name")
///     .title("What's your name?")
///     .placeholder("Ada")
///     .accessor(name.clone());
/// ```
pub struct Input {
    common: Common,
    accessor: Box<dyn Accessor<String>>,
    value: Vec<char>,
    cursor: usize,
    placeholder: Eval<String>,
    suggestions: Eval<Vec<String>>,
    prompt: String,
    char_limit: usize,
    echo_mode: EchoMode,
    inline: bool,
    validate: StrValidator,
    keymap: InputKeyMap,
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Input {
    pub fn new() -> Self {
        Self {
            common: Common::new(),
            accessor: Box::new(EmbeddedAccessor::new(String::new())),
            value: Vec::new(),
            cursor: 0,
            placeholder: Eval::new(String::new()),
            suggestions: Eval::new(Vec::new()),
            prompt: "> ".to_string(),
            char_limit: 0,
            echo_mode: EchoMode::Normal,
            inline: false,
            validate: Box::new(|_| None),
            keymap: InputKeyMap::default(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.common.key = key.into();
        self
    }

    /// Sets the initial text.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.value = value.chars().collect();
        self.cursor = self.value.len();
        self.accessor.set(value);
        self
    }

    /// Stores the text in `accessor`, starting from its current contents.
    pub fn accessor(mut self, accessor: impl Accessor<String> + 'static) -> Self {
        let current = accessor.get();
        self.value = current.chars().collect();
        self.cursor = self.value.len();
        self.accessor = Box::new(accessor);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.common.title.set(title.into());
        self
    }

    /// Computes the title from `bindings` whenever they change.
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

    pub fn placeholder_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.placeholder.set_func(f, bindings);
        self
    }

    /// Completions offered while typing; accepted with ctrl+e.
    pub fn suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions.set(suggestions);
        self
    }

    pub fn suggestions_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.suggestions.set_func(f, bindings);
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Maximum number of characters; 0 means unlimited.
    pub fn char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit;
        self
    }

    pub fn echo_mode(mut self, mode: EchoMode) -> Self {
        self.echo_mode = mode;
        self
    }

    /// Shorthand for [`EchoMode::Password`].
    pub fn password(self, password: bool) -> Self {
        self.echo_mode(if password {
            EchoMode::Password
        } else {
            EchoMode::Normal
        })
    }

    /// Render title and input on one line.
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Box::new(validate);
        self
    }

    /// The text currently in the input.
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

    fn insert(&mut self, chars: &[char]) {
        for &c in chars {
            if self.char_limit > 0 && self.value.len() >= self.char_limit {
                break;
            }
            self.value.insert(self.cursor, c);
            self.cursor += 1;
        }
    }

    /// First suggestion that extends the current text.
    fn suggestion(&self) -> Option<&str> {
        let text = self.text();
        if text.is_empty() {
            return None;
        }
        self.suggestions
            .get()
            .iter()
            .find(|s| s.len() > text.len() && s.starts_with(&text))
            .map(String::as_str)
    }

    fn refresh(&mut self) -> Option<Cmd> {
        let id = self.common.id;
        let extra = vec![
            self.placeholder.refresh(id, EvalTarget::Placeholder),
            self.suggestions.refresh(id, EvalTarget::Suggestions),
        ];
        let loading = self.placeholder.is_loading() || self.suggestions.is_loading();
        self.common.refresh_with(extra, loading)
    }

    fn loading(&self) -> bool {
        self.common.title.is_loading()
            || self.common.description.is_loading()
            || self.placeholder.is_loading()
            || self.suggestions.is_loading()
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        self.common.err = None;

        if matches(key, &[&self.keymap.prev]) {
            if !self.run_validation() {
                return None;
            }
            return Some(Cmd::message(PrevFieldMsg));
        }
        if matches(key, &[&self.keymap.next, &self.keymap.submit]) {
            if !self.run_validation() {
                return None;
            }
            return Some(Cmd::message(NextFieldMsg));
        }
        if matches(key, &[&self.keymap.accept_suggestion]) {
            if let Some(s) = self.suggestion().map(str::to_string) {
                self.value = s.chars().collect();
                self.cursor = self.value.len();
                self.commit();
            }
            return None;
        }

        match key.key_type {
            KeyType::Runes if !key.alt => self.insert(&key.runes),
            KeyType::Space => self.insert(&[' ']),
            KeyType::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.value.remove(self.cursor);
            }
            KeyType::Delete if self.cursor < self.value.len() => {
                self.value.remove(self.cursor);
            }
            KeyType::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyType::Right => self.cursor = (self.cursor + 1).min(self.value.len()),
            KeyType::Home | KeyType::CtrlA => self.cursor = 0,
            KeyType::End => self.cursor = self.value.len(),
            KeyType::CtrlU => {
                self.value.drain(..self.cursor);
                self.cursor = 0;
            }
            KeyType::CtrlK => self.value.truncate(self.cursor),
            KeyType::CtrlW => {
                let end = self.cursor;
                let mut start = end;
                while start > 0 && self.value[start - 1] == ' ' {
                    start -= 1;
                }
                while start > 0 && self.value[start - 1] != ' ' {
                    start -= 1;
                }
                self.value.drain(start..end);
                self.cursor = start;
            }
            _ => return None,
        }
        self.commit();
        None
    }

    fn masked(&self) -> Vec<char> {
        match self.echo_mode {
            EchoMode::Normal => self.value.clone(),
            EchoMode::Password => vec!['*'; self.value.len()],
            EchoMode::None => Vec::new(),
        }
    }

    fn input_view(&self) -> String {
        let styles = &self.common.styles().text_input;
        let mut out = styles.prompt.render(&self.prompt);

        if self.value.is_empty() {
            let placeholder = self.placeholder.get();
            if self.common.focused {
                let mut chars = placeholder.chars();
                let first = chars.next().map_or_else(|| " ".to_string(), String::from);
                out.push_str(&styles.cursor.render(&first));
                let rest: String = chars.collect();
                if !rest.is_empty() {
                    out.push_str(&styles.placeholder.render(&rest));
                }
            } else if !placeholder.is_empty() {
                out.push_str(&styles.placeholder.render(placeholder));
            }
            return out;
        }

        let shown = self.masked();
        if !self.common.focused || self.echo_mode == EchoMode::None {
            let text: String = shown.iter().collect();
            out.push_str(&styles.text.render(&text));
            return out;
        }

        let cursor = self.cursor.min(shown.len());
        let before: String = shown[..cursor].iter().collect();
        out.push_str(&styles.text.render(&before));
        match shown.get(cursor) {
            Some(c) => {
                out.push_str(&styles.cursor.render(&c.to_string()));
                let after: String = shown[cursor + 1..].iter().collect();
                out.push_str(&styles.text.render(&after));
            }
            None => {
                let hint = self.suggestion().map(|s| s[self.text().len()..].to_string());
                match hint {
                    Some(rest) => {
                        let mut chars = rest.chars();
                        let first = chars.next().map(String::from).unwrap_or_default();
                        out.push_str(&styles.cursor.render(&first));
                        out.push_str(&styles.placeholder.render(chars.as_str()));
                    }
                    None => out.push_str(&styles.cursor.render(" ")),
                }
            }
        }
        out
    }
}

impl Field for Input {
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
        let id = self.common.id;
        if self.common.handle_eval(msg)
            || self.placeholder.handle(id, EvalTarget::Placeholder, msg)
            || self.suggestions.handle(id, EvalTarget::Suggestions, msg)
        {
            return None;
        }
        let loading = self.loading();
        if let Some(next) = self.common.tick(msg, loading) {
            return next;
        }
        if msg.is::<UpdateFieldMsg>() {
            return self.refresh();
        }
        if !self.common.focused {
            return None;
        }
        let key = msg.downcast_ref::<KeyMsg>()?;
        self.handle_key(key)
    }

    fn view(&self) -> String {
        let mut out = self.common.header();
        if self.inline {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&self.input_view());
        } else {
            if let Some(desc) = self.common.description_view() {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&desc);
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&self.input_view());
        }
        self.common.frame(&out)
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
        let mut binds = Vec::new();
        if !self.suggestions.get().is_empty() {
            binds.push(self.keymap.accept_suggestion.clone());
        }
        binds.extend([
            self.keymap.prev.clone(),
            self.keymap.submit.clone(),
            self.keymap.next.clone(),
        ]);
        binds
    }

    fn with_theme(&mut self, theme: &Theme) {
        self.common.theme = theme.clone();
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.input.clone();
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
        let char_limit = self.char_limit;
        let validate = &self.validate;
        let line = accessible::prompt_validated(out, input, &self.prompt, |s| {
            if char_limit > 0 && s.chars().count() > char_limit {
                return Some(format!("Input cannot exceed {char_limit} characters"));
            }
            validate(s)
        })?;
        self.value = line.chars().collect();
        self.cursor = self.value.len();
        self.common.err = None;
        self.commit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Value;
    use termloop::style::strip_ansi;

    fn typed(input: &mut Input, s: &str) {
        for c in s.chars() {
            input.update(&Message::new(KeyMsg::from_char(c)));
        }
    }

    fn focused() -> Input {
        let mut input = Input::new();
        input.focus();
        input
    }

    #[test]
    fn test_typing_writes_through_immediately() {
        let name = Value::new(String::new());
        let mut input = Input::new().accessor(name.clone());
        input.focus();
        typed(&mut input, "Ada");
        assert_eq!(name.get(), "Ada");
        input.update(&Message::new(KeyMsg::from_type(KeyType::Backspace)));
        assert_eq!(name.get(), "Ad");
    }

    #[test]
    fn test_blurred_input_ignores_keys() {
        let mut input = Input::new();
        typed(&mut input, "x");
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_char_limit() {
        let mut input = focused().char_limit(3);
        input.focus();
        typed(&mut input, "abcdef");
        assert_eq!(input.text(), "abc");
    }

    #[test]
    fn test_cursor_editing() {
        let mut input = focused().value("hello world");
        input.focus();
        input.update(&Message::new(KeyMsg::from_type(KeyType::CtrlW)));
        assert_eq!(input.text(), "hello ");
        input.update(&Message::new(KeyMsg::from_type(KeyType::Home)));
        input.update(&Message::new(KeyMsg::from_type(KeyType::Delete)));
        assert_eq!(input.text(), "ello ");
        input.update(&Message::new(KeyMsg::from_type(KeyType::CtrlK)));
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_validation_blocks_next() {
        let mut input = focused().validate(|s: &str| s.is_empty().then(|| "required".to_string()));
        input.focus();
        // Position in the middle of a form so `next` (not only submit) is live.
        input.with_position(FieldPosition {
            field: 0,
            last_field: 1,
            ..FieldPosition::default()
        });

        let cmd = input.update(&Message::new(KeyMsg::from_type(KeyType::Enter)));
        assert!(cmd.is_none());
        assert_eq!(input.error(), Some("required"));

        typed(&mut input, "ok");
        assert!(input.error().is_none());
        let cmd = input.update(&Message::new(KeyMsg::from_type(KeyType::Tab))).unwrap();
        assert!(cmd.execute().unwrap().is::<NextFieldMsg>());
    }

    #[test]
    fn test_suggestion_completion() {
        let mut input = focused().suggestions(vec!["rust".into(), "ruby".into()]);
        input.focus();
        typed(&mut input, "rub");
        input.update(&Message::new(KeyMsg::from_type(KeyType::CtrlE)));
        assert_eq!(input.text(), "ruby");
    }

    #[test]
    fn test_password_view_masks() {
        let mut input = Input::new().password(true).value("secret");
        input.with_theme(&crate::theme::theme_base());
        let view = strip_ansi(&input.view());
        assert!(view.contains("******"));
        assert!(!view.contains("secret"));
    }

    #[test]
    fn test_view_is_idempotent() {
        let mut input = focused().title("Name").placeholder("Ada");
        input.focus();
        assert_eq!(input.view(), input.view());
    }

    #[test]
    fn test_accessible_reprompts_until_valid() {
        let mut input = Input::new()
            .title("Name")
            .validate(|s: &str| s.is_empty().then(|| "required".to_string()));
        let mut out = Vec::new();
        let mut reader: &[u8] = b"\nAda\n";
        input.run_accessible(&mut out, &mut reader).unwrap();
        assert_eq!(input.text(), "Ada");
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("required"));
    }
}
