//! Static text between inputs.

use std::any::Any;
use std::io::{BufRead, Write};

use termloop::binding::matches;
use termloop::{Binding, Cmd, KeyMsg, Message};

use super::{Common, Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::error::Result;
use crate::eval::Bindings;
use crate::keymap::{KeyMap, NoteKeyMap};
use crate::theme::Theme;

/// A read-only block of text.
///
/// Notes are skipped during navigation unless they show a next button.
pub struct Note {
    common: Common,
    next_label: String,
    show_next_button: bool,
    keymap: NoteKeyMap,
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

impl Note {
    pub fn new() -> Self {
        Self {
            common: Common::new(),
            next_label: "Next".to_string(),
            show_next_button: false,
            keymap: NoteKeyMap::default(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.common.key = key.into();
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

    pub fn next(mut self, show: bool) -> Self {
        self.show_next_button = show;
        self
    }

    pub fn next_label(mut self, label: impl Into<String>) -> Self {
        self.next_label = label.into();
        self
    }
}

impl Field for Note {
    fn get_key(&self) -> &str {
        &self.common.key
    }

    fn get_value(&self) -> Box<dyn Any> {
        Box::new(())
    }

    fn skip(&self) -> bool {
        !self.show_next_button
    }

    fn error(&self) -> Option<&str> {
        None
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
        let key = msg.downcast_ref::<KeyMsg>()?;
        if matches(key, &[&self.keymap.prev]) {
            return Some(Cmd::message(PrevFieldMsg));
        }
        if matches(key, &[&self.keymap.next, &self.keymap.submit]) {
            return Some(Cmd::message(NextFieldMsg));
        }
        None
    }

    fn view(&self) -> String {
        let styles = self.common.styles();
        let mut lines = Vec::new();
        let title = self.common.title.get();
        if !title.is_empty() {
            lines.push(styles.note_title.render(title));
        }
        if let Some(desc) = self.common.description_view() {
            lines.push(desc);
        }
        if self.show_next_button {
            let button = if self.common.focused {
                &styles.focused_button
            } else {
                &styles.blurred_button
            };
            lines.push(button.render(&self.next_label));
        }
        self.common.frame(&lines.join("\n"))
    }

    fn focus(&mut self) -> Option<Cmd> {
        self.common.focused = true;
        None
    }

    fn blur(&mut self) -> Option<Cmd> {
        self.common.focused = false;
        None
    }

    fn key_binds(&self) -> Vec<Binding> {
        vec![
            self.keymap.prev.clone(),
            self.keymap.submit.clone(),
            self.keymap.next.clone(),
        ]
    }

    fn with_theme(&mut self, theme: &Theme) {
        self.common.theme = theme.clone();
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.note.clone();
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

    fn run_accessible(&mut self, out: &mut dyn Write, _input: &mut dyn BufRead) -> Result<()> {
        super::settle(self);
        super::accessible_header(&self.common, out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termloop::KeyType;
    use termloop::style::strip_ansi;

    #[test]
    fn test_skip_unless_next_button() {
        assert!(Note::new().skip());
        assert!(!Note::new().next(true).skip());
    }

    #[test]
    fn test_enter_moves_on() {
        let mut note = Note::new().next(true);
        note.focus();
        let cmd = note
            .update(&Message::new(KeyMsg::from_type(KeyType::Enter)))
            .unwrap();
        assert!(cmd.execute().unwrap().is::<NextFieldMsg>());
    }

    #[test]
    fn test_view_and_accessible_output() {
        let mut note = Note::new()
            .title("Welcome")
            .description("Fill in your order.")
            .next(true)
            .next_label("Continue");
        note.with_theme(&crate::theme::theme_base());
        let view = strip_ansi(&note.view());
        assert!(view.contains("Welcome"));
        assert!(view.contains("Continue"));

        let mut out = Vec::new();
        let mut input: &[u8] = b"";
        note.run_accessible(&mut out, &mut input).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Welcome\nFill in your order.\n");
    }
}
