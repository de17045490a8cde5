//! Yes/no confirmation.

use std::any::Any;
use std::io::{BufRead, Write};

use termloop::binding::matches;
use termloop::{Binding, Cmd, KeyMsg, Message};

use super::{Common, Field, FieldPosition, NextFieldMsg, PrevFieldMsg, UpdateFieldMsg};
use crate::accessible;
use crate::accessor::{Accessor, EmbeddedAccessor};
use crate::error::Result;
use crate::eval::Bindings;
use crate::keymap::{ConfirmKeyMap, KeyMap};
use crate::theme::Theme;
use crate::validate::{Validator, always_valid};

/// A pair of buttons choosing between yes and no.
///
/// The answer is written through on every toggle. Pressing `y` or `n`
/// answers and moves on in one step.
pub struct Confirm {
    common: Common,
    accessor: Box<dyn Accessor<bool>>,
    affirmative: String,
    negative: String,
    inline: bool,
    validate: Validator<bool>,
    keymap: ConfirmKeyMap,
}

impl Default for Confirm {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirm {
    pub fn new() -> Self {
        Self {
            common: Common::new(),
            accessor: Box::new(EmbeddedAccessor::new(false)),
            affirmative: "Yes".to_string(),
            negative: "No".to_string(),
            inline: false,
            validate: always_valid(),
            keymap: ConfirmKeyMap::default(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.common.key = key.into();
        self
    }

    pub fn value(mut self, value: bool) -> Self {
        self.accessor.set(value);
        self
    }

    pub fn accessor(mut self, accessor: impl Accessor<bool> + 'static) -> Self {
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

    /// Label of the yes button.
    pub fn affirmative(mut self, label: impl Into<String>) -> Self {
        self.affirmative = label.into();
        self
    }

    /// Label of the no button. An empty label hides the button.
    pub fn negative(mut self, label: impl Into<String>) -> Self {
        self.negative = label.into();
        self
    }

    /// Renders the title and buttons on one line.
    pub fn inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&bool) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Box::new(validate);
        self
    }

    pub fn answer(&self) -> bool {
        self.accessor.get()
    }

    fn run_validation(&mut self) -> bool {
        self.common.err = (self.validate)(&self.accessor.get());
        self.common.err.is_none()
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        self.common.err = None;
        let km = &self.keymap;

        if matches(key, &[&km.prev]) {
            return self.run_validation().then(|| Cmd::message(PrevFieldMsg));
        }
        if matches(key, &[&km.next, &km.submit]) {
            return self.run_validation().then(|| Cmd::message(NextFieldMsg));
        }
        if matches(key, &[&km.toggle]) {
            if self.negative.is_empty() {
                return None;
            }
            let flipped = !self.accessor.get();
            self.accessor.set(flipped);
            return None;
        }
        let answer = if matches(key, &[&km.accept]) {
            true
        } else if matches(key, &[&km.reject]) {
            false
        } else {
            return None;
        };
        self.accessor.set(answer);
        self.run_validation().then(|| Cmd::message(NextFieldMsg))
    }

    fn buttons(&self) -> String {
        let styles = self.common.styles();
        let yes = self.accessor.get();
        let (on, off) = (&styles.focused_button, &styles.blurred_button);
        let affirmative = if yes { on } else { off }.render(&self.affirmative);
        if self.negative.is_empty() {
            return affirmative;
        }
        let negative = if yes { off } else { on }.render(&self.negative);
        format!("{affirmative}{negative}")
    }
}

impl Field for Confirm {
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
        let header = self.common.header();
        let body = if self.inline {
            [header, self.buttons()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            let mut lines = Vec::new();
            if !header.is_empty() {
                lines.push(header);
            }
            if let Some(desc) = self.common.description_view() {
                lines.push(desc);
            }
            lines.push(self.buttons());
            lines.join("\n")
        };
        self.common.frame(&body)
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
            self.keymap.toggle.clone(),
            self.keymap.accept.clone(),
            self.keymap.reject.clone(),
            self.keymap.prev.clone(),
            self.keymap.submit.clone(),
            self.keymap.next.clone(),
        ]
    }

    fn with_theme(&mut self, theme: &Theme) {
        self.common.theme = theme.clone();
    }

    fn with_keymap(&mut self, keymap: &KeyMap) {
        self.keymap = keymap.confirm.clone();
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
        let title = self.common.title.get().clone();
        let desc = self.common.description.get();
        if !desc.is_empty() {
            writeln!(out, "{desc}")?;
        }
        loop {
            let answer = accessible::prompt_bool(out, input, &title, self.accessor.get())?;
            match (self.validate)(&answer) {
                Some(err) => writeln!(out, "{err}")?,
                None => {
                    self.accessor.set(answer);
                    self.common.err = None;
                    return Ok(());
                }
            }
        }
    }
}
