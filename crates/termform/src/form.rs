//! Forms: pages of groups driven by the event loop.

use std::any::Any;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::time::Duration;

use termloop::binding::matches;
use termloop::{
    CancelMsg, Cmd, InterruptMsg, KeyMsg, Message, Model, Program, TimeoutMsg, WindowSizeMsg,
    batch, quit,
};
use tokio_util::sync::CancellationToken;

use crate::config::FormConfig;
use crate::error::{FormError, Result};
use crate::field::{NextFieldMsg, NextGroupMsg, PrevFieldMsg, PrevGroupMsg, UpdateFieldMsg};
use crate::group::Group;
use crate::keymap::KeyMap;
use crate::layout::{self, Layout};
use crate::theme::Theme;

const DEFAULT_WIDTH: usize = 80;

/// Where a form is in its lifecycle. Every state but `Normal` is final.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormState {
    /// Taking input.
    #[default]
    Normal,
    /// The user moved past the last group.
    Completed,
    /// Interrupted or cancelled.
    Aborted,
    /// The deadline elapsed first.
    TimedOut,
}

/// A multi-page form.
///
/// # Example
///
/// ```rust,ignore
/// use termform::{Form, Group, Input, Select, Value, new_options};
///
/// let name = Value::new(String::new());
/// let size = Value::new(String::new());
///
/// let mut form = Form::new(vec![
///     Group::new(vec![Box::new(Input::new().title("Name").accessor(name.clone()))]),
///     Group::new(vec![Box::new(
///         Select::new()
///             .title("Size")
///             .options(new_options(["Small", "Large"]))
///             .accessor(size.clone()),
///     )]),
/// ]);
/// form.run()?;
/// println!("{} wants a {} one", name.get(), size.get());
/// ```
pub struct Form {
    groups: Vec<Group>,
    page: usize,
    state: FormState,
    width: Option<usize>,
    term_width: usize,
    height: usize,
    theme: Theme,
    keymap: KeyMap,
    layout: Box<dyn Layout>,
    accessible: bool,
    timeout: Duration,
    input: Option<Box<dyn Read + Send>>,
    output: Option<Box<dyn Write + Send>>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Form {
    /// Creates a form with the given groups.
    pub fn new(groups: Vec<Group>) -> Self {
        Self {
            groups,
            page: 0,
            state: FormState::Normal,
            width: None,
            term_width: DEFAULT_WIDTH,
            height: 0,
            theme: Theme::default(),
            keymap: KeyMap::default(),
            layout: Box::new(layout::default()),
            accessible: false,
            timeout: Duration::ZERO,
            input: None,
            output: None,
        }
    }

    /// Fixes the width instead of following the terminal.
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Clips every group without its own height to `height` lines.
    pub fn height(mut self, height: usize) -> Self {
        self.height = height;
        self
    }

    pub fn show_help(mut self, show: bool) -> Self {
        for group in &mut self.groups {
            group.set_show_help(show);
        }
        self
    }

    pub fn show_errors(mut self, show: bool) -> Self {
        for group in &mut self.groups {
            group.set_show_errors(show);
        }
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    /// Runs as line-oriented prompts instead of the interactive loop.
    pub fn accessible(mut self, accessible: bool) -> Self {
        self.accessible = accessible;
        self
    }

    /// Gives up with [`FormError::Timeout`] after `timeout`. Zero disables
    /// the deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads keys from `input` instead of the terminal.
    pub fn input(mut self, input: impl Read + Send + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Renders to `output` instead of stdout.
    pub fn output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    /// Applies every option in `config`.
    pub fn with_config(mut self, config: &FormConfig) -> Self {
        self.width = config.width;
        if let Some(height) = config.height {
            self.height = height;
        }
        self.theme = config.theme.theme();
        self.layout = config.layout.build();
        self.accessible = config.accessible;
        self.timeout = config.timeout();
        self.show_help(config.show_help)
            .show_errors(config.show_errors)
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Index of the active group.
    pub fn current_group(&self) -> usize {
        self.page
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Indices of groups that are not hidden right now.
    pub fn visible_groups(&self) -> Vec<usize> {
        (0..self.groups.len())
            .filter(|&i| !self.groups[i].is_hidden())
            .collect()
    }

    /// Width the form renders at.
    pub fn render_width(&self) -> usize {
        self.width.unwrap_or(self.term_width)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Field errors across all groups.
    pub fn errors(&self) -> Vec<&str> {
        self.groups.iter().flat_map(|g| g.errors()).collect()
    }

    /// The committed value of the field with `key`.
    pub fn get(&self, key: &str) -> Option<Box<dyn Any>> {
        self.groups
            .iter()
            .flat_map(|g| g.fields())
            .find(|f| f.get_key() == key)
            .map(|f| f.get_value())
    }

    /// The committed value of the field with `key`, if it has type `T`.
    pub fn get_as<T: 'static>(&self, key: &str) -> Option<T> {
        self.get(key)?.downcast::<T>().ok().map(|v| *v)
    }

    /// String value of `key`; empty if absent or not a string.
    pub fn get_string(&self, key: &str) -> String {
        self.get_as::<String>(key).unwrap_or_default()
    }

    /// Boolean value of `key`; false if absent or not a boolean.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get_as::<bool>(key).unwrap_or_default()
    }

    /// Integer value of `key`. String values are parsed; anything else
    /// is 0.
    pub fn get_int(&self, key: &str) -> i64 {
        let Some(value) = self.get(key) else {
            return 0;
        };
        let value = match value.downcast::<i64>() {
            Ok(n) => return *n,
            Err(value) => value,
        };
        let value = match value.downcast::<usize>() {
            Ok(n) => return i64::try_from(*n).unwrap_or(i64::MAX),
            Err(value) => value,
        };
        value
            .downcast::<String>()
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }

    /// List value of `key`, such as a multi-select's selection or a table
    /// row; empty if absent.
    pub fn get_strings(&self, key: &str) -> Vec<String> {
        self.get_as::<Vec<String>>(key).unwrap_or_default()
    }

    fn reachable(&self) -> Vec<usize> {
        (0..self.groups.len())
            .filter(|&i| self.groups[i].is_reachable())
            .collect()
    }

    fn refresh_positions(&mut self) {
        let reachable = self.reachable();
        let first = reachable.first().copied().unwrap_or(0);
        let last = reachable.last().copied().unwrap_or(0);
        let count = self.groups.len();
        for (i, group) in self.groups.iter_mut().enumerate() {
            group.set_positions(i, count, first, last);
        }
    }

    fn apply_widths(&mut self) {
        let width = self.render_width();
        let widths: Vec<usize> = (0..self.groups.len())
            .map(|i| self.layout.group_width(self, i, width))
            .collect();
        for (group, w) in self.groups.iter_mut().zip(widths) {
            group.set_width(w);
        }
    }

    fn finish(&mut self, state: FormState) -> Option<Cmd> {
        tracing::debug!(?state, group = self.page, "form finished");
        self.state = state;
        Some(quit())
    }

    /// Enters group `to`, initializing it on first visit.
    fn enter(&mut self, to: usize, from_end: bool) -> Option<Cmd> {
        let leave = self.groups.get_mut(self.page).and_then(Group::deactivate);
        tracing::debug!(from = self.page, to, "changing group");
        self.page = to;
        self.refresh_positions();

        let group = &mut self.groups[to];
        let init = if group.is_initialized() {
            None
        } else {
            group.init()
        };
        let focus = group.activate(from_end);
        batch(vec![leave, init, focus])
    }

    /// Advances to the next reachable group, completing the form after the
    /// last one.
    pub(crate) fn next_group(&mut self) -> Option<Cmd> {
        match self.reachable().into_iter().find(|&i| i > self.page) {
            Some(to) => self.enter(to, false),
            None => self.finish(FormState::Completed),
        }
    }

    /// Goes back to the previous reachable group; does nothing on the
    /// first one.
    pub(crate) fn prev_group(&mut self) -> Option<Cmd> {
        let to = self.reachable().into_iter().rev().find(|&i| i < self.page)?;
        self.enter(to, true)
    }

    fn blocked_by_errors(&self) -> bool {
        let blocked = self
            .groups
            .get(self.page)
            .is_some_and(|g| !g.errors().is_empty());
        if blocked {
            tracing::trace!(group = self.page, "group change blocked by errors");
        }
        blocked
    }

    /// Runs the form until it completes, is aborted or times out.
    ///
    /// The form is handed back whatever the outcome, so [`state`](Self::state)
    /// and the `get_*` lookups describe it afterwards, even after an
    /// [`FormError::Io`].
    pub fn run(&mut self) -> Result<()> {
        self.run_with(None)
    }

    /// Like [`run`](Self::run), aborting when `token` is cancelled.
    pub fn run_with_cancel(&mut self, token: CancellationToken) -> Result<()> {
        if token.is_cancelled() {
            self.state = FormState::Aborted;
            return Err(FormError::UserAborted);
        }
        self.run_with(Some(token))
    }

    fn run_with(&mut self, token: Option<CancellationToken>) -> Result<()> {
        if self.accessible {
            let mut out: Box<dyn Write> = match self.output.take() {
                Some(output) => output,
                None => Box::new(io::stdout()),
            };
            let mut input: Box<dyn BufRead> = match self.input.take() {
                Some(input) => Box::new(BufReader::new(input)),
                None => Box::new(io::stdin().lock()),
            };
            return self.run_accessible(&mut *out, &mut *input);
        }

        let input = self.input.take();
        let output = self.output.take();
        let timeout = self.timeout;

        let mut program = Program::new(std::mem::take(self)).with_timeout(timeout);
        if let Some(input) = input {
            program = program.with_input(input);
        }
        if let Some(output) = output {
            program = program.with_output(output);
        }
        if let Some(token) = token {
            program = program.with_cancellation(token);
        }
        let (form, result) = program.run_returning_model();
        *self = form;
        result?;

        match self.state {
            FormState::Normal | FormState::Completed => Ok(()),
            FormState::Aborted => Err(FormError::UserAborted),
            FormState::TimedOut => Err(FormError::Timeout),
        }
    }

    /// Runs every visible group's fields as line-oriented prompts.
    ///
    /// Visibility is decided as each group is reached, so groups may hide
    /// based on earlier answers.
    pub fn run_accessible(&mut self, out: &mut dyn Write, input: &mut dyn BufRead) -> Result<()> {
        for i in 0..self.groups.len() {
            if self.groups[i].is_hidden() {
                continue;
            }
            self.page = i;
            for field in self.groups[i].fields_mut() {
                field.run_accessible(out, input)?;
                writeln!(out)?;
            }
        }
        self.state = FormState::Completed;
        Ok(())
    }
}

impl Model for Form {
    fn init(&mut self) -> Option<Cmd> {
        for group in &mut self.groups {
            group.apply_theme(&self.theme);
            group.apply_keymap(&self.keymap);
            if self.height > 0 {
                group.default_height(self.height);
            }
        }
        self.apply_widths();

        let Some(first) = self.reachable().first().copied() else {
            return self.finish(FormState::Completed);
        };
        self.page = first;
        self.refresh_positions();

        let group = &mut self.groups[first];
        let init = group.init();
        let focus = group.activate(false);
        batch(vec![init, focus])
    }

    fn update(&mut self, msg: Message) -> Option<Cmd> {
        if self.state != FormState::Normal {
            return None;
        }

        if msg.is::<InterruptMsg>() || msg.is::<CancelMsg>() {
            return self.finish(FormState::Aborted);
        }
        if msg.is::<TimeoutMsg>() {
            return self.finish(FormState::TimedOut);
        }
        if let Some(size) = msg.downcast_ref::<WindowSizeMsg>() {
            self.term_width = usize::from(size.width);
            if self.width.is_none() {
                self.apply_widths();
            }
            return None;
        }

        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            if matches(key, &[&self.keymap.quit]) {
                return self.finish(FormState::Aborted);
            }
            let cmd = self.groups.get_mut(self.page)?.update(&msg);
            return batch(vec![cmd, Some(Cmd::message(UpdateFieldMsg))]);
        }

        if msg.is::<NextGroupMsg>() {
            if self.blocked_by_errors() {
                return None;
            }
            return self.next_group();
        }
        if msg.is::<PrevGroupMsg>() {
            if self.blocked_by_errors() {
                return None;
            }
            return self.prev_group();
        }
        if msg.is::<NextFieldMsg>() || msg.is::<PrevFieldMsg>() {
            return self.groups.get_mut(self.page)?.update(&msg);
        }

        if msg.is::<UpdateFieldMsg>() {
            self.refresh_positions();
        }
        batch(self.groups.iter_mut().map(|g| g.update(&msg)).collect())
    }

    fn view(&self) -> String {
        if self.state != FormState::Normal {
            return String::new();
        }
        self.theme.form.render(&self.layout.view(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Value;
    use crate::field::{Confirm, Input, Note};
    use termloop::KeyType;

    fn two_groups(name: &Value<String>) -> Form {
        Form::new(vec![
            Group::new(vec![Box::new(Input::new().key("name").accessor(name.clone()))]),
            Group::new(vec![Box::new(Confirm::new().key("ok"))]),
        ])
    }

    #[test]
    fn test_form_state_default() {
        assert_eq!(FormState::default(), FormState::Normal);
    }

    #[test]
    fn test_paging_and_completion() {
        let name = Value::new(String::new());
        let mut form = two_groups(&name);
        form.init();
        assert_eq!(form.current_group(), 0);

        form.update(Message::new(NextGroupMsg));
        assert_eq!(form.current_group(), 1);
        form.update(Message::new(PrevGroupMsg));
        assert_eq!(form.current_group(), 0);
        form.update(Message::new(PrevGroupMsg));
        assert_eq!(form.current_group(), 0);

        form.update(Message::new(NextGroupMsg));
        let cmd = form.update(Message::new(NextGroupMsg)).unwrap();
        assert!(cmd.execute().unwrap().is::<termloop::QuitMsg>());
        assert_eq!(form.state(), FormState::Completed);
        assert_eq!(form.view(), "");
    }

    #[test]
    fn test_hidden_groups_are_skipped() {
        let skip = Value::new(true);
        let flag = skip.clone();
        let mut form = Form::new(vec![
            Group::new(vec![Box::new(Input::new())]),
            Group::new(vec![Box::new(Input::new())]).hide_func(move || flag.get()),
            Group::new(vec![Box::new(Input::new())]),
        ]);
        form.init();
        form.update(Message::new(NextGroupMsg));
        assert_eq!(form.current_group(), 2);

        skip.replace(false);
        form.update(Message::new(PrevGroupMsg));
        assert_eq!(form.current_group(), 1);
    }

    #[test]
    fn test_unfocusable_groups_are_skipped() {
        let mut form = Form::new(vec![
            Group::new(vec![Box::new(Note::new()), Box::new(Note::new())]),
            Group::new(vec![Box::new(Input::new())]),
        ]);
        form.init();
        assert_eq!(form.current_group(), 1);
    }

    #[test]
    fn test_empty_form_completes_on_init() {
        let mut form = Form::new(Vec::new());
        assert!(form.init().is_some());
        assert_eq!(form.state(), FormState::Completed);
    }

    #[test]
    fn test_errors_block_paging() {
        let mut form = Form::new(vec![
            Group::new(vec![Box::new(
                Input::new().validate(crate::validate::required("Name")),
            )]),
            Group::new(vec![Box::new(Input::new())]),
        ]);
        form.init();
        form.groups[0].fields_mut()[0].blur();
        assert_eq!(form.errors(), vec!["Name is required"]);
        assert!(form.update(Message::new(NextGroupMsg)).is_none());
        assert_eq!(form.current_group(), 0);
    }

    #[test]
    fn test_terminal_states_freeze_fields() {
        let name = Value::new(String::new());
        let mut form = two_groups(&name);
        form.init();
        form.update(Message::new(TimeoutMsg));
        assert_eq!(form.state(), FormState::TimedOut);

        assert!(form.update(Message::new(KeyMsg::from_char('x'))).is_none());
        assert_eq!(name.get(), "");
        form.update(Message::new(InterruptMsg));
        assert_eq!(form.state(), FormState::TimedOut);
    }

    #[test]
    fn test_quit_key_aborts() {
        let name = Value::new(String::new());
        let mut form = two_groups(&name);
        form.init();
        form.update(Message::new(KeyMsg::from_type(KeyType::CtrlC)));
        assert_eq!(form.state(), FormState::Aborted);
    }

    #[test]
    fn test_lookup_by_key() {
        let name = Value::new("Ada".to_string());
        let form = two_groups(&name);
        assert_eq!(form.get_string("name"), "Ada");
        assert!(!form.get_bool("ok"));
        assert_eq!(form.get_string("missing"), "");
        assert_eq!(form.get_int("name"), 0);
        assert!(form.get("missing").is_none());
        assert!(form.get_strings("name").is_empty());
    }

    #[test]
    fn test_with_config() {
        let config = FormConfig {
            width: Some(50),
            accessible: true,
            timeout_ms: 10,
            ..FormConfig::default()
        };
        let form = Form::default().with_config(&config);
        assert_eq!(form.render_width(), 50);
        assert!(form.accessible);
        assert_eq!(form.timeout, Duration::from_millis(10));
    }

    #[test]
    fn test_window_size_sets_width() {
        let name = Value::new(String::new());
        let mut form = two_groups(&name);
        form.init();
        form.update(Message::new(WindowSizeMsg {
            width: 120,
            height: 40,
        }));
        assert_eq!(form.render_width(), 120);
    }
}
