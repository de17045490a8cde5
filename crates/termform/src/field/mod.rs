//! The field contract and the built-in field types.
//!
//! A [`Field`] is one input on a form page. Groups drive fields only through
//! this trait: they deliver messages to the focused field, move focus when a
//! field emits [`NextFieldMsg`] or [`PrevFieldMsg`], and broadcast
//! [`UpdateFieldMsg`] so dynamic content can refresh.
//!
//! Fields fall into two commit styles:
//!
//! - immediate-write fields ([`Input`], [`Text`], [`Confirm`]) store every
//!   edit in their accessor as it happens;
//! - confirm-style fields ([`Select`], [`MultiSelect`], [`Table`]) keep the
//!   cursor and selection to themselves and store the result only when the
//!   user confirms with the next/submit key and validation passes.

mod confirm;
mod input;
mod multi_select;
mod note;
mod select;
mod table;
mod text;

pub use confirm::Confirm;
pub use input::{EchoMode, Input};
pub use multi_select::MultiSelect;
pub use note::Note;
pub use select::{Select, SelectOption, new_options};
pub use table::Table;
pub use text::Text;

use std::any::Any;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use termloop::spinner::{SpinnerModel, TickMsg, spinners};
use termloop::{Binding, Cmd, Message, Style, batch};

use crate::error::Result;
use crate::eval::{Bindings, Eval, EvalTarget};
use crate::keymap::KeyMap;
use crate::theme::{FieldStyles, Theme};

static LAST_ID: AtomicUsize = AtomicUsize::new(1);

pub(crate) fn next_id() -> usize {
    LAST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Move focus to the next field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextFieldMsg;

/// Move focus to the previous field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrevFieldMsg;

/// Move to the next group, or complete the form from the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextGroupMsg;

/// Move to the previous group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrevGroupMsg;

/// Broadcast after every input event so fields re-check their dynamic
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateFieldMsg;

/// Where a field sits in the form.
///
/// `first_field`/`last_field` are the first and last focusable fields of
/// the field's group; `first_group`/`last_group` the first and last
/// reachable groups of the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldPosition {
    pub group: usize,
    pub field: usize,
    pub first_field: usize,
    pub last_field: usize,
    pub group_count: usize,
    pub first_group: usize,
    pub last_group: usize,
}

impl FieldPosition {
    /// True for the first focusable field of the first reachable group.
    pub fn is_first(&self) -> bool {
        self.field == self.first_field && self.group == self.first_group
    }

    /// True for the last focusable field of the last reachable group.
    pub fn is_last(&self) -> bool {
        self.field == self.last_field && self.group == self.last_group
    }
}

/// A form field.
pub trait Field: Send + Sync {
    /// The key the field's value is looked up by.
    fn get_key(&self) -> &str;

    /// The committed value, boxed.
    fn get_value(&self) -> Box<dyn Any>;

    /// Returns true if focus traversal should pass over this field.
    fn skip(&self) -> bool {
        false
    }

    /// Returns true if the field wants the whole group area while focused.
    fn zoom(&self) -> bool {
        false
    }

    /// The current validation error.
    fn error(&self) -> Option<&str>;

    /// One-time setup. Starts dynamic content evaluation.
    fn init(&mut self) -> Option<Cmd>;

    /// Handles one message.
    fn update(&mut self, msg: &Message) -> Option<Cmd>;

    /// Renders the field.
    fn view(&self) -> String;

    /// Gives the field input focus.
    fn focus(&mut self) -> Option<Cmd>;

    /// Takes focus away and validates the current value.
    fn blur(&mut self) -> Option<Cmd>;

    /// Bindings shown in the help line.
    fn key_binds(&self) -> Vec<Binding>;

    fn with_theme(&mut self, theme: &Theme);

    fn with_keymap(&mut self, keymap: &KeyMap);

    fn with_width(&mut self, width: usize);

    fn with_height(&mut self, height: usize);

    /// Updates position-dependent bindings.
    fn with_position(&mut self, position: FieldPosition);

    /// Runs the field as line-oriented prompts, without the event loop.
    fn run_accessible(&mut self, out: &mut dyn Write, input: &mut dyn BufRead) -> Result<()>;

    /// Runs this field on its own, as a one-field form.
    fn run(self) -> Result<()>
    where
        Self: Sized + 'static,
    {
        let mut form = crate::Form::new(vec![crate::Group::new(vec![Box::new(self)])]);
        form.run()
    }
}

/// Processes a field's dynamic content to completion on the current thread.
///
/// Used by accessible mode, which has no event loop to deliver results.
pub(crate) fn settle(field: &mut dyn Field) {
    const MAX_ROUNDS: usize = 64;

    let mut queue: VecDeque<Message> = field
        .update(&Message::new(UpdateFieldMsg))
        .map(Cmd::into_messages)
        .unwrap_or_default()
        .into();

    let mut rounds = 0;
    while let Some(msg) = queue.pop_front() {
        rounds += 1;
        if rounds > MAX_ROUNDS {
            tracing::debug!(key = field.get_key(), "dynamic content did not settle");
            break;
        }
        if msg.is::<TickMsg>() {
            continue;
        }
        if let Some(cmd) = field.update(&msg) {
            queue.extend(cmd.into_messages());
        }
    }
}

/// State every field type shares: identity, title and description, focus,
/// error slot, layout hints and the loading spinner.
pub(crate) struct Common {
    pub id: usize,
    pub key: String,
    pub title: Eval<String>,
    pub description: Eval<String>,
    pub focused: bool,
    pub err: Option<String>,
    pub theme: Theme,
    pub width: usize,
    pub height: usize,
    pub position: FieldPosition,
    spinner: SpinnerModel,
    spinning: bool,
}

impl Common {
    pub fn new() -> Self {
        Self {
            id: next_id(),
            key: String::new(),
            title: Eval::new(String::new()),
            description: Eval::new(String::new()),
            focused: false,
            err: None,
            theme: Theme::default(),
            width: 0,
            height: 0,
            position: FieldPosition::default(),
            spinner: SpinnerModel::with_spinner(spinners::line()),
            spinning: false,
        }
    }

    pub fn set_title_func<F, B>(&mut self, f: F, bindings: B)
    where
        F: Fn() -> String + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.title.set_func(f, bindings);
    }

    pub fn set_description_func<F, B>(&mut self, f: F, bindings: B)
    where
        F: Fn() -> String + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.description.set_func(f, bindings);
    }

    pub fn styles(&self) -> &FieldStyles {
        if self.focused {
            &self.theme.focused
        } else {
            &self.theme.blurred
        }
    }

    /// Re-checks title and description bindings.
    pub fn refresh(&mut self) -> Vec<Option<Cmd>> {
        vec![
            self.title.refresh(self.id, EvalTarget::Title),
            self.description.refresh(self.id, EvalTarget::Description),
        ]
    }

    /// Routes results for title and description. Returns true if consumed.
    pub fn handle_eval(&mut self, msg: &Message) -> bool {
        self.title.handle(self.id, EvalTarget::Title, msg)
            || self.description.handle(self.id, EvalTarget::Description, msg)
    }

    /// Starts the spinner if something is loading and it is not running yet.
    pub fn spin(&mut self, loading: bool) -> Option<Cmd> {
        if loading && !self.spinning {
            self.spinning = true;
            return Some(self.spinner.tick_cmd());
        }
        None
    }

    /// Handles a spinner tick. Returns `None` if `msg` is not ours, otherwise
    /// the follow-up tick (or nothing once loading has finished).
    pub fn tick(&mut self, msg: &Message, loading: bool) -> Option<Option<Cmd>> {
        if !self.spinner.owns(msg) {
            return None;
        }
        if loading {
            Some(self.spinner.update(msg))
        } else {
            self.spinning = false;
            Some(None)
        }
    }

    pub fn spinner_view(&self) -> String {
        self.spinner.view()
    }

    /// Combined refresh of title/description plus any extra targets, with
    /// the spinner started if anything went into loading.
    pub fn refresh_with(&mut self, extra: Vec<Option<Cmd>>, loading: bool) -> Option<Cmd> {
        let mut cmds = self.refresh();
        cmds.extend(extra);
        let loading = loading || self.title.is_loading() || self.description.is_loading();
        cmds.push(self.spin(loading));
        batch(cmds)
    }

    /// Renders the title line with the error indicator.
    pub fn header(&self) -> String {
        let styles = self.styles();
        let mut out = String::new();
        if !self.title.get().is_empty() {
            out.push_str(&styles.title.render(self.title.get()));
        }
        if self.err.is_some() {
            out.push_str(&styles.error_indicator.render(""));
        }
        out
    }

    pub fn description_view(&self) -> Option<String> {
        let desc = self.description.get();
        (!desc.is_empty()).then(|| self.styles().description.render(desc))
    }

    /// Wraps a rendered body in the focus-dependent base style.
    pub fn frame(&self, body: &str) -> String {
        let mut base: Style = self.styles().base.clone();
        if self.width > 0 {
            base = base.width(u16::try_from(self.width).unwrap_or(u16::MAX));
        }
        base.render(body)
    }

    /// Enables `prev`, and `next` or `submit`, according to the position.
    pub fn apply_position(
        position: FieldPosition,
        prev: &mut Binding,
        next: &mut Binding,
        submit: &mut Binding,
    ) {
        prev.enable(!position.is_first());
        next.enable(!position.is_last());
        submit.enable(position.is_last());
    }
}

/// Plain-text title/description block for accessible prompts.
pub(crate) fn accessible_header(common: &Common, out: &mut dyn Write) -> Result<()> {
    let title = common.title.get();
    if !title.is_empty() {
        writeln!(out, "{title}")?;
    }
    let desc = common.description.get();
    if !desc.is_empty() {
        writeln!(out, "{desc}")?;
    }
    Ok(())
}
