//! Commands for side effects.
//!
//! Commands describe work that produces messages. They are the only way for
//! an update function to cause anything to happen outside the model.
//!
//! There are two kinds of leaf command:
//!
//! - an *immediate* command ([`Cmd::message`]) carries a message that the
//!   loop delivers right after the current event, ahead of anything else
//!   already waiting in the queue;
//! - a *task* command ([`Cmd::new`], [`Cmd::new_optional`]) is a thunk that
//!   runs off the loop thread; whatever it returns is queued as an ordinary
//!   message when it finishes.
//!
//! [`batch`] and [`sequence`] combine commands.

use std::fmt;
use std::time::{Duration, Instant};

use crate::message::{Message, QuitMsg};

type Thunk = Box<dyn FnOnce() -> Option<Message> + Send + 'static>;

pub(crate) enum CmdKind {
    Immediate(Message),
    Task(Thunk),
    Batch(Vec<Cmd>),
    Sequence(Vec<Cmd>),
}

/// A command that produces zero or more messages when executed.
///
/// Commands are lazy: nothing runs until the program (or a test) executes
/// them.
///
/// # Example
///
/// ```rust
/// use termloop::{Cmd, Message};
/// use std::time::Duration;
///
/// struct Fetched(String);
///
/// fn fetch() -> Cmd {
///     Cmd::new(|| {
///         std::thread::sleep(Duration::from_millis(5));
///         Message::new(Fetched("done".into()))
///     })
/// }
///
/// let msgs = fetch().into_messages();
/// assert!(msgs[0].is::<Fetched>());
/// ```
pub struct Cmd(CmdKind);

impl Cmd {
    /// Create a task command from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Message + Send + 'static,
    {
        Self(CmdKind::Task(Box::new(move || Some(f()))))
    }

    /// Create a task command that may not produce a message.
    pub fn new_optional<F>(f: F) -> Self
    where
        F: FnOnce() -> Option<Message> + Send + 'static,
    {
        Self(CmdKind::Task(Box::new(f)))
    }

    /// Create an immediate command.
    ///
    /// The message is delivered directly after the event currently being
    /// processed, before any externally queued event.
    pub fn message<M: std::any::Any + Send + 'static>(msg: M) -> Self {
        Self(CmdKind::Immediate(Message::new(msg)))
    }

    /// Returns true if this command only carries an immediate message.
    pub fn is_immediate(&self) -> bool {
        matches!(self.0, CmdKind::Immediate(_))
    }

    /// Execute the command on the current thread and return the first
    /// message it produces.
    ///
    /// Batches and sequences are run to completion in declaration order;
    /// only their first message is returned. Use [`Cmd::into_messages`] to
    /// keep all of them.
    pub fn execute(self) -> Option<Message> {
        self.into_messages().into_iter().next()
    }

    /// Execute the command on the current thread, collecting every message
    /// it produces in order.
    pub fn into_messages(self) -> Vec<Message> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(self, out: &mut Vec<Message>) {
        match self.0 {
            CmdKind::Immediate(msg) => out.push(msg),
            CmdKind::Task(f) => out.extend(f()),
            CmdKind::Batch(cmds) | CmdKind::Sequence(cmds) => {
                for cmd in cmds {
                    cmd.collect_into(out);
                }
            }
        }
    }

    pub(crate) fn into_kind(self) -> CmdKind {
        self.0
    }
}

impl fmt::Debug for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.0 {
            CmdKind::Immediate(_) => "Immediate",
            CmdKind::Task(_) => "Task",
            CmdKind::Batch(_) => "Batch",
            CmdKind::Sequence(_) => "Sequence",
        };
        f.debug_tuple("Cmd").field(&kind).finish()
    }
}

/// Batch multiple commands to run concurrently.
///
/// Immediate commands in a batch are still delivered before queued events;
/// tasks run in parallel with no ordering guarantees.
pub fn batch(cmds: Vec<Option<Cmd>>) -> Option<Cmd> {
    let mut valid: Vec<Cmd> = cmds.into_iter().flatten().collect();

    match valid.len() {
        0 => None,
        1 => valid.pop(),
        _ => Some(Cmd(CmdKind::Batch(valid))),
    }
}

/// Sequence commands to run one at a time, in order.
pub fn sequence(cmds: Vec<Option<Cmd>>) -> Option<Cmd> {
    let mut valid: Vec<Cmd> = cmds.into_iter().flatten().collect();

    match valid.len() {
        0 => None,
        1 => valid.pop(),
        _ => Some(Cmd(CmdKind::Sequence(valid))),
    }
}

/// Command that signals the program to quit.
pub fn quit() -> Cmd {
    Cmd::message(QuitMsg)
}

/// Command that sends a message after a duration.
///
/// To tick periodically, return another tick command when handling the
/// message.
pub fn tick<F>(duration: Duration, f: F) -> Cmd
where
    F: FnOnce(Instant) -> Message + Send + 'static,
{
    Cmd::new(move || {
        std::thread::sleep(duration);
        f(Instant::now())
    })
}
