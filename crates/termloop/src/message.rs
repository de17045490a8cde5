//! Message types for the event loop.
//!
//! Messages are the only way to update a model. Key presses, timer events,
//! resolved background work and lifecycle signals are all delivered as
//! messages, one at a time.

use std::any::Any;
use std::fmt;

/// A type-erased message container.
///
/// Messages can be any type that is `Send + 'static`. Use [`Message::new`] to
/// wrap a value and [`Message::downcast_ref`] or [`Message::downcast`] to get
/// it back.
///
/// # Example
///
/// ```rust
/// use termloop::Message;
///
/// struct Loaded(u32);
///
/// let msg = Message::new(Loaded(7));
/// assert!(msg.is::<Loaded>());
/// assert_eq!(msg.downcast::<Loaded>().map(|l| l.0), Some(7));
/// ```
pub struct Message(Box<dyn Any + Send>);

impl Message {
    /// Create a new message from any sendable type.
    pub fn new<M: Any + Send + 'static>(msg: M) -> Self {
        Self(Box::new(msg))
    }

    /// Try to downcast to a specific message type.
    pub fn downcast<M: Any + Send + 'static>(self) -> Option<M> {
        self.0.downcast::<M>().ok().map(|b| *b)
    }

    /// Try to get a reference to the message as a specific type.
    pub fn downcast_ref<M: Any + Send + 'static>(&self) -> Option<&M> {
        self.0.downcast_ref::<M>()
    }

    /// Check if the message is of a specific type.
    pub fn is<M: Any + Send + 'static>(&self) -> bool {
        self.0.is::<M>()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message").finish_non_exhaustive()
    }
}

/// Message to stop the event loop and hand the model back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitMsg;

/// Message for Ctrl+C.
///
/// The model sees this message before the loop stops, so it can record that
/// it was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptMsg;

/// Message injected once a configured deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutMsg;

/// Message injected when an external cancellation token fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelMsg;

/// Message containing terminal window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSizeMsg {
    /// Terminal width in columns.
    pub width: u16,
    /// Terminal height in rows.
    pub height: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_downcast() {
        struct TestMsg(i32);

        let msg = Message::new(TestMsg(42));
        assert!(msg.is::<TestMsg>());
        let inner = msg.downcast::<TestMsg>().unwrap();
        assert_eq!(inner.0, 42);
    }

    #[test]
    fn test_message_downcast_wrong_type() {
        struct First;
        struct Second;

        let msg = Message::new(First);
        assert!(!msg.is::<Second>());
        assert!(msg.downcast_ref::<Second>().is_none());
        assert!(msg.downcast::<Second>().is_none());
    }

    #[test]
    fn test_lifecycle_messages_are_distinct() {
        let timeout = Message::new(TimeoutMsg);
        assert!(timeout.is::<TimeoutMsg>());
        assert!(!timeout.is::<CancelMsg>());
        assert!(!timeout.is::<InterruptMsg>());
    }
}
