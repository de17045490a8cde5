//! Spinner component for loading indicators.
//!
//! # Example
//!
//! ```rust
//! use termloop::spinner::{SpinnerModel, spinners};
//!
//! let spinner = SpinnerModel::with_spinner(spinners::dot());
//! assert!(!spinner.view().is_empty());
//!
//! // Schedule the first frame advance.
//! let _cmd = spinner.tick_cmd();
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::command::Cmd;
use crate::message::Message;
use crate::style::Style;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A spinner animation definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spinner {
    /// The frames of the animation.
    pub frames: Vec<String>,
    /// Frames per second.
    pub fps: u32,
}

impl Spinner {
    /// Creates a new spinner with the given frames and FPS.
    #[must_use]
    pub fn new(frames: &[&str], fps: u32) -> Self {
        Self {
            frames: frames.iter().map(|&f| f.to_string()).collect(),
            fps,
        }
    }

    /// Returns the duration between frames.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        if self.fps == 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_secs_f64(1.0 / f64::from(self.fps))
        }
    }
}

/// Predefined spinner styles.
pub mod spinners {
    use super::Spinner;

    /// `| / - \`
    #[must_use]
    pub fn line() -> Spinner {
        Spinner::new(&["|", "/", "-", "\\"], 10)
    }

    /// Braille dots.
    #[must_use]
    pub fn dot() -> Spinner {
        Spinner::new(&["⣾ ", "⣽ ", "⣻ ", "⢿ ", "⡿ ", "⣟ ", "⣯ ", "⣷ "], 10)
    }

    /// Small braille dots.
    #[must_use]
    pub fn mini_dot() -> Spinner {
        Spinner::new(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"], 12)
    }
}

/// Advances the spinner with matching `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickMsg {
    /// The spinner this tick belongs to.
    pub id: u64,
    tag: u64,
}

/// An animated spinner.
///
/// Every spinner has a unique id so that ticks scheduled for one spinner are
/// ignored by others. A tag counter drops stale ticks if more than one tick
/// command was started.
#[derive(Debug, Clone)]
pub struct SpinnerModel {
    /// The animation.
    pub spinner: Spinner,
    /// Style for the current frame.
    pub style: Style,
    frame: usize,
    id: u64,
    tag: u64,
}

impl Default for SpinnerModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinnerModel {
    /// Creates a spinner with the line animation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_spinner(spinners::line())
    }

    /// Creates a spinner with the given animation.
    #[must_use]
    pub fn with_spinner(spinner: Spinner) -> Self {
        Self {
            spinner,
            style: Style::new(),
            frame: 0,
            id: next_id(),
            tag: 0,
        }
    }

    /// Sets the style.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Returns the spinner's unique id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns true if `msg` is a tick addressed to this spinner.
    #[must_use]
    pub fn owns(&self, msg: &Message) -> bool {
        msg.downcast_ref::<TickMsg>()
            .is_some_and(|tick| tick.id == self.id)
    }

    /// A command that delivers the next tick after one frame.
    #[must_use]
    pub fn tick_cmd(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        let duration = self.spinner.frame_duration();

        Cmd::new(move || {
            std::thread::sleep(duration);
            Message::new(TickMsg { id, tag })
        })
    }

    /// Advance on a matching tick and schedule the next one.
    pub fn update(&mut self, msg: &Message) -> Option<Cmd> {
        let tick = msg.downcast_ref::<TickMsg>()?;
        if tick.id != self.id || tick.tag != self.tag {
            return None;
        }

        self.frame = (self.frame + 1) % self.spinner.frames.len().max(1);
        self.tag = self.tag.wrapping_add(1);
        Some(self.tick_cmd())
    }

    /// Renders the current frame.
    #[must_use]
    pub fn view(&self) -> String {
        match self.spinner.frames.get(self.frame) {
            Some(frame) => self.style.render(frame),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids() {
        let a = SpinnerModel::new();
        let b = SpinnerModel::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_frame_advance_and_wrap() {
        let mut spinner = SpinnerModel::with_spinner(Spinner::new(&["a", "b"], 1000));
        assert_eq!(spinner.view(), "a");

        let tick = Message::new(TickMsg {
            id: spinner.id(),
            tag: 0,
        });
        assert!(spinner.update(&tick).is_some());
        assert_eq!(spinner.view(), "b");

        let tick = Message::new(TickMsg {
            id: spinner.id(),
            tag: 1,
        });
        spinner.update(&tick);
        assert_eq!(spinner.view(), "a");
    }

    #[test]
    fn test_ignores_other_spinners_and_stale_tags() {
        let mut spinner = SpinnerModel::new();
        let other = Message::new(TickMsg { id: 0, tag: 0 });
        assert!(spinner.update(&other).is_none());
        assert!(!spinner.owns(&other));

        let stale = Message::new(TickMsg {
            id: spinner.id(),
            tag: 9,
        });
        assert!(spinner.owns(&stale));
        assert!(spinner.update(&stale).is_none());
        assert_eq!(spinner.view(), "|");
    }

    #[test]
    fn test_tick_cmd_targets_spinner() {
        let spinner = SpinnerModel::with_spinner(Spinner::new(&["x"], 1000));
        let msg = spinner.tick_cmd().execute().unwrap();
        assert!(spinner.owns(&msg));
    }

    #[test]
    fn test_frame_duration() {
        let line = spinners::line().frame_duration();
        assert!(line > Duration::from_millis(99) && line <= Duration::from_millis(100));
        assert_eq!(Spinner::new(&["x"], 0).frame_duration(), Duration::from_secs(1));
    }
}
