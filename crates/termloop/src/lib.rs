#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Termloop
//!
//! A single-threaded event loop for terminal programs, built on The Elm
//! Architecture:
//!
//! - **Model**: your application state, implementing [`Model`]
//! - **Update**: [`Model::update`] consumes one [`Message`] at a time
//! - **View**: [`Model::view`] renders the state to a string
//!
//! Side effects are described by [`Cmd`] values. A command is either an
//! immediate message, which is processed before any externally queued event,
//! or a task that runs off the loop thread and whose result re-enters the
//! queue as an ordinary message.
//!
//! The crate also carries the small rendering toolkit the event loop needs:
//! [`Style`] and [`Border`] for ANSI styling, [`Binding`] for key bindings,
//! [`help::short_help_view`] and a [`spinner::Spinner`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use termloop::{Cmd, KeyMsg, Message, Model, Program};
//!
//! struct Counter {
//!     count: i32,
//! }
//!
//! impl Model for Counter {
//!     fn init(&mut self) -> Option<Cmd> {
//!         None
//!     }
//!
//!     fn update(&mut self, msg: Message) -> Option<Cmd> {
//!         if let Some(key) = msg.downcast_ref::<KeyMsg>() {
//!             match key.to_string().as_str() {
//!                 "+" => self.count += 1,
//!                 "-" => self.count -= 1,
//!                 "q" => return Some(termloop::quit()),
//!                 _ => {}
//!             }
//!         }
//!         None
//!     }
//!
//!     fn view(&self) -> String {
//!         format!("Count: {}\n\nPress +/- to change, q to quit", self.count)
//!     }
//! }
//!
//! let model = Program::new(Counter { count: 0 }).run()?;
//! ```

pub mod binding;
pub mod command;
pub mod help;
pub mod key;
pub mod message;
pub mod program;
pub mod simulator;
pub mod spinner;
pub mod style;

pub use binding::{Binding, Help};
pub use command::{Cmd, batch, quit, sequence, tick};
pub use key::{KeyMsg, KeyType};
pub use message::{
    CancelMsg, InterruptMsg, Message, QuitMsg, TimeoutMsg, WindowSizeMsg,
};
pub use program::{Error, Model, Program, ProgramOptions, Result};
pub use style::{Border, Position, Style, join_horizontal, join_vertical};
