//! Program simulator for testing models without a terminal.
//!
//! The simulator follows the same delivery rules as [`crate::Program`]:
//! immediate command messages are handled before anything else in the queue,
//! task commands run (here synchronously) and their results join the back
//! of the queue.

use std::collections::VecDeque;

use crate::command::{Cmd, CmdKind};
use crate::key::KeyMsg;
use crate::message::{InterruptMsg, Message, QuitMsg};
use crate::program::Model;

/// Statistics tracked during simulation.
#[derive(Debug, Clone, Default)]
pub struct SimulationStats {
    /// Number of times `init` was called.
    pub init_calls: usize,
    /// Number of times `update` was called.
    pub update_calls: usize,
    /// Commands returned from init/update.
    pub commands_returned: usize,
    /// Whether the model asked to stop.
    pub quit_requested: bool,
}

/// Drives a [`Model`] headlessly.
///
/// # Example
///
/// ```rust
/// use termloop::{Cmd, Message, Model, simulator::ProgramSimulator};
///
/// struct Counter { count: i32 }
///
/// impl Model for Counter {
///     fn init(&mut self) -> Option<Cmd> { None }
///     fn update(&mut self, msg: Message) -> Option<Cmd> {
///         if let Some(n) = msg.downcast::<i32>() {
///             self.count += n;
///         }
///         None
///     }
///     fn view(&self) -> String {
///         format!("Count: {}", self.count)
///     }
/// }
///
/// let mut sim = ProgramSimulator::new(Counter { count: 0 });
/// sim.send(Message::new(5));
/// sim.send(Message::new(3));
/// sim.run_until_empty();
///
/// assert_eq!(sim.model().count, 8);
/// assert_eq!(sim.last_view(), Some("Count: 8"));
/// ```
pub struct ProgramSimulator<M: Model> {
    model: M,
    queue: VecDeque<Message>,
    views: Vec<String>,
    stats: SimulationStats,
    initialized: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a new simulator with the given model.
    pub fn new(model: M) -> Self {
        Self {
            model,
            queue: VecDeque::new(),
            views: Vec::new(),
            stats: SimulationStats::default(),
            initialized: false,
        }
    }

    /// Call `init` once and dispatch its command.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.stats.init_calls += 1;

        if let Some(cmd) = self.model.init() {
            self.stats.commands_returned += 1;
            self.dispatch(cmd);
        }
        self.views.push(self.model.view());
    }

    /// Queue a message behind everything already waiting.
    pub fn send(&mut self, msg: Message) {
        self.queue.push_back(msg);
    }

    /// Queue a key press.
    pub fn send_key(&mut self, key: KeyMsg) {
        self.send(Message::new(key));
    }

    /// Process one queued message. Returns false if nothing was processed.
    pub fn step(&mut self) -> bool {
        self.init();
        if self.stats.quit_requested {
            return false;
        }

        let Some(msg) = self.queue.pop_front() else {
            return false;
        };

        if msg.is::<QuitMsg>() {
            self.stats.quit_requested = true;
            return true;
        }

        let interrupted = msg.is::<InterruptMsg>();
        self.stats.update_calls += 1;
        if let Some(cmd) = self.model.update(msg) {
            self.stats.commands_returned += 1;
            self.dispatch(cmd);
        }
        self.views.push(self.model.view());

        if interrupted {
            self.stats.quit_requested = true;
        }
        true
    }

    /// Process messages until the queue is empty or the model quits.
    ///
    /// Returns the number of messages processed.
    pub fn run_until_empty(&mut self) -> usize {
        let mut processed = 0;
        while self.step() {
            processed += 1;
        }
        processed
    }

    /// Process at most `max_steps` messages, stopping early on quit.
    pub fn run_until_quit(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && self.step() {
            steps += 1;
        }
        steps
    }

    fn dispatch(&mut self, cmd: Cmd) {
        let mut immediate = Vec::new();
        self.route(cmd, &mut immediate);
        for msg in immediate.into_iter().rev() {
            self.queue.push_front(msg);
        }
    }

    fn route(&mut self, cmd: Cmd, immediate: &mut Vec<Message>) {
        match cmd.into_kind() {
            CmdKind::Immediate(msg) => immediate.push(msg),
            CmdKind::Task(f) => self.queue.extend(f()),
            CmdKind::Batch(cmds) => {
                for cmd in cmds {
                    self.route(cmd, immediate);
                }
            }
            CmdKind::Sequence(cmds) => {
                for cmd in cmds {
                    self.queue.extend(cmd.into_messages());
                }
            }
        }
    }

    /// Number of messages waiting.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Whether the model asked to stop.
    pub fn is_quit(&self) -> bool {
        self.stats.quit_requested
    }

    /// The current model state.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Consume the simulator and return the model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Simulation statistics.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Every view rendered so far.
    pub fn views(&self) -> &[String] {
        &self.views
    }

    /// The most recent view.
    pub fn last_view(&self) -> Option<&str> {
        self.views.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        seen: Vec<i32>,
    }

    impl Model for Log {
        fn init(&mut self) -> Option<Cmd> {
            Some(Cmd::new(|| Message::new(0i32)))
        }

        fn update(&mut self, msg: Message) -> Option<Cmd> {
            let n = msg.downcast::<i32>()?;
            self.seen.push(n);
            match n {
                1 => crate::command::batch(vec![
                    Some(Cmd::new(|| Message::new(30i32))),
                    Some(Cmd::message(10i32)),
                    Some(Cmd::message(11i32)),
                ]),
                99 => Some(crate::quit()),
                _ => None,
            }
        }

        fn view(&self) -> String {
            format!("{:?}", self.seen)
        }
    }

    #[test]
    fn test_init_runs_once() {
        let mut sim = ProgramSimulator::new(Log::default());
        sim.init();
        sim.init();
        assert_eq!(sim.stats().init_calls, 1);
        assert_eq!(sim.pending(), 1);
    }

    #[test]
    fn test_immediates_jump_the_queue() {
        let mut sim = ProgramSimulator::new(Log::default());
        sim.init();
        sim.send(Message::new(1i32));
        sim.send(Message::new(2i32));
        sim.run_until_empty();
        assert_eq!(sim.model().seen, vec![0, 1, 10, 11, 2, 30]);
    }

    #[test]
    fn test_quit_stops_processing() {
        let mut sim = ProgramSimulator::new(Log::default());
        sim.init();
        sim.send(Message::new(99i32));
        sim.send(Message::new(5i32));
        sim.run_until_quit(10);
        assert!(sim.is_quit());
        assert_eq!(sim.model().seen, vec![0, 99]);
    }

    #[test]
    fn test_interrupt_is_delivered_then_stops() {
        let mut sim = ProgramSimulator::new(Log::default());
        sim.init();
        sim.send(Message::new(InterruptMsg));
        sim.send(Message::new(7i32));
        sim.run_until_empty();
        assert!(sim.is_quit());
        assert!(!sim.model().seen.contains(&7));
        assert_eq!(sim.stats().update_calls, 2);
    }
}
