//! Program lifecycle and event loop.
//!
//! [`Program`] owns the terminal for the duration of a run: it switches to
//! raw mode, reads events, feeds them to the model one at a time and renders
//! the view whenever it changes.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{
        self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use tokio_util::sync::CancellationToken;

use crate::command::{Cmd, CmdKind};
use crate::key::{KeyMsg, KeyType, control_key_type, from_crossterm_key, is_sequence_prefix};
use crate::message::{CancelMsg, InterruptMsg, Message, QuitMsg, TimeoutMsg, WindowSizeMsg};

/// Errors that can occur while running a program.
///
/// ```rust,ignore
/// match Program::new(model).run() {
///     Ok(model) => println!("done: {}", model.view()),
///     Err(Error::RawModeFailure { .. }) => eprintln!("not a terminal"),
///     Err(e) => eprintln!("program error: {e}"),
/// }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O error during terminal operations.
    #[error("terminal io error: {0}")]
    Io(#[from] io::Error),

    /// Failed to enable or disable raw mode.
    #[error("failed to {action} raw mode: {source}")]
    RawModeFailure {
        /// Whether we were trying to enable or disable raw mode.
        action: &'static str,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write the view.
    #[error("failed to render view: {0}")]
    Render(io::Error),
}

/// A specialized [`Result`] type for program operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The application state driven by a [`Program`].
///
/// # Example
///
/// ```rust
/// use termloop::{Cmd, Message, Model};
///
/// struct Hello;
///
/// impl Model for Hello {
///     fn init(&mut self) -> Option<Cmd> { None }
///
///     fn update(&mut self, _msg: Message) -> Option<Cmd> {
///         Some(termloop::quit())
///     }
///
///     fn view(&self) -> String {
///         "hello".to_string()
///     }
/// }
/// ```
pub trait Model: Send + 'static {
    /// Called once before the first event. May return a command.
    fn init(&mut self) -> Option<Cmd>;

    /// Handle one message. May return a command.
    fn update(&mut self, msg: Message) -> Option<Cmd>;

    /// Render the model.
    fn view(&self) -> String;
}

/// Program options.
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    /// Use alternate screen buffer.
    pub alt_screen: bool,
    /// Use custom I/O (skip raw mode and event polling).
    pub custom_io: bool,
    /// Target frames per second.
    pub fps: u32,
    /// Deadline after which [`TimeoutMsg`] is delivered.
    pub timeout: Option<Duration>,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            alt_screen: false,
            custom_io: false,
            fps: 60,
            timeout: None,
        }
    }
}

/// Runs a [`Model`] against a terminal or custom I/O.
pub struct Program<M: Model> {
    model: M,
    options: ProgramOptions,
    cancel: Option<CancellationToken>,
    input: Option<Box<dyn Read + Send>>,
    output: Option<Box<dyn Write + Send>>,
}

impl<M: Model> Program<M> {
    /// Create a new program with the given model.
    pub fn new(model: M) -> Self {
        Self {
            model,
            options: ProgramOptions::default(),
            cancel: None,
            input: None,
            output: None,
        }
    }

    /// Read raw key bytes from `input` instead of the terminal.
    ///
    /// Enables custom I/O mode.
    pub fn with_input<R: Read + Send + 'static>(mut self, input: R) -> Self {
        self.input = Some(Box::new(input));
        self.options.custom_io = true;
        self
    }

    /// Write rendered views to `output` instead of stdout.
    ///
    /// Enables custom I/O mode.
    pub fn with_output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.output = Some(Box::new(output));
        self.options.custom_io = true;
        self
    }

    /// Use alternate screen buffer (full-screen mode).
    pub fn with_alt_screen(mut self) -> Self {
        self.options.alt_screen = true;
        self
    }

    /// Set the target frames per second, clamped to 1-120.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.options.fps = fps.clamp(1, 120);
        self
    }

    /// Deliver [`CancelMsg`] when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Deliver [`TimeoutMsg`] once `timeout` has elapsed. A zero duration
    /// disables the deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Returns the configured options.
    pub fn options(&self) -> &ProgramOptions {
        &self.options
    }

    /// Run the program and return the final model state.
    pub fn run(self) -> Result<M> {
        let (model, result) = self.run_returning_model();
        result.map(|()| model)
    }

    /// Run the program, handing the model back even if the loop failed.
    ///
    /// The terminal is restored before this returns in either case.
    pub fn run_returning_model(mut self) -> (M, Result<()>) {
        match self.output.take() {
            Some(output) => self.drive(output),
            None => self.drive(io::stdout()),
        }
    }

    /// Run the program, rendering into `writer`.
    pub fn run_with_writer<W: Write + Send + 'static>(self, writer: W) -> Result<M> {
        let (model, result) = self.drive(writer);
        result.map(|()| model)
    }

    fn drive<W: Write>(mut self, mut writer: W) -> (M, Result<()>) {
        let options = self.options.clone();

        if !options.custom_io
            && let Err(source) = enable_raw_mode()
        {
            let err = Error::RawModeFailure {
                action: "enable",
                source,
            };
            return (self.model, Err(err));
        }

        let result = self.start(&mut writer);

        let _ = execute!(writer, Show);
        if options.alt_screen {
            let _ = execute!(writer, LeaveAlternateScreen);
        }
        if !options.custom_io {
            let _ = disable_raw_mode();
        }

        (self.model, result)
    }

    fn start<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        if self.options.alt_screen {
            execute!(writer, EnterAlternateScreen)?;
        }
        execute!(writer, Hide)?;
        self.event_loop(writer)
    }

    fn event_loop<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        let (tx, rx): (Sender<Message>, Receiver<Message>) = mpsc::channel();
        let mut pending: VecDeque<Message> = VecDeque::new();

        if let Some(mut input) = self.input.take() {
            let tx = tx.clone();
            thread::spawn(move || {
                let mut parser = InputParser::new();
                let mut buf = [0u8; 256];
                loop {
                    match input.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            for msg in parser.push_bytes(&buf[..n], true) {
                                let _ = tx.send(msg);
                            }
                        }
                        Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                            thread::yield_now();
                        }
                        Err(_) => break,
                    }
                }
                for msg in parser.flush() {
                    let _ = tx.send(msg);
                }
            });
        }

        // The guard cancels the listener's child token when the loop returns,
        // which lets the listener thread exit.
        let _listener_guard = self.cancel.as_ref().map(|token| {
            let child = token.child_token();
            let listener = child.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                futures::executor::block_on(listener.cancelled());
                let _ = tx.send(Message::new(CancelMsg));
            });
            child.drop_guard()
        });

        if !self.options.custom_io
            && let Ok((width, height)) = terminal::size()
        {
            let _ = tx.send(Message::new(WindowSizeMsg { width, height }));
        }

        let deadline = self.options.timeout.map(|t| Instant::now() + t);
        let mut deadline_fired = false;

        if let Some(cmd) = self.model.init() {
            self.dispatch(cmd, &mut pending, &tx);
        }

        let mut last_view = String::new();
        self.render(writer, &mut last_view)?;

        let frame_duration = Duration::from_secs_f64(1.0 / f64::from(self.options.fps));

        loop {
            if !self.options.custom_io && event::poll(frame_duration)? {
                match event::read()? {
                    Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                        let key = from_crossterm_key(key_event.code, key_event.modifiers);
                        let _ = tx.send(message_from_key(key));
                    }
                    Event::Resize(width, height) => {
                        let _ = tx.send(Message::new(WindowSizeMsg { width, height }));
                    }
                    Event::Paste(text) => {
                        let key = KeyMsg::from_runes(text.chars().collect()).with_paste();
                        let _ = tx.send(Message::new(key));
                    }
                    _ => {}
                }
            }

            if !deadline_fired && deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::debug!("program deadline elapsed");
                deadline_fired = true;
                pending.push_back(Message::new(TimeoutMsg));
            }

            let mut needs_render = false;
            loop {
                let msg = match pending.pop_front() {
                    Some(msg) => msg,
                    None => match rx.try_recv() {
                        Ok(msg) => msg,
                        Err(_) => break,
                    },
                };

                if msg.is::<QuitMsg>() {
                    self.render(writer, &mut last_view)?;
                    return Ok(());
                }

                let interrupted = msg.is::<InterruptMsg>();
                if let Some(cmd) = self.model.update(msg) {
                    self.dispatch(cmd, &mut pending, &tx);
                }
                needs_render = true;

                if interrupted {
                    self.render(writer, &mut last_view)?;
                    return Ok(());
                }
            }

            if needs_render {
                self.render(writer, &mut last_view)?;
            }

            if self.options.custom_io {
                thread::sleep(frame_duration);
            }
        }
    }

    /// Route a command: immediate messages go to the front of `pending` in
    /// order, tasks run on their own thread.
    fn dispatch(&self, cmd: Cmd, pending: &mut VecDeque<Message>, tx: &Sender<Message>) {
        let mut immediate = Vec::new();
        Self::route(cmd, &mut immediate, tx);
        for msg in immediate.into_iter().rev() {
            pending.push_front(msg);
        }
    }

    fn route(cmd: Cmd, immediate: &mut Vec<Message>, tx: &Sender<Message>) {
        match cmd.into_kind() {
            CmdKind::Immediate(msg) => immediate.push(msg),
            CmdKind::Task(f) => {
                let tx = tx.clone();
                thread::spawn(move || {
                    if let Some(msg) = f() {
                        let _ = tx.send(msg);
                    }
                });
            }
            CmdKind::Batch(cmds) => {
                for cmd in cmds {
                    Self::route(cmd, immediate, tx);
                }
            }
            CmdKind::Sequence(cmds) => {
                let tx = tx.clone();
                thread::spawn(move || {
                    for cmd in cmds {
                        for msg in cmd.into_messages() {
                            let _ = tx.send(msg);
                        }
                    }
                });
            }
        }
    }

    fn render<W: Write>(&self, writer: &mut W, last_view: &mut String) -> Result<()> {
        let view = self.model.view();
        if view == *last_view {
            return Ok(());
        }

        execute!(writer, MoveTo(0, 0), Clear(ClearType::All)).map_err(Error::Render)?;
        write!(writer, "{view}").map_err(Error::Render)?;
        writer.flush().map_err(Error::Render)?;

        *last_view = view;
        Ok(())
    }
}

// Custom input parsing

struct InputParser {
    buffer: Vec<u8>,
}

enum ParseOutcome {
    NeedMore,
    Parsed(usize, Option<Message>),
}

impl InputParser {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    fn push_bytes(&mut self, bytes: &[u8], can_have_more_data: bool) -> Vec<Message> {
        self.buffer.extend_from_slice(bytes);

        let mut messages = Vec::new();
        while !self.buffer.is_empty() {
            match parse_one_message(&self.buffer, can_have_more_data) {
                ParseOutcome::NeedMore => break,
                ParseOutcome::Parsed(consumed, msg) => {
                    self.buffer.drain(0..consumed);
                    messages.extend(msg);
                }
            }
        }
        messages
    }

    fn flush(&mut self) -> Vec<Message> {
        self.push_bytes(&[], false)
    }
}

fn parse_one_message(buf: &[u8], can_have_more_data: bool) -> ParseOutcome {
    if let Some(outcome) = parse_bracketed_paste(buf, can_have_more_data) {
        return outcome;
    }

    if let Some((key, len)) = crate::key::parse_sequence_prefix(buf) {
        return ParseOutcome::Parsed(len, Some(message_from_key(key)));
    }
    if can_have_more_data && is_sequence_prefix(buf) {
        return ParseOutcome::NeedMore;
    }

    parse_rune_or_control(buf, can_have_more_data)
}

fn parse_bracketed_paste(buf: &[u8], can_have_more_data: bool) -> Option<ParseOutcome> {
    const BP_START: &[u8] = b"\x1b[200~";
    const BP_END: &[u8] = b"\x1b[201~";

    if !buf.starts_with(BP_START) {
        return None;
    }

    let (content, consumed) = match buf.windows(BP_END.len()).position(|w| w == BP_END) {
        Some(idx) => (&buf[BP_START.len()..idx], idx + BP_END.len()),
        None if can_have_more_data => return Some(ParseOutcome::NeedMore),
        None => (&buf[BP_START.len()..], buf.len()),
    };

    let runes = String::from_utf8_lossy(content).chars().collect();
    let key = KeyMsg::from_runes(runes).with_paste();
    Some(ParseOutcome::Parsed(consumed, Some(Message::new(key))))
}

/// Decode one control byte or one character. A leading ESC followed by
/// more input marks the next key as alt-modified.
fn parse_rune_or_control(buf: &[u8], can_have_more_data: bool) -> ParseOutcome {
    let (alt, idx) = if buf[0] == 0x1b {
        if buf.len() == 1 {
            return if can_have_more_data {
                ParseOutcome::NeedMore
            } else {
                ParseOutcome::Parsed(1, Some(message_from_key(KeyMsg::from_type(KeyType::Esc))))
            };
        }
        (true, 1)
    } else {
        (false, 0)
    };

    let with_alt = |key: KeyMsg| if alt { key.with_alt() } else { key };

    if let Some(key_type) = control_key_type(buf[idx]) {
        let key = with_alt(KeyMsg::from_type(key_type));
        return ParseOutcome::Parsed(idx + 1, Some(message_from_key(key)));
    }

    match decode_char(&buf[idx..], can_have_more_data) {
        DecodeOutcome::NeedMore => ParseOutcome::NeedMore,
        DecodeOutcome::Decoded(ch, width) => {
            let key = with_alt(KeyMsg::from_char(ch));
            ParseOutcome::Parsed(idx + width, Some(message_from_key(key)))
        }
    }
}

enum DecodeOutcome {
    NeedMore,
    Decoded(char, usize),
}

fn decode_char(input: &[u8], can_have_more_data: bool) -> DecodeOutcome {
    let first = input[0];
    let width = if first < 0x80 {
        1
    } else if (first & 0xE0) == 0xC0 {
        2
    } else if (first & 0xF0) == 0xE0 {
        3
    } else if (first & 0xF8) == 0xF0 {
        4
    } else {
        return DecodeOutcome::Decoded(char::REPLACEMENT_CHARACTER, 1);
    };

    if input.len() < width {
        return if can_have_more_data {
            DecodeOutcome::NeedMore
        } else {
            DecodeOutcome::Decoded(char::REPLACEMENT_CHARACTER, 1)
        };
    }

    match std::str::from_utf8(&input[..width]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => DecodeOutcome::Decoded(ch, width),
            None => DecodeOutcome::Decoded(char::REPLACEMENT_CHARACTER, 1),
        },
        Err(_) => DecodeOutcome::Decoded(char::REPLACEMENT_CHARACTER, 1),
    }
}

fn message_from_key(key: KeyMsg) -> Message {
    if key.key_type == KeyType::CtrlC {
        Message::new(InterruptMsg)
    } else {
        Message::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn keys(bytes: &[u8]) -> Vec<String> {
        let mut parser = InputParser::new();
        let mut msgs = parser.push_bytes(bytes, true);
        msgs.extend(parser.flush());
        msgs.into_iter()
            .map(|m| match m.downcast::<KeyMsg>() {
                Some(k) => k.to_string(),
                None => "<interrupt>".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_parser_splits_runes_and_controls() {
        assert_eq!(keys(b"ab\r"), vec!["a", "b", "enter"]);
        assert_eq!(keys(b"\t\x1b[Z"), vec!["tab", "shift+tab"]);
        assert_eq!(keys(b" \x7f"), vec![" ", "backspace"]);
    }

    #[test]
    fn test_parser_ctrl_c_is_interrupt() {
        assert_eq!(keys(b"x\x03"), vec!["x", "<interrupt>"]);
    }

    #[test]
    fn test_parser_lone_escape_and_alt() {
        assert_eq!(keys(b"\x1b"), vec!["esc"]);
        assert_eq!(keys(b"\x1bq"), vec!["alt+q"]);
    }

    #[test]
    fn test_parser_waits_for_partial_sequence() {
        let mut parser = InputParser::new();
        assert!(parser.push_bytes(b"\x1b[", true).is_empty());
        let msgs = parser.push_bytes(b"B", true);
        assert_eq!(msgs.len(), 1);
        let key = msgs.into_iter().next().unwrap().downcast::<KeyMsg>().unwrap();
        assert_eq!(key.key_type, KeyType::Down);
    }

    #[test]
    fn test_parser_utf8_and_paste() {
        assert_eq!(keys("é".as_bytes()), vec!["é"]);
        assert_eq!(keys(b"\x1b[200~hi\x1b[201~"), vec!["[hi]"]);
    }

    #[test]
    fn test_program_builder() {
        struct Noop;
        impl Model for Noop {
            fn init(&mut self) -> Option<Cmd> {
                None
            }
            fn update(&mut self, _msg: Message) -> Option<Cmd> {
                None
            }
            fn view(&self) -> String {
                String::new()
            }
        }

        let program = Program::new(Noop)
            .with_fps(500)
            .with_timeout(Duration::ZERO)
            .with_output(Vec::new());
        assert_eq!(program.options().fps, 120);
        assert!(program.options().timeout.is_none());
        assert!(program.options().custom_io);
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Recorder {
        seen: Vec<String>,
    }

    impl Model for Recorder {
        fn init(&mut self) -> Option<Cmd> {
            None
        }

        fn update(&mut self, msg: Message) -> Option<Cmd> {
            if let Some(key) = msg.downcast_ref::<KeyMsg>() {
                self.seen.push(key.to_string());
                if key.key_type == KeyType::Enter {
                    return crate::command::batch(vec![
                        Some(Cmd::message("follow-up")),
                        Some(crate::quit()),
                    ]);
                }
            } else if let Some(s) = msg.downcast_ref::<&'static str>() {
                self.seen.push((*s).to_string());
            } else if msg.is::<TimeoutMsg>() {
                self.seen.push("timeout".into());
                return Some(crate::quit());
            } else if msg.is::<CancelMsg>() {
                self.seen.push("cancel".into());
                return Some(crate::quit());
            } else if msg.is::<InterruptMsg>() {
                self.seen.push("interrupt".into());
            }
            None
        }

        fn view(&self) -> String {
            self.seen.join(",")
        }
    }

    #[test]
    fn test_custom_io_run_delivers_immediates_in_order() {
        let out = SharedBuf::default();
        let model = Program::new(Recorder { seen: vec![] })
            .with_input(io::Cursor::new(b"hi\rzz".to_vec()))
            .with_output(out.clone())
            .run()
            .unwrap();
        assert_eq!(model.seen, vec!["h", "i", "enter", "follow-up"]);
        assert!(!out.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_timeout_fires() {
        let model = Program::new(Recorder { seen: vec![] })
            .with_input(io::empty())
            .with_output(io::sink())
            .with_timeout(Duration::from_millis(1))
            .run()
            .unwrap();
        assert_eq!(model.seen, vec!["timeout"]);
    }

    #[test]
    fn test_cancelled_token_delivers_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        let model = Program::new(Recorder { seen: vec![] })
            .with_input(io::empty())
            .with_output(io::sink())
            .with_cancellation(token)
            .run()
            .unwrap();
        assert_eq!(model.seen, vec!["cancel"]);
    }

    #[test]
    fn test_interrupt_reaches_model_then_stops() {
        let model = Program::new(Recorder { seen: vec![] })
            .with_input(io::Cursor::new(b"a\x03b".to_vec()))
            .with_output(io::sink())
            .run()
            .unwrap();
        assert_eq!(model.seen, vec!["a", "interrupt"]);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_model_survives_output_failure() {
        let (model, result) = Program::new(Recorder {
            seen: vec!["kept".into()],
        })
        .with_input(io::empty())
        .with_output(BrokenPipe)
        .run_returning_model();
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(model.seen, vec!["kept"]);
    }
}
