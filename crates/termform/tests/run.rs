//! Running forms through the real event loop with redirected I/O.

use std::io::{self, Cursor};
use std::thread;
use std::time::Duration;

use termform::{Form, FormError, FormState, Group, Input, Value};
use tokio_util::sync::CancellationToken;

fn one_input(name: &Value<String>) -> Form {
    Form::new(vec![Group::new(vec![Box::new(
        Input::new().key("name").title("Name").accessor(name.clone()),
    )])])
}

#[test]
fn deadline_without_input_times_out() {
    let name = Value::new(String::new());
    let mut form = one_input(&name)
        .timeout(Duration::from_millis(1))
        .input(io::empty())
        .output(io::sink());

    let err = form.run().unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err, FormError::Timeout);
    assert_eq!(form.state(), FormState::TimedOut);
}

#[test]
fn cancelled_token_aborts_before_running() {
    let name = Value::new(String::new());
    let mut form = one_input(&name).input(io::empty()).output(io::sink());
    let token = CancellationToken::new();
    token.cancel();

    let err = form.run_with_cancel(token).unwrap_err();
    assert!(err.is_user_abort());
    assert_eq!(form.state(), FormState::Aborted);
}

#[test]
fn cancelling_mid_run_aborts() {
    let name = Value::new(String::new());
    let mut form = one_input(&name)
        .timeout(Duration::from_secs(10))
        .input(io::empty())
        .output(io::sink());
    let token = CancellationToken::new();
    let canceller = token.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        canceller.cancel();
    });

    let err = form.run_with_cancel(token).unwrap_err();
    handle.join().unwrap();
    assert_eq!(err, FormError::UserAborted);
}

#[test]
fn typed_input_completes_the_form() {
    let name = Value::new(String::new());
    let mut form = one_input(&name)
        .timeout(Duration::from_secs(10))
        .input(Cursor::new(b"Ada\r".to_vec()))
        .output(io::sink());

    form.run().unwrap();
    assert_eq!(form.state(), FormState::Completed);
    assert_eq!(name.get(), "Ada");
    assert_eq!(form.get_string("name"), "Ada");
}

#[test]
fn ctrl_c_in_input_aborts() {
    let name = Value::new(String::new());
    let mut form = one_input(&name)
        .timeout(Duration::from_secs(10))
        .input(Cursor::new(b"A\x03".to_vec()))
        .output(io::sink());

    assert_eq!(form.run().unwrap_err(), FormError::UserAborted);
    assert_eq!(name.get(), "A");
}

struct ClosedTerminal;

impl io::Write for ClosedTerminal {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn output_failure_keeps_the_form() {
    let name = Value::new("Ada".to_string());
    let mut form = one_input(&name)
        .timeout(Duration::from_secs(10))
        .input(io::empty())
        .output(ClosedTerminal);

    let err = form.run().unwrap_err();
    assert!(matches!(err, FormError::Io(_)));
    assert_eq!(form.len(), 1);
    assert_eq!(form.get_string("name"), "Ada");
    assert_eq!(form.state(), FormState::Normal);
}
