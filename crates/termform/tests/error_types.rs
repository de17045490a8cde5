//! Error classification and conversions.

use std::io;

use termform::{FormConfig, FormError};

#[test]
fn classification() {
    assert!(FormError::UserAborted.is_user_abort());
    assert!(!FormError::UserAborted.is_timeout());
    assert!(FormError::Timeout.is_timeout());
    assert!(FormError::validation("bad").is_recoverable());
    assert!(!FormError::io("broken pipe").is_recoverable());
    assert!(!FormError::config("nope").is_recoverable());
}

#[test]
fn display_messages() {
    assert_eq!(FormError::UserAborted.to_string(), "user aborted");
    assert_eq!(FormError::Timeout.to_string(), "timeout");
    assert_eq!(
        FormError::validation("too short").to_string(),
        "validation error: too short"
    );
    assert_eq!(FormError::config("bad key").to_string(), "config error: bad key");
}

#[test]
fn io_errors_convert() {
    let err: FormError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed").into();
    assert_eq!(err, FormError::Io("pipe closed".into()));
    assert_eq!(err.clone(), err);
}

#[test]
fn bad_config_is_a_config_error() {
    let err = FormConfig::from_toml("width = \"wide\"").unwrap_err();
    assert!(matches!(err, FormError::Config(_)));
}

#[test]
fn works_with_anyhow() {
    fn run() -> anyhow::Result<()> {
        Err(FormError::Timeout)?;
        Ok(())
    }
    let err = run().unwrap_err();
    assert_eq!(err.downcast_ref::<FormError>(), Some(&FormError::Timeout));
}
