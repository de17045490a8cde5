//! Form errors.

use thiserror::Error;

/// Errors that can occur during form execution.
///
/// Only terminal conditions cross the [`crate::Form::run`] boundary: a user
/// abort, a timeout, or an I/O failure. Field validation failures are state
/// shown inline under the field and never surface from `run`, except in
/// accessible mode where a prompt can run out of input.
///
/// | Error Variant | Recovery Strategy |
/// |--------------|-------------------|
/// | [`UserAborted`](FormError::UserAborted) | Normal exit, not an error condition |
/// | [`Timeout`](FormError::Timeout) | Retry with a longer timeout or use defaults |
/// | [`Validation`](FormError::Validation) | Show the message and let the user retry |
/// | [`Io`](FormError::Io) | Check the terminal, fall back to accessible mode |
/// | [`Config`](FormError::Config) | Fix the configuration source |
///
/// # Example
///
/// ```rust,ignore
/// match form.run() {
///     Ok(()) => println!("Order placed"),
///     Err(FormError::UserAborted) => println!("No changes made"),
///     Err(FormError::Timeout) => println!("Took too long"),
///     Err(e) => return Err(e.into()),
/// }
/// ```
///
/// The `Io` variant stores a message instead of [`std::io::Error`] so the
/// type can be `Clone` and `PartialEq`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The user pressed Ctrl+C or the run was cancelled externally.
    #[error("user aborted")]
    UserAborted,

    /// The configured deadline elapsed before the form was completed.
    #[error("timeout")]
    Timeout,

    /// A value was rejected by a validator.
    #[error("validation error: {0}")]
    Validation(String),

    /// Terminal or stream I/O failed.
    #[error("io error: {0}")]
    Io(String),

    /// A configuration source could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl FormError {
    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true if this is a user-initiated abort.
    pub fn is_user_abort(&self) -> bool {
        matches!(self, Self::UserAborted)
    }

    /// Returns true if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns true if this error is recoverable (validation errors).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<termloop::Error> for FormError {
    fn from(err: termloop::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<std::io::Error> for FormError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// A specialized [`Result`] type for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
