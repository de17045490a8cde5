//! Line-oriented prompts for accessible mode.
//!
//! Accessible mode replaces the interactive event loop with plain
//! question-and-answer prompts that work with screen readers and
//! non-interactive terminals. Every prompt writes to an `out` stream and
//! reads whole lines from `input`, re-prompting until the answer is valid.

use std::io::{BufRead, Write};

use crate::error::{FormError, Result};

/// Writes `prompt` and reads one line without its line ending.
///
/// Running out of input is an error: there is no one left to answer.
pub fn prompt_line(out: &mut dyn Write, input: &mut dyn BufRead, prompt: &str) -> Result<String> {
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(FormError::io("unexpected end of input"));
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

/// Prompts until `validate` accepts the answer.
pub fn prompt_validated<F>(
    out: &mut dyn Write,
    input: &mut dyn BufRead,
    prompt: &str,
    validate: F,
) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    loop {
        let line = prompt_line(out, input, prompt)?;
        match validate(&line) {
            None => return Ok(line),
            Some(err) => writeln!(out, "{err}")?,
        }
    }
}

/// Prompts for a whole number in `min..=max`.
///
/// ```rust
/// use termform::accessible::prompt_int_in_range;
///
/// let mut out = Vec::new();
/// let mut input: &[u8] = b"9\n2\n";
/// let n = prompt_int_in_range(&mut out, &mut input, "Choose: ", 1, 3).unwrap();
/// assert_eq!(n, 2);
/// assert!(String::from_utf8(out).unwrap().contains("between 1 and 3"));
/// ```
pub fn prompt_int_in_range(
    out: &mut dyn Write,
    input: &mut dyn BufRead,
    prompt: &str,
    min: usize,
    max: usize,
) -> Result<usize> {
    loop {
        let line = prompt_line(out, input, prompt)?;
        match line.trim().parse::<usize>() {
            Ok(n) if (min..=max).contains(&n) => return Ok(n),
            _ => writeln!(out, "Invalid: input must be between {min} and {max}")?,
        }
    }
}

/// Prompts for yes or no. An empty answer picks `default`.
pub fn prompt_bool(
    out: &mut dyn Write,
    input: &mut dyn BufRead,
    prompt: &str,
    default: bool,
) -> Result<bool> {
    let hint = if default { "(Y/n)" } else { "(y/N)" };
    let full = format!("{prompt} {hint} ");
    loop {
        let line = prompt_line(out, input, &full)?;
        match line.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(out, "Invalid: please answer y or n")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_line_strips_line_endings() {
        let mut out = Vec::new();
        let mut input: &[u8] = b"hello\r\n";
        let line = prompt_line(&mut out, &mut input, "> ").unwrap();
        assert_eq!(line, "hello");
        assert_eq!(out, b"> ");
    }

    #[test]
    fn test_eof_is_io_error() {
        let mut out = Vec::new();
        let mut input: &[u8] = b"";
        let err = prompt_line(&mut out, &mut input, "> ").unwrap_err();
        assert_eq!(err, FormError::Io("unexpected end of input".into()));
    }

    #[test]
    fn test_prompt_bool_default_and_retry() {
        let mut out = Vec::new();
        let mut input: &[u8] = b"\n";
        assert!(prompt_bool(&mut out, &mut input, "Sure?", true).unwrap());

        let mut input: &[u8] = b"maybe\nNo\n";
        assert!(!prompt_bool(&mut out, &mut input, "Sure?", true).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("please answer y or n"));
    }

    #[test]
    fn test_int_range_rejects_garbage() {
        let mut out = Vec::new();
        let mut input: &[u8] = b"abc\n0\n4\n";
        let n = prompt_int_in_range(&mut out, &mut input, "? ", 0, 5).unwrap();
        assert_eq!(n, 0);
    }
}
