//! Ready-made validators.
//!
//! A validator returns `None` for a valid value and `Some(message)` otherwise.
//! Fields accept any closure with that shape; the helpers here cover the
//! common cases.
//!
//! ```rust
//! use termform::validate;
//!
//! let check = validate::required("name");
//! assert_eq!(check("  ").as_deref(), Some("name is required"));
//! assert!(check("Ada").is_none());
//! ```

/// Boxed validation function stored by fields.
pub type Validator<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Accepts everything.
pub(crate) fn always_valid<T: ?Sized>() -> Box<dyn Fn(&T) -> Option<String> + Send + Sync> {
    Box::new(|_| None)
}

/// Rejects empty or whitespace-only strings.
pub fn required(name: &str) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let message = format!("{name} is required");
    move |s| s.trim().is_empty().then(|| message.clone())
}

/// Rejects strings shorter than `min` characters.
pub fn min_length(min: usize) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    move |s| (s.chars().count() < min).then(|| format!("must be at least {min} characters"))
}

/// Rejects strings longer than `max` characters.
pub fn max_length(max: usize) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    move |s| (s.chars().count() > max).then(|| format!("must be at most {max} characters"))
}

/// Loose email check: one `@`, non-empty local part, dotted domain.
pub fn email() -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    |s| {
        if s.is_empty() {
            return Some("email is required".to_string());
        }
        let invalid = || Some("invalid email address".to_string());
        let Some((local, domain)) = s.split_once('@') else {
            return invalid();
        };
        if local.is_empty() || domain.contains('@') {
            return invalid();
        }
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
            return invalid();
        }
        None
    }
}

/// Rejects any of the listed values.
///
/// ```rust
/// use termform::validate;
///
/// let check = validate::not_one_of(vec!["Hard".to_string()], "too hard");
/// assert!(check(&"Soft".to_string()).is_none());
/// assert_eq!(check(&"Hard".to_string()).as_deref(), Some("too hard"));
/// ```
pub fn not_one_of<T>(
    rejected: Vec<T>,
    message: impl Into<String>,
) -> impl Fn(&T) -> Option<String> + Send + Sync + 'static
where
    T: PartialEq + Send + Sync + 'static,
{
    let message = message.into();
    move |v| rejected.contains(v).then(|| message.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_bounds() {
        assert!(min_length(3)("ab").is_some());
        assert!(min_length(3)("abc").is_none());
        assert!(max_length(2)("héé").is_some());
        assert!(max_length(3)("héé").is_none());
    }

    #[test]
    fn test_email() {
        let check = email();
        assert!(check("a@b.co").is_none());
        for bad in ["", "ab", "@b.co", "a@b", "a@@b.co", "a@b..co", "a@.co"] {
            assert!(check(bad).is_some(), "{bad}");
        }
    }

    #[test]
    fn test_always_valid() {
        assert!(always_valid::<str>()("anything").is_none());
    }
}
