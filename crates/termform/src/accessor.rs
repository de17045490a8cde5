//! Storage for committed field values.
//!
//! A field never owns the place its result ends up in. It writes through an
//! [`Accessor`], which is either field-local ([`EmbeddedAccessor`], the
//! default) or a [`Value`] handle the caller keeps and reads after the form
//! has run.
//!
//! # Example
//!
//! ```rust
//! use termform::{Accessor, Value};
//!
//! let name = Value::new(String::new());
//! let mut handle = name.clone();
//! handle.set("Ada".to_string());
//! assert_eq!(name.get(), "Ada");
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

/// Get/set capability over a storage location.
pub trait Accessor<T>: Send + Sync {
    /// Returns the stored value.
    fn get(&self) -> T;

    /// Replaces the stored value.
    fn set(&mut self, value: T);
}

/// Accessor that keeps the value inside the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedAccessor<T> {
    value: T,
}

impl<T> EmbeddedAccessor<T> {
    /// Creates an accessor holding `value`.
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone + Send + Sync> Accessor<T> for EmbeddedAccessor<T> {
    fn get(&self) -> T {
        self.value.clone()
    }

    fn set(&mut self, value: T) {
        self.value = value;
    }
}

/// A shared, cloneable value cell.
///
/// Clones point at the same storage. Bind one clone to a field and keep
/// another to read the result, or pass it to a dynamic title/options
/// function as a binding.
pub struct Value<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Value<T> {
    /// Creates a new cell.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Replaces the stored value.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.inner.write(), value)
    }

    /// Borrows the stored value.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read()
    }
}

impl<T: Clone> Value<T> {
    /// Returns a copy of the stored value.
    pub fn get(&self) -> T {
        self.inner.read().clone()
    }
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Value<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&*self.inner.read()).finish()
    }
}

impl<T: Clone + Send + Sync> Accessor<T> for Value<T> {
    fn get(&self) -> T {
        Value::get(self)
    }

    fn set(&mut self, value: T) {
        *self.inner.write() = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_accessor() {
        let mut acc = EmbeddedAccessor::new(3);
        assert_eq!(acc.get(), 3);
        acc.set(4);
        assert_eq!(acc.get(), 4);
    }

    #[test]
    fn test_value_clones_share_storage() {
        let a = Value::new(vec![1]);
        let mut b = a.clone();
        Accessor::set(&mut b, vec![1, 2]);
        assert_eq!(a.get(), vec![1, 2]);
        assert_eq!(a.replace(vec![]), vec![1, 2]);
        assert!(b.read().is_empty());
    }
}
