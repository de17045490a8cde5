//! Dynamic values recomputed when their bindings change.
//!
//! An [`Eval`] is a memoized cell for content that depends on other fields'
//! live values: a title that mentions the chosen burger, or an option list
//! that depends on the selected country. The cell watches a [`Bindings`]
//! fingerprint. When the fingerprint changes it serves a cached result for
//! the new fingerprint if there is one, and otherwise starts a background
//! computation and reports itself as loading.
//!
//! Results come back as [`EvalMsg`] events. A result whose fingerprint no
//! longer matches the current one is discarded, so a slow computation can
//! never overwrite a newer one.
//!
//! # Example
//!
//! ```rust
//! use termform::{Eval, EvalTarget, Value};
//!
//! let country = Value::new("France".to_string());
//! let c = country.clone();
//! let mut title = Eval::new(String::new())
//!     .with_func(move || format!("Cities in {}", c.get()), country.clone());
//!
//! // First refresh misses the cache and returns the computation.
//! let cmd = title.refresh(1, EvalTarget::Title).unwrap();
//! for msg in cmd.into_messages() {
//!     title.handle(1, EvalTarget::Title, &msg);
//! }
//! assert_eq!(title.get(), "Cities in France");
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use termloop::{Cmd, Message};

use crate::accessor::Value;

/// Maximum number of results remembered per dynamic value.
const CACHE_CAPACITY: usize = 64;

/// How long a computation runs before a spinner is shown.
pub const SPINNER_DELAY: Duration = Duration::from_millis(25);

/// A source of live values a dynamic computation depends on.
///
/// `fingerprint` hashes the current contents; equal fingerprints mean the
/// computation would produce the same result.
pub trait Bindings: Send + Sync {
    /// Hash of the current contents.
    fn fingerprint(&self) -> u64;
}

fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

impl<T: Hash + Send + Sync> Bindings for Value<T> {
    fn fingerprint(&self) -> u64 {
        hash_one(&*self.read())
    }
}

impl<A: Bindings, B: Bindings> Bindings for (A, B) {
    fn fingerprint(&self) -> u64 {
        hash_one(&(self.0.fingerprint(), self.1.fingerprint()))
    }
}

impl<A: Bindings, B: Bindings, C: Bindings> Bindings for (A, B, C) {
    fn fingerprint(&self) -> u64 {
        hash_one(&(
            self.0.fingerprint(),
            self.1.fingerprint(),
            self.2.fingerprint(),
        ))
    }
}

impl<B: Bindings> Bindings for Vec<B> {
    fn fingerprint(&self) -> u64 {
        let parts: Vec<u64> = self.iter().map(Bindings::fingerprint).collect();
        hash_one(&parts)
    }
}

/// Bindings backed by a closure returning any hashable value.
///
/// ```rust
/// use termform::{Bindings, BindingsFn};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let counter = Arc::new(AtomicU32::new(0));
/// let c = Arc::clone(&counter);
/// let bindings = BindingsFn::new(move || c.load(Ordering::Relaxed));
/// let before = bindings.fingerprint();
/// counter.store(1, Ordering::Relaxed);
/// assert_ne!(before, bindings.fingerprint());
/// ```
pub struct BindingsFn<F> {
    f: F,
}

impl<F> BindingsFn<F> {
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, H> Bindings for BindingsFn<F>
where
    F: Fn() -> H + Send + Sync,
    H: Hash,
{
    fn fingerprint(&self) -> u64 {
        hash_one(&(self.f)())
    }
}

/// Which part of a field a dynamic value renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalTarget {
    /// Field title.
    Title,
    /// Field description.
    Description,
    /// Input placeholder.
    Placeholder,
    /// Select/multi-select options.
    Options,
    /// Input suggestions.
    Suggestions,
}

/// A finished computation.
#[derive(Debug, Clone)]
pub struct EvalMsg<T> {
    /// Id of the field that requested it.
    pub id: usize,
    /// Target within the field.
    pub target: EvalTarget,
    /// Fingerprint the computation was started for.
    pub hash: u64,
    /// Computed value.
    pub value: T,
}

/// A computation that panicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalFailedMsg {
    /// Id of the field that requested it.
    pub id: usize,
    /// Target within the field.
    pub target: EvalTarget,
    /// Fingerprint the computation was started for.
    pub hash: u64,
}

type ComputeFn<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// A static or dynamically computed value.
///
/// A computation that panics is caught and leaves the previous value in
/// place. The process panic hook still runs first, and the default hook
/// prints to stderr underneath the form; programs that render full screen
/// can install a quieter hook with [`std::panic::set_hook`].
pub struct Eval<T> {
    val: T,
    func: Option<ComputeFn<T>>,
    bindings: Option<Arc<dyn Bindings>>,
    bindings_hash: Option<u64>,
    cache: LruCache<u64, T>,
    loading: bool,
    loading_start: Option<Instant>,
    spinner_due: bool,
    revision: u64,
}

impl<T: Clone + Send + 'static> Eval<T> {
    /// Creates a static value.
    pub fn new(val: T) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            val,
            func: None,
            bindings: None,
            bindings_hash: None,
            cache: LruCache::new(capacity),
            loading: false,
            loading_start: None,
            spinner_due: false,
            revision: 0,
        }
    }

    /// Replaces the value and drops any compute function.
    pub fn set(&mut self, val: T) {
        self.val = val;
        self.func = None;
        self.bindings = None;
        self.bindings_hash = None;
        self.stop_loading();
        self.revision += 1;
    }

    /// Makes the value dynamic: `f` is rerun whenever `bindings` change.
    pub fn with_func<F, B>(mut self, f: F, bindings: B) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.set_func(f, bindings);
        self
    }

    /// In-place version of [`Eval::with_func`].
    pub fn set_func<F, B>(&mut self, f: F, bindings: B)
    where
        F: Fn() -> T + Send + Sync + 'static,
        B: Bindings + 'static,
    {
        self.func = Some(Arc::new(f));
        self.bindings = Some(Arc::new(bindings));
        self.bindings_hash = None;
        self.cache.clear();
    }

    /// Current value. While loading this is the last resolved value.
    pub fn get(&self) -> &T {
        &self.val
    }

    /// Returns true if a compute function is installed.
    pub fn is_dynamic(&self) -> bool {
        self.func.is_some()
    }

    /// Returns true while a computation for the current fingerprint is in
    /// flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Counts replacements of the value, whether set directly, restored
    /// from the cache or resolved by a computation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true once [`Eval::check_spinner_delay`] has seen the current
    /// computation in flight longer than [`SPINNER_DELAY`].
    pub fn show_spinner(&self) -> bool {
        self.spinner_due
    }

    /// Decides whether the spinner is due. Called from `update` (on spinner
    /// ticks) so that rendering never depends on the clock.
    pub fn check_spinner_delay(&mut self) -> bool {
        self.spinner_due = self.loading
            && self
                .loading_start
                .is_some_and(|start| start.elapsed() > SPINNER_DELAY);
        self.spinner_due
    }

    fn stop_loading(&mut self) {
        self.loading = false;
        self.loading_start = None;
        self.spinner_due = false;
    }

    /// Checks the bindings and starts a computation if needed.
    ///
    /// Returns a task command when the current fingerprint is neither the
    /// last evaluated one nor cached.
    pub fn refresh(&mut self, id: usize, target: EvalTarget) -> Option<Cmd> {
        let (Some(func), Some(bindings)) = (&self.func, &self.bindings) else {
            return None;
        };

        let hash = bindings.fingerprint();
        if self.bindings_hash == Some(hash) {
            return None;
        }
        self.bindings_hash = Some(hash);

        if let Some(cached) = self.cache.get(&hash) {
            tracing::trace!(id, ?target, hash, "eval cache hit");
            self.val = cached.clone();
            self.stop_loading();
            self.revision += 1;
            return None;
        }

        tracing::trace!(id, ?target, hash, "eval cache miss");
        self.loading = true;
        self.loading_start = Some(Instant::now());
        self.spinner_due = false;

        let func = Arc::clone(func);
        Some(Cmd::new(move || {
            match panic::catch_unwind(AssertUnwindSafe(|| func())) {
                Ok(value) => Message::new(EvalMsg {
                    id,
                    target,
                    hash,
                    value,
                }),
                Err(_) => Message::new(EvalFailedMsg { id, target, hash }),
            }
        }))
    }

    /// Accepts a result computed for `hash`.
    ///
    /// Returns false (and drops the value) if the bindings changed since the
    /// computation started.
    pub fn apply(&mut self, hash: u64, value: T) -> bool {
        if self.bindings_hash != Some(hash) {
            tracing::debug!(hash, "discarding stale eval result");
            return false;
        }
        self.cache.put(hash, value.clone());
        self.val = value;
        self.stop_loading();
        self.revision += 1;
        true
    }

    /// Records a failed computation for `hash`. The previous value stays.
    pub fn fail(&mut self, hash: u64) -> bool {
        if self.bindings_hash != Some(hash) {
            return false;
        }
        tracing::debug!(hash, "eval computation failed; keeping previous value");
        self.stop_loading();
        true
    }

    /// Routes `msg` into this value if it is a result for `(id, target)`.
    ///
    /// Returns true if the value changed or stopped loading.
    pub fn handle(&mut self, id: usize, target: EvalTarget, msg: &Message) -> bool {
        if let Some(m) = msg.downcast_ref::<EvalMsg<T>>()
            && m.id == id
            && m.target == target
        {
            return self.apply(m.hash, m.value.clone());
        }
        if let Some(m) = msg.downcast_ref::<EvalFailedMsg>()
            && m.id == id
            && m.target == target
        {
            return self.fail(m.hash);
        }
        false
    }
}

impl<T: Clone + Send + Default + 'static> Default for Eval<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Eval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eval")
            .field("val", &self.val)
            .field("dynamic", &self.func.is_some())
            .field("bindings_hash", &self.bindings_hash)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}
