//! Bounded counters.
//!
//! A [`BoundedCounter`] adds a signed delta to an integer held by the store,
//! refusing any update that would push it above the caller's limit or below
//! zero. Read, check and write run inside the store as one script, so
//! concurrent callers, in this process or any other client of the same
//! store, never race.

use crate::registry::ScriptRegistry;
use crate::source::ScriptSource;
use crate::store::{MemoryStore, Reply, ScriptStore};
use crate::{Error, Options, Result};
use std::sync::Arc;

/// Identifier the bounded-increment script is registered under.
pub const INCR_WITH_LIMIT: &str = "incrWithLimit";

/// Result of a bounded increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrOutcome {
    /// The counter was updated to this value.
    Value(i64),
    /// The counter was left unchanged because the bound would be crossed.
    LimitExceeded,
}

impl IncrOutcome {
    /// Returns the new value, or `None` if the limit was hit.
    pub fn value(self) -> Option<i64> {
        match self {
            IncrOutcome::Value(v) => Some(v),
            IncrOutcome::LimitExceeded => None,
        }
    }

    /// Returns true if the limit was hit.
    pub fn is_limit_exceeded(self) -> bool {
        self == IncrOutcome::LimitExceeded
    }
}

/// Atomic bounded counters over a script store.
///
/// # Example
///
/// ```
/// use bounded_counter::{BoundedCounter, IncrOutcome, Options};
///
/// # fn main() -> Result<(), bounded_counter::Error> {
/// let counter = BoundedCounter::open(Options::default())?;
/// counter.init()?;
///
/// assert_eq!(counter.incr_by_with_limit("requests", 2, 3)?, IncrOutcome::Value(2));
/// assert_eq!(counter.incr_by_with_limit("requests", 2, 3)?, IncrOutcome::LimitExceeded);
/// assert_eq!(counter.incr_with_limit("requests", 3)?, IncrOutcome::Value(3));
///
/// counter.quit()?;
/// # Ok(())
/// # }
/// ```
pub struct BoundedCounter<S: ScriptStore> {
    store: Arc<S>,
    registry: ScriptRegistry<S>,
    script: ScriptSource,
    owns_store: bool,
}

impl BoundedCounter<MemoryStore> {
    /// Creates a counter with its own [`MemoryStore`].
    ///
    /// The store is closed by [`BoundedCounter::quit`].
    pub fn open(options: Options) -> Result<Self> {
        options.validate()?;
        let store = Arc::new(MemoryStore::new(&options));
        Ok(Self::build(store, options.counter_script, true))
    }
}

impl<S: ScriptStore> BoundedCounter<S> {
    fn build(store: Arc<S>, script: ScriptSource, owns_store: bool) -> Self {
        let registry = ScriptRegistry::new(Arc::clone(&store));
        Self { store, registry, script, owns_store }
    }

    /// Creates a counter over an existing store, using the embedded script.
    ///
    /// The store is not closed by [`BoundedCounter::quit`].
    pub fn with_store(store: Arc<S>) -> Self {
        Self::build(store, ScriptSource::default_counter(), false)
    }

    /// Creates a counter over an existing store with a custom script source.
    pub fn with_store_and_script(store: Arc<S>, script: ScriptSource) -> Self {
        Self::build(store, script, false)
    }

    /// Registers the bounded-increment script with the store.
    ///
    /// Must complete before any increment.
    ///
    /// # Errors
    ///
    /// [`Error::ScriptLoad`] if the script cannot be read or is rejected.
    pub fn init(&self) -> Result<()> {
        self.registry.register_all([(INCR_WITH_LIMIT, self.script.clone())])?;
        Ok(())
    }

    /// Adds 1 to `key` unless the result would exceed `limit`.
    pub fn incr_with_limit(&self, key: &str, limit: i64) -> Result<IncrOutcome> {
        self.incr_by_with_limit(key, 1, limit)
    }

    /// Adds `delta` to `key` unless the result would exceed `limit`, fall
    /// below zero, or overflow `i64`. A missing key counts as zero.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `key` is empty
    /// - [`Error::UnknownScript`] if called before [`BoundedCounter::init`]
    /// - [`Error::StoreExecution`] if the store fails, for example because
    ///   the value under `key` is not an integer
    pub fn incr_by_with_limit(&self, key: &str, delta: i64, limit: i64) -> Result<IncrOutcome> {
        if key.is_empty() {
            return Err(Error::invalid_argument("counter key must not be empty"));
        }

        let limit = limit.to_string();
        let delta = delta.to_string();
        let args = [limit.as_str(), delta.as_str()];
        let reply = self.registry.invoke(INCR_WITH_LIMIT, &[key], &args)?;

        match reply {
            Reply::Int(value) => Ok(IncrOutcome::Value(value)),
            Reply::Nil => Ok(IncrOutcome::LimitExceeded),
            other => Err(Error::store_execution(format!(
                "unexpected reply from {}: {:?}",
                INCR_WITH_LIMIT, other
            ))),
        }
    }

    /// Reads the current value of `key`, 0 if absent.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if the stored value is not an integer.
    pub fn get(&self, key: &str) -> Result<i64> {
        match self.store.get(key.as_bytes())? {
            None => Ok(0),
            Some(raw) => std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| Error::invalid_state(format!("value at {} is not an integer", key))),
        }
    }

    /// Returns the script registry.
    pub fn registry(&self) -> &ScriptRegistry<S> {
        &self.registry
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns true if [`BoundedCounter::quit`] closes the store.
    pub fn owns_store(&self) -> bool {
        self.owns_store
    }

    /// Forgets registered scripts and closes the store if this counter owns it.
    pub fn quit(&self) -> Result<()> {
        self.registry.clear();
        if self.owns_store {
            self.store.close()?;
        }
        Ok(())
    }
}
