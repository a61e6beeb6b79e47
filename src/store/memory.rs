//! MemoryStore: an in-process store that evaluates Lua scripts.

use super::{Keyspace, Reply, ScriptHandle, ScriptStore};
use crate::script::{CacheStats, LuaExecutor, ScriptCache};
use crate::{Error, Options, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-process key-value store with a script cache.
///
/// Script runs and direct writes are serialized by one execution lock, and a
/// script's writes land in the keyspace under a single exclusive lock. No
/// reader ever sees a script half applied, and no two scripts interleave.
///
/// Scripts are cached by the hex SHA-256 of their body. The cache is bounded
/// by [`Options::script_cache_capacity`]; evicted or flushed handles fail
/// with [`Error::ScriptCacheMiss`] until the body is loaded again.
///
/// # Thread Safety
///
/// `MemoryStore` is `Send + Sync` and meant to be shared through `Arc`.
///
/// # Example
///
/// ```
/// use bounded_counter::store::{MemoryStore, Reply, ScriptStore};
/// use bounded_counter::Options;
///
/// # fn main() -> Result<(), bounded_counter::Error> {
/// let store = MemoryStore::new(&Options::default());
/// let handle = store.script_load("db.put(KEYS[1], ARGV[1]); return 1")?;
///
/// assert_eq!(store.eval_by_handle(&handle, &["greeting"], &["hello"])?, Reply::Int(1));
/// assert_eq!(store.get(b"greeting")?, Some(b"hello".to_vec()));
/// # Ok(())
/// # }
/// ```
pub struct MemoryStore {
    /// Counter values and any other data scripts touch
    keyspace: Arc<Keyspace>,

    /// Compiled-and-accepted script bodies by handle
    scripts: ScriptCache,

    /// Runs scripts against the keyspace
    executor: LuaExecutor,

    /// Serializes script runs and direct writes
    exec_lock: Mutex<()>,

    /// Set once the store has been closed
    closed: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store configured by `options`.
    pub fn new(options: &Options) -> Self {
        let keyspace = Arc::new(Keyspace::new());
        let executor = LuaExecutor::new(Arc::clone(&keyspace), options.script_timeout);
        Self {
            keyspace,
            scripts: ScriptCache::new(options.script_cache_capacity),
            executor,
            exec_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::invalid_state("store is closed"));
        }
        Ok(())
    }

    /// Stores `value` under `key`.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_open()?;
        let _guard = self.exec_lock.lock();
        self.keyspace.put(key, value);
        Ok(())
    }

    /// Removes `key`, returning true if it existed.
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        self.ensure_open()?;
        let _guard = self.exec_lock.lock();
        Ok(self.keyspace.delete(key))
    }

    /// Returns the number of keys held.
    pub fn len(&self) -> usize {
        self.keyspace.len()
    }

    /// Returns true if no keys are held.
    pub fn is_empty(&self) -> bool {
        self.keyspace.is_empty()
    }

    /// Returns true if `handle` is currently cached.
    pub fn script_exists(&self, handle: &ScriptHandle) -> bool {
        self.scripts.contains(handle)
    }

    /// Drops every cached script, as a restarted server would.
    pub fn script_flush(&self) {
        log::info!("Flushing {} cached scripts", self.scripts.len());
        self.scripts.clear();
    }

    /// Returns script cache statistics.
    pub fn script_cache_stats(&self) -> CacheStats {
        self.scripts.stats()
    }

    /// Returns true once [`ScriptStore::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl ScriptStore for MemoryStore {
    fn script_load(&self, body: &str) -> Result<ScriptHandle> {
        self.ensure_open()?;
        LuaExecutor::compile(body)?;

        let handle = ScriptHandle::digest(body);
        self.scripts.insert(handle.clone(), Arc::from(body));
        log::debug!("Loaded script {}", handle);
        Ok(handle)
    }

    fn eval_by_handle(&self, handle: &ScriptHandle, keys: &[&str], args: &[&str]) -> Result<Reply> {
        self.ensure_open()?;
        let body = self
            .scripts
            .get(handle)
            .ok_or_else(|| Error::ScriptCacheMiss(handle.clone()))?;

        let _guard = self.exec_lock.lock();
        self.executor.execute(&body, keys, args)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        Ok(self.keyspace.get(key))
    }

    fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            log::info!("Memory store closed");
        }
        Ok(())
    }
}
