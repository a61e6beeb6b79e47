//! Script registry: identifier to handle mapping.
//!
//! The registry uploads script bodies to a [`ScriptStore`] and remembers the
//! handle the store returned, so later calls send the handle instead of the
//! body. It also remembers the body itself, which lets it upload the script
//! again when the store reports the handle as no longer cached.
//!
//! # Lifecycle
//!
//! ```text
//! new()            ->  empty
//! register*()      ->  populated (identifier -> handle, body)
//! clear() / drop   ->  empty / discarded
//! ```
//!
//! # Concurrency
//!
//! Lookups take a shared lock. Registrations of the same identifier are
//! serialized through a per-identifier lock (last writer wins); different
//! identifiers register independently.

use crate::source::ScriptSource;
use crate::store::{Reply, ScriptHandle, ScriptStore};
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// A script the store has accepted.
#[derive(Debug, Clone)]
struct RegisteredScript {
    handle: ScriptHandle,
    body: Arc<str>,
}

/// Maps script identifiers to live store handles.
pub struct ScriptRegistry<S: ScriptStore> {
    store: Arc<S>,
    scripts: RwLock<HashMap<String, RegisteredScript>>,
    name_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: ScriptStore> ScriptRegistry<S> {
    /// Creates an empty registry over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            scripts: RwLock::new(HashMap::new()),
            name_locks: Mutex::new(HashMap::new()),
        }
    }

    fn name_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.name_locks.lock();
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Uploads `body` to the store and records its handle under `name`.
    ///
    /// The mapping is only updated if the store accepts the body.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `name` or `body` is empty
    /// - [`Error::ScriptLoad`] if the store rejects the body or fails
    pub fn register(&self, name: &str, body: &str) -> Result<ScriptHandle> {
        if name.is_empty() {
            return Err(Error::invalid_argument("script name must not be empty"));
        }
        if body.trim().is_empty() {
            return Err(Error::invalid_argument(format!("script {} has an empty body", name)));
        }

        let lock = self.name_lock(name);
        let result = {
            let _guard = lock.lock();
            self.load_and_record(name, body)
        };
        self.release_name_lock(name, lock);
        result
    }

    fn load_and_record(&self, name: &str, body: &str) -> Result<ScriptHandle> {
        let handle = self.store.script_load(body).map_err(|e| Error::script_load(name, e))?;
        log::debug!("Registered script {} as {}", name, handle);

        self.scripts.write().insert(
            name.to_string(),
            RegisteredScript { handle: handle.clone(), body: Arc::from(body) },
        );
        Ok(handle)
    }

    /// Drops the lock entry for `name` once no other registration holds it.
    ///
    /// Clones are only handed out and dropped under `name_locks`, so a count of
    /// two (map plus `lock`) means nobody else is waiting on it.
    fn release_name_lock(&self, name: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.name_locks.lock();
        let unshared = Arc::strong_count(&lock) == 2;
        if unshared && locks.get(name).is_some_and(|held| Arc::ptr_eq(held, &lock)) {
            locks.remove(name);
        }
        drop(lock);
    }

    /// Reads and registers each source in order.
    ///
    /// Stops at the first failure. Scripts registered before it keep their
    /// handles.
    ///
    /// # Errors
    ///
    /// [`Error::ScriptLoad`] naming the identifier that failed, whether it
    /// failed to read or the store rejected it.
    pub fn register_all<I, N>(&self, sources: I) -> Result<Vec<ScriptHandle>>
    where
        I: IntoIterator<Item = (N, ScriptSource)>,
        N: AsRef<str>,
    {
        let mut handles = Vec::new();
        for (name, source) in sources {
            let name = name.as_ref();
            let body = source.read().map_err(|e| Error::script_load(name, e))?;
            handles.push(self.register(name, &body)?);
        }
        Ok(handles)
    }

    /// Returns the handle registered under `name`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownScript`] if `name` was never registered.
    pub fn handle_for(&self, name: &str) -> Result<ScriptHandle> {
        self.scripts
            .read()
            .get(name)
            .map(|script| script.handle.clone())
            .ok_or_else(|| Error::unknown_script(name))
    }

    /// Uploads the remembered body for `name` again and records the new handle.
    pub fn reload(&self, name: &str) -> Result<ScriptHandle> {
        let body = self
            .scripts
            .read()
            .get(name)
            .map(|script| Arc::clone(&script.body))
            .ok_or_else(|| Error::unknown_script(name))?;
        self.register(name, &body)
    }

    /// Evaluates the script registered under `name`.
    ///
    /// If the store has lost the script, it is reloaded and the call retried
    /// once. A failed reload or a second miss is reported as
    /// [`Error::StoreExecution`].
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownScript`] if `name` was never registered
    /// - [`Error::StoreExecution`] for any store failure, including a
    ///   rejected reload
    pub fn invoke(&self, name: &str, keys: &[&str], args: &[&str]) -> Result<Reply> {
        let handle = self.handle_for(name)?;

        match self.store.eval_by_handle(&handle, keys, args) {
            Err(Error::ScriptCacheMiss(missing)) => {
                log::warn!("Script {} ({}) not cached by store, reloading", name, missing);
                let handle = self.reload(name).map_err(into_execution_error)?;
                match self.store.eval_by_handle(&handle, keys, args) {
                    Err(Error::ScriptCacheMiss(missing)) => Err(Error::store_execution(format!(
                        "script {} ({}) missing from store after reload",
                        name, missing
                    ))),
                    other => other.map_err(into_execution_error),
                }
            }
            other => other.map_err(into_execution_error),
        }
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.scripts.read().contains_key(name)
    }

    /// Returns the number of registered scripts.
    pub fn len(&self) -> usize {
        self.scripts.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every registration.
    ///
    /// In-flight registrations keep their per-identifier locks.
    pub fn clear(&self) {
        self.scripts.write().clear();
    }

    /// Returns the store this registry uploads to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

fn into_execution_error(err: Error) -> Error {
    match err {
        Error::StoreExecution(_) => err,
        other => Error::store_execution(other.to_string()),
    }
}
