//! Script-evaluating key-value stores.
//!
//! The [`ScriptStore`] trait is the connection the registry and counters
//! talk to. It covers exactly what server-side execution needs:
//!
//! - **Load**: upload a script body, get back a content-derived handle
//! - **Evaluate**: run a cached script by handle against keys and arguments
//! - **Cache miss**: report a forgotten handle as [`Error::ScriptCacheMiss`]
//!
//! [`MemoryStore`] is the bundled in-process implementation. It executes
//! Lua scripts atomically with respect to every other operation on it.
//!
//! [`Error::ScriptCacheMiss`]: crate::Error::ScriptCacheMiss

mod keyspace;
mod memory;
mod write_batch;

pub use keyspace::Keyspace;
pub use memory::MemoryStore;
pub use write_batch::{WriteBatch, WriteOp};

use crate::Result;
use sha2::{Digest, Sha256};
use std::fmt;

/// Content-derived reference to a script registered with a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptHandle(String);

impl ScriptHandle {
    /// Wraps a handle issued by a store.
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Computes the handle for a script body (hex SHA-256 of its text).
    pub fn digest(body: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(body.as_bytes())))
    }

    /// Returns the handle as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value returned by a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// No value (Lua `nil` or `false`).
    Nil,
    /// An integer.
    Int(i64),
    /// A string.
    Bulk(Vec<u8>),
    /// A sequence of values.
    Array(Vec<Reply>),
}

/// A store connection able to cache and evaluate scripts.
pub trait ScriptStore: Send + Sync {
    /// Uploads a script body and returns its handle.
    ///
    /// Fails with [`crate::Error::ScriptCompile`] if the body is malformed.
    fn script_load(&self, body: &str) -> Result<ScriptHandle>;

    /// Evaluates the script cached under `handle`.
    ///
    /// Fails with [`crate::Error::ScriptCacheMiss`] if the store no longer
    /// holds the script, and [`crate::Error::StoreExecution`] if it fails.
    fn eval_by_handle(&self, handle: &ScriptHandle, keys: &[&str], args: &[&str]) -> Result<Reply>;

    /// Reads the raw value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Releases the connection. Later calls fail.
    fn close(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_content_derived() {
        let a = ScriptHandle::digest("return 1");
        let b = ScriptHandle::digest("return 1");
        let c = ScriptHandle::digest("return 2");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
