//! Error types for bounded counters and the script registry.

use crate::store::ScriptHandle;
use std::io;
use thiserror::Error;

/// The result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for registry, store and counter operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A script body could not be read or was rejected by the store.
    #[error("Failed to load script {name}: {source}")]
    ScriptLoad {
        /// The identifier the script was being registered under.
        name: String,
        /// The underlying cause.
        #[source]
        source: Box<Error>,
    },

    /// An identifier was used before it was successfully registered.
    #[error("Unknown script: {0}")]
    UnknownScript(String),

    /// The store no longer holds the script for this handle.
    #[error("Script not cached by store: {0}")]
    ScriptCacheMiss(ScriptHandle),

    /// The store could not compile a script body.
    #[error("Script compilation failed: {0}")]
    ScriptCompile(String),

    /// The store failed while executing a script.
    #[error("Store execution failed: {0}")]
    StoreExecution(String),

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The store or counter is in an invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wraps `source` as a load failure for the script registered under `name`.
    pub fn script_load(name: impl Into<String>, source: Error) -> Self {
        Error::ScriptLoad { name: name.into(), source: Box::new(source) }
    }

    /// Creates a new unknown script error.
    pub fn unknown_script(name: impl Into<String>) -> Self {
        Error::UnknownScript(name.into())
    }

    /// Creates a new store execution error.
    pub fn store_execution(msg: impl Into<String>) -> Self {
        Error::StoreExecution(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a new invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Creates a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Returns true if the store reported the script handle as not cached.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Error::ScriptCacheMiss(_))
    }
}
