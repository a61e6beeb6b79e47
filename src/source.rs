//! Script sources.
//!
//! A [`ScriptSource`] says where a script body comes from. Bodies are read
//! once, when the registry registers them with the store.

use crate::Result;
use std::path::{Path, PathBuf};

/// The bounded-increment script shipped with the crate.
pub const INCR_WITH_LIMIT_SCRIPT: &str = include_str!("../scripts/incr_limit.lua");

/// Location of a script body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// Body held in memory.
    Inline(String),
    /// Body read from a file, absolute or relative to the working directory.
    File(PathBuf),
}

impl ScriptSource {
    /// Creates an in-memory source.
    pub fn inline(body: impl Into<String>) -> Self {
        ScriptSource::Inline(body.into())
    }

    /// Creates a file-backed source.
    pub fn file(path: impl AsRef<Path>) -> Self {
        ScriptSource::File(path.as_ref().to_path_buf())
    }

    /// The embedded bounded-increment script.
    pub fn default_counter() -> Self {
        ScriptSource::Inline(INCR_WITH_LIMIT_SCRIPT.to_string())
    }

    /// Reads the script body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if a file source cannot be read.
    pub fn read(&self) -> Result<String> {
        match self {
            ScriptSource::Inline(body) => Ok(body.clone()),
            ScriptSource::File(path) => {
                log::debug!("Reading script from {:?}", path);
                Ok(std::fs::read_to_string(path)?)
            }
        }
    }
}
