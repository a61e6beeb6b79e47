//! Configuration options for bounded counters and the bundled store.

use crate::source::ScriptSource;
use std::time::Duration;

/// Default number of scripts the bundled store keeps cached.
pub const DEFAULT_SCRIPT_CACHE_CAPACITY: usize = 1024;

/// Configuration options for opening a counter with its own store.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum number of compiled scripts held by the store's script cache.
    /// Least recently used scripts are evicted beyond this. 0 means unbounded.
    /// Default: 1024
    pub script_cache_capacity: usize,

    /// Maximum execution time for a single script.
    /// Default: None (no limit)
    pub script_timeout: Option<Duration>,

    /// Where the bounded-increment script body is read from.
    /// Default: the embedded script
    pub counter_script: ScriptSource,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            script_cache_capacity: DEFAULT_SCRIPT_CACHE_CAPACITY,
            script_timeout: None,
            counter_script: ScriptSource::default_counter(),
        }
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the script cache capacity.
    pub fn script_cache_capacity(mut self, capacity: usize) -> Self {
        self.script_cache_capacity = capacity;
        self
    }

    /// Sets the per-script execution timeout.
    pub fn script_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.script_timeout = timeout;
        self
    }

    /// Sets the source of the bounded-increment script.
    pub fn counter_script(mut self, source: ScriptSource) -> Self {
        self.counter_script = source;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.script_timeout == Some(Duration::ZERO) {
            return Err(crate::Error::invalid_argument("script_timeout must be > 0"));
        }
        if let ScriptSource::Inline(body) = &self.counter_script {
            if body.trim().is_empty() {
                return Err(crate::Error::invalid_argument("counter_script must not be empty"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert_eq!(opts.script_cache_capacity, DEFAULT_SCRIPT_CACHE_CAPACITY);
        assert!(opts.script_timeout.is_none());
        assert_eq!(opts.counter_script, ScriptSource::default_counter());
    }

    #[test]
    fn test_options_builder() {
        let opts = Options::new()
            .script_cache_capacity(2)
            .script_timeout(Some(Duration::from_secs(1)))
            .counter_script(ScriptSource::file("lua/incr_limit.lua"));

        assert_eq!(opts.script_cache_capacity, 2);
        assert_eq!(opts.script_timeout, Some(Duration::from_secs(1)));
        assert!(matches!(opts.counter_script, ScriptSource::File(_)));
    }

    #[test]
    fn test_options_validation() {
        let mut opts = Options::default();
        assert!(opts.validate().is_ok());

        opts.script_timeout = Some(Duration::ZERO);
        assert!(opts.validate().is_err());

        opts.script_timeout = None;
        opts.counter_script = ScriptSource::inline("   ");
        assert!(opts.validate().is_err());
    }
}
