//! # Bounded counters evaluated inside a key-value store
//!
//! This crate increments named counters without ever letting them cross a
//! limit. The read, the check and the write run as one Lua script inside the
//! store, so concurrent callers cannot race each other into overshooting.
//!
//! ## Architecture
//!
//! - **Store** ([`store`]): a [`ScriptStore`] caches scripts by content
//!   digest and evaluates them atomically. [`MemoryStore`] is the bundled
//!   in-process implementation
//! - **Scripting** ([`script`]): script cache, write buffering and the Lua
//!   executor used by [`MemoryStore`]
//! - **Registry** ([`registry`]): maps script identifiers to store handles and
//!   reloads a script once if the store has forgotten it
//! - **Counter** ([`counter`]): the bounded-increment operation
//!
//! ## Example Usage
//!
//! ```rust
//! use bounded_counter::{BoundedCounter, IncrOutcome, Options};
//!
//! # fn main() -> Result<(), bounded_counter::Error> {
//! let counter = BoundedCounter::open(Options::default())?;
//! counter.init()?;
//!
//! // Single-step increment, at most 20
//! match counter.incr_with_limit("count", 20)? {
//!     IncrOutcome::Value(v) => println!("count is now {}", v),
//!     IncrOutcome::LimitExceeded => println!("limit reached"),
//! }
//!
//! counter.quit()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod config;
pub mod counter;
pub mod error;
pub mod registry;
pub mod script;
pub mod source;
pub mod store;

// Re-exports
pub use config::Options;
pub use counter::{BoundedCounter, IncrOutcome, INCR_WITH_LIMIT};
pub use error::{Error, Result};
pub use registry::ScriptRegistry;
pub use source::{ScriptSource, INCR_WITH_LIMIT_SCRIPT};
pub use store::{MemoryStore, Reply, ScriptHandle, ScriptStore};
