//! Store-side Lua scripting.
//!
//! This module holds the machinery a store needs to run scripts atomically:
//!
//! - **ScriptCache**: LRU map from handle to script body
//! - **ScriptContext**: buffers a run's writes with read-your-writes
//! - **LuaExecutor**: runs a body with `KEYS`, `ARGV` and the `db` API
//!
//! A failed script leaves the keyspace untouched; a successful one commits
//! all of its writes together.

pub mod cache;
pub mod context;
pub mod lua_executor;

pub use cache::{CacheStats, ScriptCache};
pub use context::ScriptContext;
pub use lua_executor::LuaExecutor;
