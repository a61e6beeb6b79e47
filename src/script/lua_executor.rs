//! LuaExecutor runs store scripts against a keyspace.
//!
//! Each run gets a fresh Lua VM with three globals:
//!
//! - `KEYS`: the key arguments, 1-indexed
//! - `ARGV`: the remaining arguments, 1-indexed
//! - `db`: `db.get(key)`, `db.put(key, value)`, `db.delete(key)`
//!
//! Writes are buffered in a [`ScriptContext`] and applied only if the script
//! returns normally. The caller is responsible for serializing runs; see
//! [`MemoryStore`](crate::store::MemoryStore).

use crate::script::context::ScriptContext;
use crate::store::{Keyspace, Reply};
use crate::{Error, Result};
use mlua::Lua;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Executes Lua scripts with buffered, all-or-nothing writes.
///
/// # Example
///
/// ```
/// use bounded_counter::script::LuaExecutor;
/// use bounded_counter::store::{Keyspace, Reply};
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), bounded_counter::Error> {
/// let keyspace = Arc::new(Keyspace::new());
/// let executor = LuaExecutor::new(Arc::clone(&keyspace), None);
///
/// let reply = executor.execute(
///     r#"
///         db.put(KEYS[1], ARGV[1])
///         return tonumber(ARGV[1])
///     "#,
///     &["counter"],
///     &["7"],
/// )?;
///
/// assert_eq!(reply, Reply::Int(7));
/// assert_eq!(keyspace.get(b"counter"), Some(b"7".to_vec()));
/// # Ok(())
/// # }
/// ```
pub struct LuaExecutor {
    /// Keyspace scripts read from and commit to
    keyspace: Arc<Keyspace>,

    /// Maximum script execution time
    timeout: Option<Duration>,
}

/// Keyspace API exposed to Lua scripts as the `db` table
struct LuaDbApi;

impl LuaDbApi {
    fn create_api_table<'lua>(
        lua: &'lua Lua,
        context: Arc<Mutex<ScriptContext>>,
    ) -> mlua::Result<mlua::Table<'lua>> {
        let table = lua.create_table()?;

        let ctx_put = Arc::clone(&context);
        let put_fn =
            lua.create_function(move |_, (key, value): (mlua::String<'_>, mlua::String<'_>)| {
                ctx_put.lock().put(key.as_bytes(), value.as_bytes());
                Ok(())
            })?;
        table.set("put", put_fn)?;

        let ctx_get = Arc::clone(&context);
        let get_fn = lua.create_function(move |lua, key: mlua::String<'_>| {
            match ctx_get.lock().get(key.as_bytes()) {
                Some(value) => Ok(mlua::Value::String(lua.create_string(&value)?)),
                None => Ok(mlua::Value::Nil),
            }
        })?;
        table.set("get", get_fn)?;

        let ctx_delete = Arc::clone(&context);
        let delete_fn = lua.create_function(move |_, key: mlua::String<'_>| {
            ctx_delete.lock().delete(key.as_bytes());
            Ok(())
        })?;
        table.set("delete", delete_fn)?;

        Ok(table)
    }
}

/// Converts a script's return value into a [`Reply`].
///
/// `nil` and `false` become [`Reply::Nil`], `true` becomes 1, floats are
/// truncated, and a table with an `err` field is raised as an error.
fn reply_from_lua(value: mlua::Value<'_>) -> mlua::Result<Reply> {
    match value {
        mlua::Value::Nil | mlua::Value::Boolean(false) => Ok(Reply::Nil),
        mlua::Value::Boolean(true) => Ok(Reply::Int(1)),
        mlua::Value::Integer(i) => Ok(Reply::Int(i)),
        mlua::Value::Number(n) => Ok(Reply::Int(n as i64)),
        mlua::Value::String(s) => Ok(Reply::Bulk(s.as_bytes().to_vec())),
        mlua::Value::Table(table) => {
            if let Some(msg) = table.get::<_, Option<String>>("err")? {
                return Err(mlua::Error::RuntimeError(msg));
            }
            let items = table
                .sequence_values::<mlua::Value<'_>>()
                .map(|item| item.and_then(reply_from_lua))
                .collect::<mlua::Result<Vec<_>>>()?;
            Ok(Reply::Array(items))
        }
        other => Err(mlua::Error::RuntimeError(format!(
            "unsupported script return type: {}",
            other.type_name()
        ))),
    }
}

impl LuaExecutor {
    /// Creates a new LuaExecutor.
    ///
    /// # Arguments
    ///
    /// * `keyspace` - Keyspace scripts operate on
    /// * `timeout` - Optional maximum execution time for scripts
    pub fn new(keyspace: Arc<Keyspace>, timeout: Option<Duration>) -> Self {
        Self { keyspace, timeout }
    }

    /// Checks that `body` is a syntactically valid Lua chunk without running it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScriptCompile`] with the parser's message.
    pub fn compile(body: &str) -> Result<()> {
        let lua = Lua::new();
        let compiled = lua.load(body).into_function().map(|_| ());
        compiled.map_err(|e| Error::ScriptCompile(e.to_string()))
    }

    /// Executes a script and returns its converted result.
    ///
    /// Writes made by the script are committed only if it returns normally.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreExecution`] if the script:
    /// - has syntax errors
    /// - raises a runtime error or returns an `{err = ...}` table
    /// - exceeds the timeout
    pub fn execute(&self, body: &str, keys: &[&str], args: &[&str]) -> Result<Reply> {
        let start_time = Instant::now();

        let lua = Lua::new();
        let context = Arc::new(Mutex::new(ScriptContext::new(Arc::clone(&self.keyspace))));

        if let Some(timeout) = self.timeout {
            let timeout_start = start_time;
            lua.set_hook(
                mlua::HookTriggers {
                    every_nth_instruction: Some(1000),
                    ..Default::default()
                },
                move |_lua, _debug| {
                    if timeout_start.elapsed() > timeout {
                        Err(mlua::Error::RuntimeError("Script execution timeout".to_string()))
                    } else {
                        Ok(())
                    }
                },
            );
        }

        let result = (|| -> mlua::Result<Reply> {
            let globals = lua.globals();
            globals.set("KEYS", lua.create_sequence_from(keys.iter().copied())?)?;
            globals.set("ARGV", lua.create_sequence_from(args.iter().copied())?)?;
            globals.set("db", LuaDbApi::create_api_table(&lua, Arc::clone(&context))?)?;

            let value = lua.load(body).eval::<mlua::Value<'_>>()?;
            reply_from_lua(value)
        })();

        match result {
            Ok(reply) => {
                let writes = context.lock().commit();

                log::debug!(
                    "Lua script committed {} writes in {:?}",
                    writes,
                    start_time.elapsed()
                );

                Ok(reply)
            }
            Err(e) => {
                // Buffered writes are dropped with the context
                log::warn!("Lua script failed: {}", e);
                Err(Error::store_execution(format!("Lua script failed: {}", e)))
            }
        }
    }

    /// Sets the timeout for script execution.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Gets the current timeout setting.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
