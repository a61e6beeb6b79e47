//! ScriptContext buffers the writes of one script run.
//!
//! Writes go to a [`WriteBatch`] plus an overlay map, so a script reads its
//! own uncommitted changes. On success the batch is applied to the keyspace
//! in one step; on failure the context is dropped and nothing is applied.
//!
//! ```text
//! db.put(key, value)  ->  overlay + WriteBatch
//! db.get(key)         ->  overlay first, then keyspace
//! db.delete(key)      ->  overlay tombstone + WriteBatch
//!
//! success:  WriteBatch -> Keyspace::write (one exclusive lock)
//! failure:  overlay + WriteBatch discarded
//! ```

use crate::store::{Keyspace, WriteBatch};
use std::collections::HashMap;
use std::sync::Arc;

/// Pending state of a key inside a script run.
#[derive(Debug, Clone)]
enum Pending {
    Put(Vec<u8>),
    Delete,
}

/// Write buffer with read-your-writes for a single script execution.
pub struct ScriptContext {
    keyspace: Arc<Keyspace>,
    batch: WriteBatch,
    overlay: HashMap<Vec<u8>, Pending>,
}

impl ScriptContext {
    /// Creates an empty context over `keyspace`.
    pub fn new(keyspace: Arc<Keyspace>) -> Self {
        Self { keyspace, batch: WriteBatch::new(), overlay: HashMap::new() }
    }

    /// Buffers a put.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.overlay.insert(key.to_vec(), Pending::Put(value.to_vec()));
        self.batch.put(key, value);
    }

    /// Reads `key`, seeing this run's own writes first.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.overlay.get(key) {
            Some(Pending::Put(value)) => Some(value.clone()),
            Some(Pending::Delete) => None,
            None => self.keyspace.get(key),
        }
    }

    /// Buffers a delete.
    pub fn delete(&mut self, key: &[u8]) {
        self.overlay.insert(key.to_vec(), Pending::Delete);
        self.batch.delete(key);
    }

    /// Applies all buffered writes to the keyspace atomically and returns how
    /// many there were. The context is empty afterwards.
    pub fn commit(&mut self) -> usize {
        let batch = self.take_batch();
        let writes = batch.len();
        self.keyspace.write(batch);
        writes
    }

    /// Returns the number of buffered writes.
    pub fn operation_count(&self) -> usize {
        self.batch.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Takes the batch out of the context, leaving it empty.
    fn take_batch(&mut self) -> WriteBatch {
        self.overlay.clear();
        std::mem::take(&mut self.batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Arc<Keyspace>, ScriptContext) {
        let keyspace = Arc::new(Keyspace::new());
        let ctx = ScriptContext::new(Arc::clone(&keyspace));
        (keyspace, ctx)
    }

    #[test]
    fn test_context_new() {
        let (_keyspace, ctx) = setup();
        assert!(ctx.is_empty());
        assert_eq!(ctx.operation_count(), 0);
    }

    #[test]
    fn test_context_reads_keyspace() {
        let (keyspace, ctx) = setup();
        keyspace.put(b"c", b"8");
        assert_eq!(ctx.get(b"c"), Some(b"8".to_vec()));
    }

    #[test]
    fn test_context_read_your_writes() {
        let (keyspace, mut ctx) = setup();
        keyspace.put(b"c", b"8");

        ctx.put(b"c", b"10");
        assert_eq!(ctx.get(b"c"), Some(b"10".to_vec()));
        assert_eq!(keyspace.get(b"c"), Some(b"8".to_vec()));

        ctx.delete(b"c");
        assert_eq!(ctx.get(b"c"), None);
    }

    #[test]
    fn test_context_commit() {
        let (keyspace, mut ctx) = setup();
        ctx.put(b"a", b"1");
        ctx.put(b"b", b"2");
        assert_eq!(ctx.commit(), 2);

        assert_eq!(keyspace.get(b"a"), Some(b"1".to_vec()));
        assert_eq!(keyspace.get(b"b"), Some(b"2".to_vec()));
        assert!(ctx.is_empty());
        assert_eq!(ctx.commit(), 0);
    }

    #[test]
    fn test_context_drop_discards_writes() {
        let (keyspace, mut ctx) = setup();
        ctx.put(b"a", b"1");
        drop(ctx);

        assert_eq!(keyspace.get(b"a"), None);
    }

    #[test]
    fn test_take_batch_resets_context() {
        let (keyspace, mut ctx) = setup();
        ctx.put(b"a", b"1");

        let batch = ctx.take_batch();
        assert_eq!(batch.len(), 1);
        assert!(ctx.is_empty());
        assert_eq!(ctx.get(b"a"), None);

        keyspace.write(batch);
        assert_eq!(ctx.get(b"a"), Some(b"1".to_vec()));
    }
}
