//! In-memory keyspace backing [`MemoryStore`](crate::store::MemoryStore).

use super::write_batch::{WriteBatch, WriteOp};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Key-value map shared by direct operations and script contexts.
///
/// Readers take a shared lock per lookup. A [`WriteBatch`] is applied under
/// a single exclusive lock, so its writes become visible together.
#[derive(Debug, Default)]
pub struct Keyspace {
    data: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl Keyspace {
    /// Creates an empty keyspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    /// Stores `value` under `key`.
    pub fn put(&self, key: &[u8], value: &[u8]) {
        self.data.write().insert(key.to_vec(), value.to_vec());
    }

    /// Removes `key`, returning true if it was present.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.data.write().remove(key).is_some()
    }

    /// Applies every write in `batch` atomically.
    pub fn write(&self, batch: WriteBatch) {
        if batch.is_empty() {
            return;
        }

        let mut data = self.data.write();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { key, value } => {
                    data.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the keyspace holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
