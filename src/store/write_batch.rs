//! Buffered writes produced by one script run.
//!
//! A script never touches the keyspace directly. Its writes are recorded in
//! a [`WriteBatch`] and applied in one step by [`Keyspace::write`] once the
//! script returns, so readers see either none or all of them.
//!
//! [`Keyspace::write`]: crate::store::Keyspace::write

/// A single buffered write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Store `value` under `key`.
    Put {
        /// Key to write
        key: Vec<u8>,
        /// New value
        value: Vec<u8>,
    },
    /// Remove `key`.
    Delete {
        /// Key to remove
        key: Vec<u8>,
    },
}

/// Ordered list of writes applied together.
#[derive(Debug, Default)]
pub struct WriteBatch {
    operations: Vec<WriteOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self { operations: Vec::new() }
    }

    /// Records a put.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.operations.push(WriteOp::Put { key: key.to_vec(), value: value.to_vec() });
    }

    /// Records a delete.
    pub fn delete(&mut self, key: &[u8]) {
        self.operations.push(WriteOp::Delete { key: key.to_vec() });
    }

    /// Returns the number of recorded writes.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Consumes the batch, yielding writes in the order they were recorded.
    pub(crate) fn into_ops(self) -> impl Iterator<Item = WriteOp> {
        self.operations.into_iter()
    }
}
