//! Key-value storage underneath the ledger. Provides:
//! - The adapter contract every backing store implements ([`KvStore`])
//! - An in-memory store for tests and local replays ([`MemoryStore`])
//!
//! The contract is deliberately flat: point reads, point writes and a single
//! conditional write. There are no scans, which is why the accessor keeps its
//! own index lists.

mod memory;
#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not serve the read or write.
    #[error("store unavailable for {key}: {message}")]
    Unavailable { key: String, message: String },

    /// A conditional write found a different value than expected.
    #[error("conflicting write on {key}")]
    Conflict { key: String },
}

impl StoreError {
    pub fn unavailable(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn conflict(key: impl Into<String>) -> Self {
        Self::Conflict { key: key.into() }
    }
}

/// Flat key-value adapter. Each call is atomic and immediately visible to
/// the next call on the same store.
pub trait KvStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Unconditionally replaces the value at `key`.
    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// Writes `value` only if the current value at `key` is byte-for-byte
    /// `expected` (`None` meaning the key is absent). Fails with
    /// [`StoreError::Conflict`] otherwise.
    fn compare_and_put(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: Bytes,
    ) -> Result<(), StoreError>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn compare_and_put(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: Bytes,
    ) -> Result<(), StoreError> {
        (**self).compare_and_put(key, expected, value)
    }
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn compare_and_put(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: Bytes,
    ) -> Result<(), StoreError> {
        (**self).compare_and_put(key, expected, value)
    }
}
