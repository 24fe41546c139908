use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use super::{KvStore, StoreError};

/// In-memory key-value store.
///
/// Cheap to clone; clones share the same map, so a clone can be handed to
/// another thread as a second connection to the same ledger state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.data.write().insert(key.to_owned(), value);
        Ok(())
    }

    fn compare_and_put(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: Bytes,
    ) -> Result<(), StoreError> {
        // Hold the write lock across the comparison so no put can slip in between.
        let mut data = self.data.write();
        let matches = match (expected, data.get(key)) {
            (None, None) => true,
            (Some(expected), Some(current)) => expected == &current[..],
            _ => false,
        };
        if !matches {
            return Err(StoreError::conflict(key));
        }
        data.insert(key.to_owned(), value);
        Ok(())
    }
}
