//! Fault-injecting store for exercising error paths.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;

use super::{KvStore, MemoryStore, StoreError};

/// Wraps a [`MemoryStore`] and fails or interferes on request.
#[derive(Default)]
pub(crate) struct FaultyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    /// Writes still allowed before every later write fails.
    writes_before_failure: Mutex<Option<u32>>,
    /// Remaining conditional writes to reject outright.
    forced_conflicts: AtomicU32,
    /// Write applied just before the next conditional write, as if another
    /// caller committed first.
    interleaved: Mutex<Option<(String, Bytes)>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Lets `count` more writes through, then fails every write after them.
    pub fn fail_writes_after(&self, count: u32) {
        *self.writes_before_failure.lock() = Some(count);
    }

    fn check_write(&self, key: &str) -> Result<(), StoreError> {
        let mut budget = self.writes_before_failure.lock();
        let exhausted = match budget.as_mut() {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        };
        if exhausted || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(key, "injected write failure"));
        }
        Ok(())
    }

    pub fn force_conflicts(&self, count: u32) {
        self.forced_conflicts.store(count, Ordering::SeqCst);
    }

    pub fn interleave_write(&self, key: &str, value: impl Into<Bytes>) {
        *self.interleaved.lock() = Some((key.to_owned(), value.into()));
    }
}

impl KvStore for FaultyStore {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(key, "injected read failure"));
        }
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.check_write(key)?;
        self.inner.put(key, value)
    }

    fn compare_and_put(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: Bytes,
    ) -> Result<(), StoreError> {
        self.check_write(key)?;
        if let Some((other_key, other_value)) = self.interleaved.lock().take() {
            self.inner.put(&other_key, other_value)?;
        }
        let forced = self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if forced {
            return Err(StoreError::conflict(key));
        }
        self.inner.compare_and_put(key, expected, value)
    }
}
