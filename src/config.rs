//! Ledger configuration.

/// Retries allowed when an index changes between read and conditional write.
pub const DEFAULT_MAX_INDEX_RETRIES: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// How many times identifier generation re-reads and re-appends after a
    /// conflicting index write before giving up with
    /// [`Error::IndexContention`](crate::Error::IndexContention).
    pub max_index_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_index_retries: DEFAULT_MAX_INDEX_RETRIES,
        }
    }
}
