//! Indexed accessor over a flat key-value store.
//!
//! Owns the four primitives every ledger operation is built from:
//! - identifier generation, which appends to an entity type's index
//! - record `put` / `get` by identifier
//! - enumeration of every record an index points at
//! - soft reset of all indexes
//!
//! Identifier generation and payload writes are separate steps: the
//! accessor never writes a payload as part of [`IndexedAccessor::generate_id`].

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::LedgerConfig;
use crate::error::{Error, Result};
use crate::index::{EntityType, IndexRegistry};
use crate::stores::KvStore;

/// One item of an enumeration. A record that failed to decode is kept in
/// place as the zero-valued entity, tagged with why it failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Listed<T> {
    Record(T),
    Placeholder { id: String, reason: String, record: T },
}

impl<T> Listed<T> {
    pub fn record(&self) -> &T {
        match self {
            Listed::Record(record) | Listed::Placeholder { record, .. } => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            Listed::Record(record) | Listed::Placeholder { record, .. } => record,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Listed::Placeholder { .. })
    }
}

pub struct IndexedAccessor<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: KvStore> IndexedAccessor<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LedgerConfig::default())
    }

    pub fn with_config(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn indexes(&self) -> IndexRegistry<'_, S> {
        IndexRegistry::new(&self.store)
    }

    /// Appends an identifier to `entity`'s index and returns it.
    ///
    /// With `create` the identifier is `supplied` followed by the index
    /// length plus one; without it `supplied` is used verbatim, and is not
    /// appended again if the index already holds it.
    ///
    /// The index write is conditional on the index being unchanged since it
    /// was read. On a conflict the whole read-derive-append cycle runs again,
    /// up to the configured retry budget.
    pub fn generate_id(&self, entity: EntityType, supplied: &str, create: bool) -> Result<String> {
        let indexes = self.indexes();
        let attempts = self.config.max_index_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let (raw, mut ids) = indexes.read_raw(entity)?;
            let id = if create {
                format!("{}{}", supplied, ids.len() + 1)
            } else {
                supplied.to_owned()
            };
            if EntityType::is_index_key(&id) {
                return Err(Error::ReservedKey(id));
            }
            if !create && ids.contains(&id) {
                debug!(index = entity.index_key(), id = %id, "identifier already indexed");
                return Ok(id);
            }

            ids.push(id.clone());
            match indexes.write_if_unchanged(entity, raw.as_deref(), &ids)? {
                Ok(()) => {
                    debug!(index = entity.index_key(), len = ids.len(), "appended identifier");
                    return Ok(id);
                }
                Err(conflict) => {
                    debug!(index = entity.index_key(), attempt, %conflict, "index changed, retrying");
                }
            }
        }

        warn!(index = entity.index_key(), attempts, "giving up on contended index");
        Err(Error::IndexContention {
            index: entity.index_key(),
            attempts,
        })
    }

    /// Overwrites the payload at `id`. Indexes are untouched.
    pub fn put(&self, id: &str, payload: impl Into<Bytes>) -> Result<()> {
        if EntityType::is_index_key(id) {
            return Err(Error::ReservedKey(id.to_owned()));
        }
        self.store.put(id, payload.into())?;
        Ok(())
    }

    /// Reads the payload at `id`. A missing record is an empty payload.
    pub fn get(&self, id: &str) -> Result<Bytes> {
        Ok(self.store.get(id)?.unwrap_or_default())
    }

    /// Reads and decodes every record in `entity`'s index, in index order.
    ///
    /// Fails only if the index is unreadable or the store fails. A record
    /// that does not decode as `T` (including a missing one) becomes a
    /// [`Listed::Placeholder`].
    pub fn list_all<T>(&self, entity: EntityType) -> Result<Vec<Listed<T>>>
    where
        T: DeserializeOwned + Default,
    {
        let ids = self.indexes().read(entity)?;
        let mut listed = Vec::with_capacity(ids.len());
        for id in ids {
            let payload = self.get(&id)?;
            match serde_json::from_slice::<T>(&payload) {
                Ok(record) => listed.push(Listed::Record(record)),
                Err(err) => {
                    warn!(%entity, id = %id, error = %err, "undecodable record listed as placeholder");
                    listed.push(Listed::Placeholder {
                        id,
                        reason: err.to_string(),
                        record: T::default(),
                    });
                }
            }
        }
        Ok(listed)
    }

    /// Empties every index. Records stay in the store, reachable by key only.
    pub fn reset_all(&self) -> Result<()> {
        self.indexes().reset()
    }
}
