//! Index registry: one ordered identifier list per entity type.
//!
//! The store cannot enumerate keys, so every entity type keeps a JSON array
//! of its record identifiers under a well-known key. The lists are
//! append-only; the only way to shrink one is a reset back to empty.

use std::fmt;

use bytes::Bytes;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::stores::{KvStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    User,
    Order,
    Transaction,
}

impl EntityType {
    /// Every registered entity type, in the order reset walks them.
    pub const ALL: [EntityType; 3] = [
        EntityType::User,
        EntityType::Transaction,
        EntityType::Order,
    ];

    pub fn index_key(self) -> &'static str {
        match self {
            EntityType::User => "_users",
            EntityType::Order => "_orders",
            EntityType::Transaction => "_transactions",
        }
    }

    /// True if `key` is one of the registry's own keys.
    pub fn is_index_key(key: &str) -> bool {
        Self::ALL.iter().any(|entity| entity.index_key() == key)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityType::User => "user",
            EntityType::Order => "order",
            EntityType::Transaction => "transaction",
        };
        f.write_str(name)
    }
}

/// Decodes stored index bytes. Absent and zero-length values are the empty
/// list, as is a JSON `null`.
pub(crate) fn decode_index(key: &str, bytes: Option<&[u8]>) -> Result<Vec<String>> {
    match bytes {
        None => Ok(Vec::new()),
        Some(bytes) if bytes.is_empty() => Ok(Vec::new()),
        Some(bytes) => serde_json::from_slice::<Option<Vec<String>>>(bytes)
            .map(Option::unwrap_or_default)
            .map_err(|source| Error::decode(key, source)),
    }
}

pub(crate) fn encode_index(key: &str, ids: &[String]) -> Result<Bytes> {
    serde_json::to_vec(ids)
        .map(Bytes::from)
        .map_err(|source| Error::encode(key, source))
}

/// Read/write access to the index lists of one store.
pub struct IndexRegistry<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: KvStore + ?Sized> IndexRegistry<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn read(&self, entity: EntityType) -> Result<Vec<String>> {
        self.read_raw(entity).map(|(_, ids)| ids)
    }

    /// Returns the stored bytes alongside the decoded list, so a caller can
    /// make a later write conditional on the list being unchanged.
    pub(crate) fn read_raw(&self, entity: EntityType) -> Result<(Option<Bytes>, Vec<String>)> {
        let key = entity.index_key();
        let raw = self.store.get(key)?;
        let ids = decode_index(key, raw.as_deref())?;
        debug!(index = key, len = ids.len(), "read index");
        Ok((raw, ids))
    }

    pub fn write(&self, entity: EntityType, ids: &[String]) -> Result<()> {
        let key = entity.index_key();
        self.store.put(key, encode_index(key, ids)?)?;
        debug!(index = key, len = ids.len(), "wrote index");
        Ok(())
    }

    /// Writes `ids` only if the index still holds `expected`. A conflict is
    /// reported as the raw [`StoreError::Conflict`] so the caller can retry.
    pub(crate) fn write_if_unchanged(
        &self,
        entity: EntityType,
        expected: Option<&[u8]>,
        ids: &[String],
    ) -> Result<Result<(), StoreError>> {
        let key = entity.index_key();
        let encoded = encode_index(key, ids)?;
        match self.store.compare_and_put(key, expected, encoded) {
            Ok(()) => {
                debug!(index = key, len = ids.len(), "wrote index");
                Ok(Ok(()))
            }
            Err(conflict @ StoreError::Conflict { .. }) => Ok(Err(conflict)),
            Err(err) => Err(err.into()),
        }
    }

    /// Empties every index in registry order. Stops at the first failed
    /// write; indexes already reset stay reset.
    pub fn reset(&self) -> Result<()> {
        for entity in EntityType::ALL {
            self.write(entity, &[])?;
            info!(index = entity.index_key(), "reset index");
        }
        Ok(())
    }
}
