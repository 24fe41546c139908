//! Errors for the indexed ledger.
//!
//! Covers the failure cases of the accessor and the named operations:
//! - Store failures (the key-value adapter could not read or write)
//! - Decode failures (an index list did not parse)
//! - Identifier problems (reserved key, index contention)
//! - Dispatch problems (unknown function name)
//!
//! Record absence is not an error: a missing record reads back as an empty
//! payload. Record decode failures during enumeration become placeholders
//! rather than errors.

use thiserror::Error;

use crate::stores::StoreError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("identifier {0} is reserved for an index list")]
    ReservedKey(String),

    /// The index kept changing underneath every compare-and-put attempt.
    #[error("index {index} still contended after {attempts} attempts")]
    IndexContention { index: &'static str, attempts: u32 },

    #[error("received unknown function name: {0}")]
    UnknownFunction(String),
}

impl Error {
    pub(crate) fn decode(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            key: key.into(),
            source,
        }
    }

    pub(crate) fn encode(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Encode {
            key: key.into(),
            source,
        }
    }
}
