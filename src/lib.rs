mod accessor;
mod config;
mod csv_utils;
mod entities;
mod error;
mod index;
mod invocation;
mod ledger;
mod runner;
mod stores;

pub use accessor::{IndexedAccessor, Listed};
pub use config::{LedgerConfig, DEFAULT_MAX_INDEX_RETRIES};
pub use entities::{Order, Quantity, Transaction, User};
pub use error::{Error, Result};
pub use index::{EntityType, IndexRegistry};
pub use invocation::{Function, Invocation, Outcome};
pub use ledger::{Authentication, Ledger};
pub use runner::{run, run_async};
pub use stores::{KvStore, MemoryStore, StoreError};
