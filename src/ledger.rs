use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::accessor::{IndexedAccessor, Listed};
use crate::config::LedgerConfig;
use crate::entities::{Order, Transaction, User};
use crate::error::{Error, Result};
use crate::index::EntityType;
use crate::invocation::{Function, Invocation};
use crate::stores::KvStore;

/// Result of [`Ledger::authenticate`]. Serialises to
/// `{"authenticated":false}` or `{"authenticated":true,"user":{...}}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Authentication {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Authentication {
    fn denied() -> Self {
        Self {
            authenticated: false,
            user: None,
        }
    }
}

/// The named ledger operations, each a thin call over the indexed accessor.
///
/// Invoke-style operations (`reset_indexes`, `add_*`) answer with an empty
/// payload. Lookups answer with the stored payload, which is empty when the
/// record does not exist.
pub struct Ledger<S> {
    accessor: IndexedAccessor<S>,
}

impl<S: KvStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LedgerConfig::default())
    }

    pub fn with_config(store: S, config: LedgerConfig) -> Self {
        Self {
            accessor: IndexedAccessor::with_config(store, config),
        }
    }

    pub fn accessor(&self) -> &IndexedAccessor<S> {
        &self.accessor
    }

    pub fn reset_indexes(&self) -> Result<Bytes> {
        self.accessor.reset_all()?;
        Ok(Bytes::new())
    }

    pub fn add_user(&self, id: &str, payload: impl Into<Bytes>) -> Result<Bytes> {
        self.add(EntityType::User, id, payload.into())
    }

    pub fn add_order(&self, id: &str, payload: impl Into<Bytes>) -> Result<Bytes> {
        self.add(EntityType::Order, id, payload.into())
    }

    /// Stores the caller's payload as is. The referenced order's sold flag
    /// is not touched.
    pub fn add_transaction(&self, id: &str, payload: impl Into<Bytes>) -> Result<Bytes> {
        self.add(EntityType::Transaction, id, payload.into())
    }

    fn add(&self, entity: EntityType, id: &str, payload: Bytes) -> Result<Bytes> {
        let id = self.accessor.generate_id(entity, id, false)?;
        self.accessor.put(&id, payload)?;
        info!(%entity, id = %id, "added record");
        Ok(Bytes::new())
    }

    pub fn get_user(&self, id: &str) -> Result<Bytes> {
        self.accessor.get(id)
    }

    pub fn get_order(&self, id: &str) -> Result<Bytes> {
        self.accessor.get(id)
    }

    pub fn get_transaction(&self, id: &str) -> Result<Bytes> {
        self.accessor.get(id)
    }

    /// JSON array of every indexed order. Undecodable orders appear as
    /// zero-valued entries; use [`Ledger::orders`] to tell them apart.
    pub fn get_all_orders(&self) -> Result<Bytes> {
        encode_listing(EntityType::Order, self.orders()?)
    }

    pub fn get_all_transactions(&self) -> Result<Bytes> {
        encode_listing(EntityType::Transaction, self.transactions()?)
    }

    pub fn users(&self) -> Result<Vec<Listed<User>>> {
        self.accessor.list_all(EntityType::User)
    }

    pub fn orders(&self) -> Result<Vec<Listed<Order>>> {
        self.accessor.list_all(EntityType::Order)
    }

    pub fn transactions(&self) -> Result<Vec<Listed<Transaction>>> {
        self.accessor.list_all(EntityType::Transaction)
    }

    /// Authenticated means a user record exists under `user_id` and decodes.
    /// No credential is checked. Every failure collapses to "not
    /// authenticated" without saying which one occurred.
    pub fn authenticate(&self, user_id: &str) -> Authentication {
        let payload = match self.get_user(user_id) {
            Ok(payload) => payload,
            Err(_) => return Authentication::denied(),
        };
        match serde_json::from_slice::<User>(&payload) {
            Ok(user) => Authentication {
                authenticated: true,
                user: Some(user),
            },
            Err(_) => Authentication::denied(),
        }
    }

    /// Routes a named invocation to its operation.
    pub fn dispatch(&self, invocation: &Invocation) -> Result<Bytes> {
        let function: Function = invocation.function.parse()?;
        info!(function = %function, id = %invocation.id, "dispatching");

        let id = invocation.id.as_str();
        let payload = || Bytes::copy_from_slice(invocation.payload.as_bytes());
        match function {
            Function::ResetIndexes => self.reset_indexes(),
            Function::AddUser => self.add_user(id, payload()),
            Function::AddOrder => self.add_order(id, payload()),
            Function::AddTransaction => self.add_transaction(id, payload()),
            Function::GetUser => self.get_user(id),
            Function::GetOrder => self.get_order(id),
            Function::GetAllOrders => self.get_all_orders(),
            Function::GetTransaction => self.get_transaction(id),
            Function::GetAllTransactions => self.get_all_transactions(),
            // The payload column carries the password, which is ignored.
            Function::Authenticate => serde_json::to_vec(&self.authenticate(id))
                .map(Bytes::from)
                .map_err(|source| Error::encode(id, source)),
        }
    }
}

fn encode_listing<T: Serialize>(entity: EntityType, listed: Vec<Listed<T>>) -> Result<Bytes> {
    let records: Vec<T> = listed.into_iter().map(Listed::into_record).collect();
    serde_json::to_vec(&records)
        .map(Bytes::from)
        .map_err(|source| Error::encode(entity.index_key(), source))
}
