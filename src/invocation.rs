use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The named operations a ledger answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    ResetIndexes,
    AddUser,
    AddOrder,
    AddTransaction,
    GetUser,
    GetOrder,
    GetAllOrders,
    GetTransaction,
    GetAllTransactions,
    Authenticate,
}

impl Function {
    pub const ALL: [Function; 10] = [
        Function::ResetIndexes,
        Function::AddUser,
        Function::AddOrder,
        Function::AddTransaction,
        Function::GetUser,
        Function::GetOrder,
        Function::GetAllOrders,
        Function::GetTransaction,
        Function::GetAllTransactions,
        Function::Authenticate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Function::ResetIndexes => "reset_indexes",
            Function::AddUser => "add_user",
            Function::AddOrder => "add_order",
            Function::AddTransaction => "add_transaction",
            Function::GetUser => "get_user",
            Function::GetOrder => "get_order",
            Function::GetAllOrders => "get_all_orders",
            Function::GetTransaction => "get_transaction",
            Function::GetAllTransactions => "get_all_transactions",
            Function::Authenticate => "authenticate",
        }
    }
}

impl FromStr for Function {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|function| function.name() == name)
            .ok_or_else(|| Error::UnknownFunction(name.to_owned()))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of an invocation file: `function,id,payload`.
///
/// `id` is the first argument (record or user identifier) and `payload` the
/// second (record JSON, or the password for `authenticate`). Either may be
/// blank for operations that take fewer arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invocation {
    pub function: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub payload: String,
}

/// One row of the runner's output: `function,id,ok,result`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    pub function: String,
    pub id: String,
    pub ok: bool,
    /// Response payload as text, or the error message.
    pub result: String,
}

impl Outcome {
    pub fn new(invocation: Invocation, response: crate::Result<bytes::Bytes>) -> Self {
        let (ok, result) = match response {
            Ok(payload) => (true, String::from_utf8_lossy(&payload).into_owned()),
            Err(err) => (false, err.to_string()),
        };
        Self {
            function: invocation.function,
            id: invocation.id,
            ok,
            result,
        }
    }
}
