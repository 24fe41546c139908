//! Replays a CSV file of named invocations against a fresh in-memory ledger,
//! producing one outcome row per invocation in file order.
//!
//! [`run`] reads and dispatches on the calling thread. [`run_async`] splits
//! reading and dispatching into two tokio tasks joined by a channel; both
//! produce identical output for the same file.

mod async_runner;
mod sync_runner;
pub use async_runner::run as run_async;
pub use sync_runner::run;
