//! Application layer orchestrating the settlement pipeline.
//!
//! Ledger writes flow through `LedgerWriter`, which reports status transitions
//! to the `SettlementTrigger`. The trigger enqueues settlement requests that a
//! `SettlementWorkerPool` of tokio tasks hands to `SettlementWorker`.

pub mod ledger;
pub mod pool;
pub mod trigger;
pub mod worker;
