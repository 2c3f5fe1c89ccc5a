use super::commission::CommissionLog;
use super::transaction::{Transaction, TransactionId};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// System of record for sales.
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    /// Stores `tx` and returns the version it replaced, as one atomic step.
    async fn store(&self, tx: Transaction) -> Result<Option<Transaction>>;
    async fn get(&self, tx_id: TransactionId) -> Result<Option<Transaction>>;
}

/// Append-only store of commission rows, unique per (transaction, staff).
#[async_trait]
pub trait CommissionLogStore: Send + Sync {
    async fn exists_for_transaction(&self, tx_id: TransactionId) -> Result<bool>;
    /// Inserts every row or none of them.
    ///
    /// Fails with `SettlementError::ConstraintViolation` if any (transaction, staff)
    /// pair is already present.
    async fn insert_batch(&self, rows: Vec<CommissionLog>) -> Result<()>;
    async fn for_transaction(&self, tx_id: TransactionId) -> Result<Vec<CommissionLog>>;
    async fn all(&self) -> Result<Vec<CommissionLog>>;
}

/// Message asking for a transaction to be settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub transaction_id: TransactionId,
}

/// A request handed to a worker, with its 1-based delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub request: SettlementRequest,
    pub attempt: u32,
}

/// At-least-once queue between the trigger and the workers.
#[async_trait]
pub trait SettlementQueue: Send + Sync {
    async fn enqueue(&self, request: SettlementRequest) -> Result<()>;
    /// Waits for the next delivery. `None` once the queue is closed and drained.
    async fn dequeue(&self) -> Result<Option<Delivery>>;
    async fn ack(&self, delivery: &Delivery) -> Result<()>;
    /// Hands a delivery back for redelivery under the queue's retry policy.
    async fn retry(&self, delivery: Delivery) -> Result<()>;
    /// Stops accepting new requests; pending and in-flight work still drains.
    async fn close(&self) -> Result<()>;
}

pub type TransactionLedgerRef = Arc<dyn TransactionLedger>;
pub type CommissionLogStoreRef = Arc<dyn CommissionLogStore>;
pub type SettlementQueueRef = Arc<dyn SettlementQueue>;
