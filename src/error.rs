use crate::domain::transaction::{StaffId, TransactionId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Transaction {0} not found")]
    NotFound(TransactionId),
    #[error("Commission already recorded for transaction {transaction}, staff {staff}")]
    ConstraintViolation {
        transaction: TransactionId,
        staff: StaffId,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Queue error: {0}")]
    Queue(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SettlementError {
    /// Whether the surrounding queue should redeliver the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Queue(_) | Self::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, SettlementError>;
