use crate::domain::ports::{SettlementQueueRef, SettlementRequest};
use crate::domain::transaction::{TransactionId, TransactionStatus};
use tracing::{debug, error};

/// A persisted change of a transaction's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub transaction_id: TransactionId,
    /// `None` when the transaction was just created.
    pub from: Option<TransactionStatus>,
    pub to: TransactionStatus,
}

impl StatusTransition {
    pub fn enters_completed(&self) -> bool {
        self.to == TransactionStatus::Completed && self.from != Some(TransactionStatus::Completed)
    }
}

/// Turns transitions into `Completed` into settlement requests.
///
/// Only the transaction id travels downstream; the worker reloads the
/// transaction itself. Enqueue failures are logged and never reach the
/// ledger write that caused them.
#[derive(Clone)]
pub struct SettlementTrigger {
    queue: SettlementQueueRef,
}

impl SettlementTrigger {
    pub fn new(queue: SettlementQueueRef) -> Self {
        Self { queue }
    }

    /// Returns `true` if a settlement request was enqueued.
    pub async fn observe(&self, transition: StatusTransition) -> bool {
        if !transition.enters_completed() {
            return false;
        }

        let request = SettlementRequest {
            transaction_id: transition.transaction_id,
        };
        match self.queue.enqueue(request).await {
            Ok(()) => {
                debug!(transaction_id = %transition.transaction_id, "Settlement requested");
                true
            }
            Err(e) => {
                error!(
                    transaction_id = %transition.transaction_id,
                    error = %e,
                    "Failed to enqueue settlement request"
                );
                false
            }
        }
    }
}
