use super::trigger::{SettlementTrigger, StatusTransition};
use crate::domain::ports::TransactionLedgerRef;
use crate::domain::transaction::{Transaction, TransactionId, TransactionStatus};
use crate::error::{Result, SettlementError};

/// Write path of the ledger.
///
/// Every successful write is reported to the `SettlementTrigger` as a status
/// transition; the trigger's outcome never changes the result of the write.
#[derive(Clone)]
pub struct LedgerWriter {
    ledger: TransactionLedgerRef,
    trigger: SettlementTrigger,
}

impl LedgerWriter {
    pub fn new(ledger: TransactionLedgerRef, trigger: SettlementTrigger) -> Self {
        Self { ledger, trigger }
    }

    /// Creates or replaces a transaction.
    ///
    /// An update keeps the creation timestamp of the stored version.
    pub async fn save(&self, mut tx: Transaction) -> Result<()> {
        if let Some(existing) = self.ledger.get(tx.id).await? {
            tx.created_at = existing.created_at;
        }

        let transition_to = tx.status;
        let transaction_id = tx.id;
        let previous = self.ledger.store(tx).await?;

        self.trigger
            .observe(StatusTransition {
                transaction_id,
                from: previous.map(|p| p.status),
                to: transition_to,
            })
            .await;
        Ok(())
    }

    pub async fn set_status(&self, tx_id: TransactionId, status: TransactionStatus) -> Result<()> {
        let tx = self
            .ledger
            .get(tx_id)
            .await?
            .ok_or(SettlementError::NotFound(tx_id))?;
        self.save(tx.with_status(status)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::ports::{SettlementQueue, TransactionLedger};
    use crate::domain::transaction::{PatientId, StaffId};
    use crate::infrastructure::in_memory::InMemoryLedger;
    use crate::infrastructure::queue::InMemorySettlementQueue;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn setup() -> (LedgerWriter, InMemoryLedger, InMemorySettlementQueue) {
        let ledger = InMemoryLedger::new();
        let queue = InMemorySettlementQueue::default();
        let writer = LedgerWriter::new(
            Arc::new(ledger.clone()),
            SettlementTrigger::new(Arc::new(queue.clone())),
        );
        (writer, ledger, queue)
    }

    fn sale() -> Transaction {
        Transaction::new(PatientId::new(), Money::new(dec!(80000)).unwrap())
            .with_staff(StaffId(1), Some(StaffId(2)))
    }

    #[tokio::test]
    async fn test_completion_enqueues_once() {
        let (writer, _ledger, queue) = setup();
        let tx = sale();

        writer.save(tx.clone()).await.unwrap();
        assert_eq!(queue.pending().unwrap(), 0);

        writer
            .set_status(tx.id, TransactionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(queue.pending().unwrap(), 1);

        // Saving a completed transaction again is not a new transition.
        writer
            .set_status(tx.id, TransactionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(queue.pending().unwrap(), 1);

        writer.set_status(tx.id, TransactionStatus::Voided).await.unwrap();
        assert_eq!(queue.pending().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_created_completed_enqueues() {
        let (writer, _ledger, queue) = setup();
        writer
            .save(sale().with_status(TransactionStatus::Completed))
            .await
            .unwrap();
        assert_eq!(queue.pending().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let (writer, ledger, _queue) = setup();
        let mut tx = sale();
        tx.created_at = Utc::now() - Duration::days(3);
        let original = tx.created_at;
        writer.save(tx.clone()).await.unwrap();

        let mut update = tx.with_status(TransactionStatus::Completed);
        update.created_at = Utc::now();
        writer.save(update.clone()).await.unwrap();

        let stored = ledger.get(update.id).await.unwrap().unwrap();
        assert_eq!(stored.created_at, original);
        assert_eq!(stored.status, TransactionStatus::Completed);
    }

    #[tokio::test]
    async fn test_write_succeeds_when_queue_is_down() {
        let (writer, ledger, queue) = setup();
        queue.close().await.unwrap();

        let tx = sale().with_status(TransactionStatus::Completed);
        writer.save(tx.clone()).await.unwrap();
        assert!(ledger.get(tx.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_set_status_unknown_transaction() {
        let (writer, _ledger, _queue) = setup();
        let result = writer
            .set_status(TransactionId::new(), TransactionStatus::Completed)
            .await;
        assert!(matches!(result, Err(SettlementError::NotFound(_))));
    }
}
