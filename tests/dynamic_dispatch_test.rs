use clinic_settlement::domain::commission::CommissionRule;
use clinic_settlement::domain::money::Money;
use clinic_settlement::domain::ports::{
    CommissionLogStore, CommissionLogStoreRef, TransactionLedger, TransactionLedgerRef,
};
use clinic_settlement::domain::transaction::{PatientId, StaffId, Transaction};
use clinic_settlement::infrastructure::in_memory::{InMemoryCommissionLogStore, InMemoryLedger};
use chrono::Utc;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let ledger: TransactionLedgerRef = Arc::new(InMemoryLedger::new());
    let logs: CommissionLogStoreRef = Arc::new(InMemoryCommissionLogStore::new());

    let tx = Transaction::new(PatientId::new(), Money::new(dec!(100.0)).unwrap())
        .with_staff(StaffId(1), None);
    let tx_id = tx.id;
    let rows = CommissionRule::compute(dec!(100.0), &tx.staff())
        .unwrap()
        .into_logs(tx_id, Utc::now());

    // Verify Send + Sync by spawning tasks
    let ledger_handle = tokio::spawn(async move {
        ledger.store(tx).await.unwrap();
        ledger.get(tx_id).await.unwrap().unwrap()
    });

    let logs_handle = tokio::spawn(async move {
        logs.insert_batch(rows).await.unwrap();
        logs.for_transaction(tx_id).await.unwrap()
    });

    let retrieved_tx = ledger_handle.await.unwrap();
    assert_eq!(retrieved_tx.id, tx_id);

    let retrieved_rows = logs_handle.await.unwrap();
    assert_eq!(retrieved_rows.len(), 1);
    assert_eq!(retrieved_rows[0].amount, dec!(5.00));
}
