use crate::domain::commission::CommissionLog;
use crate::domain::ports::{CommissionLogStore, TransactionLedger};
use crate::domain::transaction::{Transaction, TransactionId};
use crate::error::{Result, SettlementError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory transaction ledger.
///
/// Uses `Arc<RwLock<HashMap<TransactionId, Transaction>>>` so clones share the same data.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionLedger for InMemoryLedger {
    async fn store(&self, tx: Transaction) -> Result<Option<Transaction>> {
        let mut transactions = self.transactions.write().await;
        Ok(transactions.insert(tx.id, tx))
    }

    async fn get(&self, tx_id: TransactionId) -> Result<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(&tx_id).cloned())
    }
}

#[derive(Default)]
struct LogTable {
    rows: HashMap<TransactionId, Vec<CommissionLog>>,
    /// Unique index over (transaction, staff).
    keys: HashSet<(TransactionId, u32)>,
}

/// A thread-safe in-memory commission log store.
///
/// The uniqueness check and the insert of a whole batch happen under one write
/// lock, so concurrent batches for the same transaction cannot both commit.
#[derive(Default, Clone)]
pub struct InMemoryCommissionLogStore {
    table: Arc<RwLock<LogTable>>,
}

impl InMemoryCommissionLogStore {
    /// Creates a new, empty commission log store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommissionLogStore for InMemoryCommissionLogStore {
    async fn exists_for_transaction(&self, tx_id: TransactionId) -> Result<bool> {
        let table = self.table.read().await;
        Ok(table.rows.get(&tx_id).is_some_and(|rows| !rows.is_empty()))
    }

    async fn insert_batch(&self, rows: Vec<CommissionLog>) -> Result<()> {
        let mut table = self.table.write().await;

        let mut batch_keys = HashSet::with_capacity(rows.len());
        for row in &rows {
            let key = (row.transaction, row.staff.0);
            if table.keys.contains(&key) || !batch_keys.insert(key) {
                return Err(SettlementError::ConstraintViolation {
                    transaction: row.transaction,
                    staff: row.staff,
                });
            }
        }

        table.keys.extend(batch_keys);
        for row in rows {
            table.rows.entry(row.transaction).or_default().push(row);
        }
        Ok(())
    }

    async fn for_transaction(&self, tx_id: TransactionId) -> Result<Vec<CommissionLog>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&tx_id).cloned().unwrap_or_default())
    }

    async fn all(&self) -> Result<Vec<CommissionLog>> {
        let table = self.table.read().await;
        Ok(table.rows.values().flatten().cloned().collect())
    }
}
