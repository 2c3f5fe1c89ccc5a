use crate::domain::commission::CommissionLog;
use crate::domain::ports::{CommissionLogStore, TransactionLedger};
use crate::domain::transaction::{Transaction, TransactionId};
use crate::error::{Result, SettlementError};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Column Family for storing the transaction ledger.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family for storing commission rows.
pub const CF_COMMISSION_LOGS: &str = "commission_logs";

impl From<rocksdb::Error> for SettlementError {
    fn from(e: rocksdb::Error) -> Self {
        SettlementError::Storage(e.to_string())
    }
}

/// A persistent store implementation using RocksDB.
///
/// Holds both the ledger and the commission rows in separate Column Families.
/// Commission keys are the transaction UUID followed by the big-endian staff id,
/// so all rows of one transaction share a 16-byte prefix.
///
/// Writes that read before writing go through `write_lock`, which makes the
/// (transaction, staff) uniqueness check and the batch write a single step for
/// every handle cloned from the same `open`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_transactions = ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default());
        let cf_logs = ColumnFamilyDescriptor::new(CF_COMMISSION_LOGS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_transactions, cf_logs])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| SettlementError::Storage(format!("{name} column family not found")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| SettlementError::Storage("Write lock poisoned".to_string()))
    }

    fn log_key(row: &CommissionLog) -> Vec<u8> {
        let mut key = row.transaction.0.as_bytes().to_vec();
        key.extend_from_slice(&row.staff.0.to_be_bytes());
        key
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut items = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            items.push(decode(&value)?);
        }

        Ok(items)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| SettlementError::Storage(format!("Serialization error: {e}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| SettlementError::Storage(format!("Deserialization error: {e}")))
}

#[async_trait]
impl TransactionLedger for RocksDBStore {
    async fn store(&self, tx: Transaction) -> Result<Option<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let key = tx.id.0.as_bytes().to_vec();
        let value = encode(&tx)?;

        let _guard = self.lock()?;
        let previous = match self.db.get_cf(cf, &key)? {
            Some(bytes) => Some(decode(&bytes)?),
            None => None,
        };
        self.db.put_cf(cf, &key, value)?;

        Ok(previous)
    }

    async fn get(&self, tx_id: TransactionId) -> Result<Option<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        match self.db.get_cf(cf, tx_id.0.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CommissionLogStore for RocksDBStore {
    async fn exists_for_transaction(&self, tx_id: TransactionId) -> Result<bool> {
        let cf = self.cf(CF_COMMISSION_LOGS)?;
        let prefix = tx_id.0.as_bytes();
        let mut iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));

        match iter.next() {
            Some(item) => {
                let (key, _) = item?;
                Ok(key.starts_with(prefix))
            }
            None => Ok(false),
        }
    }

    async fn insert_batch(&self, rows: Vec<CommissionLog>) -> Result<()> {
        let cf = self.cf(CF_COMMISSION_LOGS)?;
        let mut batch = WriteBatch::default();
        let mut keys = Vec::with_capacity(rows.len());

        let _guard = self.lock()?;
        for row in &rows {
            let key = Self::log_key(row);
            if keys.contains(&key) || self.db.get_pinned_cf(cf, &key)?.is_some() {
                return Err(SettlementError::ConstraintViolation {
                    transaction: row.transaction,
                    staff: row.staff,
                });
            }
            batch.put_cf(cf, &key, encode(row)?);
            keys.push(key);
        }

        // A WriteBatch is applied atomically: all rows land or none do.
        self.db.write(batch)?;
        Ok(())
    }

    async fn for_transaction(&self, tx_id: TransactionId) -> Result<Vec<CommissionLog>> {
        // Keys sort by staff id; hand rows back in split order like the in-memory store.
        let mut rows: Vec<CommissionLog> = self.scan(CF_COMMISSION_LOGS, tx_id.0.as_bytes())?;
        rows.sort_by_key(|row| row.position);
        Ok(rows)
    }

    async fn all(&self) -> Result<Vec<CommissionLog>> {
        self.scan(CF_COMMISSION_LOGS, &[])
    }
}
