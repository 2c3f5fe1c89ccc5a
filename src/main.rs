use clap::Parser;
use clinic_settlement::application::ledger::LedgerWriter;
use clinic_settlement::application::pool::SettlementWorkerPool;
use clinic_settlement::application::trigger::SettlementTrigger;
use clinic_settlement::application::worker::SettlementWorker;
use clinic_settlement::config::{RetryPolicy, SettlementConfig};
use clinic_settlement::domain::ports::{
    CommissionLogStore, CommissionLogStoreRef, SettlementQueue, SettlementQueueRef,
    TransactionLedgerRef,
};
use clinic_settlement::infrastructure::in_memory::{InMemoryCommissionLogStore, InMemoryLedger};
use clinic_settlement::infrastructure::queue::InMemorySettlementQueue;
use clinic_settlement::interfaces::csv::commission_writer::CommissionWriter;
use clinic_settlement::interfaces::csv::transaction_reader::TransactionReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input CSV of ledger writes (id, patient, staff_1, staff_2, total_amount, status)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Number of concurrent settlement workers
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Deliveries allowed per settlement request before it is dead-lettered
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    /// Delay before the first redelivery, doubled on each further attempt
    #[arg(long, default_value_t = 100)]
    retry_backoff_ms: u64,
}

impl Cli {
    fn settlement_config(&self) -> SettlementConfig {
        SettlementConfig {
            workers: self.workers,
            retry: RetryPolicy {
                max_attempts: self.max_attempts.max(1),
                base_backoff: Duration::from_millis(self.retry_backoff_ms),
            },
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(TransactionLedgerRef, CommissionLogStoreRef)> {
    use clinic_settlement::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(db_path) => {
            // Use persistent storage (RocksDB)
            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            let ledger: TransactionLedgerRef = Arc::new(store.clone());
            let logs: CommissionLogStoreRef = Arc::new(store);
            Ok((ledger, logs))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(TransactionLedgerRef, CommissionLogStoreRef)> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (TransactionLedgerRef, CommissionLogStoreRef) {
    let ledger: TransactionLedgerRef = Arc::new(InMemoryLedger::new());
    let logs: CommissionLogStoreRef = Arc::new(InMemoryCommissionLogStore::new());
    (ledger, logs)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.settlement_config();

    let (ledger, logs) = open_stores(cli.db_path)?;
    let queue: SettlementQueueRef = Arc::new(InMemorySettlementQueue::new(config.retry));

    let worker = SettlementWorker::new(ledger.clone(), logs.clone());
    let pool = SettlementWorkerPool::spawn(&config, worker, queue.clone());
    let writer = LedgerWriter::new(ledger, SettlementTrigger::new(queue.clone()));

    // Replay ledger writes; completions are settled concurrently by the pool
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = TransactionReader::new(file);
    for tx_result in reader.transactions() {
        match tx_result {
            Ok(tx) => {
                if let Err(e) = writer.save(tx).await {
                    error!(error = %e, "Error recording transaction");
                }
            }
            Err(e) => {
                error!(error = %e, "Error reading transaction");
            }
        }
    }

    queue.close().await.into_diagnostic()?;
    pool.join().await;

    // Output the commission ledger
    let rows = logs.all().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut out = CommissionWriter::new(stdout.lock());
    out.write_logs(rows).into_diagnostic()?;

    Ok(())
}
