use super::worker::SettlementWorker;
use crate::config::SettlementConfig;
use crate::domain::ports::{Delivery, SettlementQueueRef};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// A fixed set of settlement workers pulling from one shared queue.
///
/// Deliveries are processed in no particular order; the same transaction may
/// reach two workers at once and the worker's idempotency guard sorts it out.
pub struct SettlementWorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl SettlementWorkerPool {
    /// Starts `config.workers` tasks, at least one.
    pub fn spawn(
        config: &SettlementConfig,
        worker: SettlementWorker,
        queue: SettlementQueueRef,
    ) -> Self {
        let handles = (0..config.workers.max(1))
            .map(|id| {
                let worker = worker.clone();
                let queue = queue.clone();
                tokio::spawn(async move { run(id, worker, queue).await })
            })
            .collect();
        Self { handles }
    }

    /// Waits for every worker to exit, which happens once the queue is closed and drained.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Settlement worker task failed");
            }
        }
    }
}

async fn run(id: usize, worker: SettlementWorker, queue: SettlementQueueRef) {
    loop {
        let delivery = match queue.dequeue().await {
            Ok(Some(delivery)) => delivery,
            Ok(None) => break,
            Err(e) => {
                error!(worker = id, error = %e, "Failed to dequeue settlement request");
                break;
            }
        };
        handle(&worker, &queue, delivery).await;
    }
    debug!(worker = id, "Settlement worker stopped");
}

async fn handle(worker: &SettlementWorker, queue: &SettlementQueueRef, delivery: Delivery) {
    let tx_id = delivery.request.transaction_id;
    let settled = match worker.process(tx_id).await {
        Err(e) if e.is_retryable() => queue.retry(delivery).await,
        // Outcomes and terminal errors are already logged by the worker.
        _ => queue.ack(&delivery).await,
    };
    if let Err(e) = settled {
        error!(transaction_id = %tx_id, error = %e, "Failed to settle delivery with the queue");
    }
}
