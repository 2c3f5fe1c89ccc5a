use crate::config::RetryPolicy;
use crate::domain::ports::{Delivery, SettlementQueue, SettlementRequest};
use crate::error::{Result, SettlementError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::{error, warn};

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Delivery>,
    /// Deliveries handed out (or waiting out a backoff) and not yet acked.
    in_flight: usize,
    closed: bool,
    dead_letters: Vec<Delivery>,
}

struct Inner {
    state: Mutex<QueueState>,
    notify: Notify,
    policy: RetryPolicy,
}

impl Inner {
    fn lock(&self) -> Result<MutexGuard<'_, QueueState>> {
        self.state
            .lock()
            .map_err(|_| SettlementError::Queue("Queue state lock poisoned".to_string()))
    }
}

/// An in-process, at-least-once settlement queue.
///
/// Many workers can `dequeue` concurrently; each delivery is owned by one worker
/// until it is acked or handed back through `retry`. Retries wait out an
/// exponential backoff and are dead-lettered once `max_attempts` is spent.
#[derive(Clone)]
pub struct InMemorySettlementQueue {
    inner: Arc<Inner>,
}

impl InMemorySettlementQueue {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                notify: Notify::new(),
                policy,
            }),
        }
    }

    /// Deliveries that exhausted their retry budget.
    pub fn dead_letters(&self) -> Result<Vec<Delivery>> {
        Ok(self.inner.lock()?.dead_letters.clone())
    }

    /// Number of requests waiting to be dequeued.
    pub fn pending(&self) -> Result<usize> {
        Ok(self.inner.lock()?.pending.len())
    }
}

impl Default for InMemorySettlementQueue {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

#[async_trait]
impl SettlementQueue for InMemorySettlementQueue {
    async fn enqueue(&self, request: SettlementRequest) -> Result<()> {
        {
            let mut state = self.inner.lock()?;
            if state.closed {
                return Err(SettlementError::Queue(format!(
                    "Queue closed, dropping request for {}",
                    request.transaction_id
                )));
            }
            state.pending.push_back(Delivery {
                request,
                attempt: 1,
            });
        }
        self.inner.notify.notify_waiters();
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<Delivery>> {
        loop {
            // Register interest before inspecting state so a wake-up cannot slip in between.
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.inner.lock()?;
                if let Some(delivery) = state.pending.pop_front() {
                    state.in_flight += 1;
                    return Ok(Some(delivery));
                }
                if state.closed && state.in_flight == 0 {
                    return Ok(None);
                }
            }

            notified.await;
        }
    }

    async fn ack(&self, _delivery: &Delivery) -> Result<()> {
        {
            let mut state = self.inner.lock()?;
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.inner.notify.notify_waiters();
        Ok(())
    }

    async fn retry(&self, delivery: Delivery) -> Result<()> {
        let policy = self.inner.policy;
        if !policy.allows_another(delivery.attempt) {
            error!(
                transaction_id = %delivery.request.transaction_id,
                attempt = delivery.attempt,
                "Retry budget exhausted, dead-lettering settlement request"
            );
            {
                let mut state = self.inner.lock()?;
                state.in_flight = state.in_flight.saturating_sub(1);
                state.dead_letters.push(delivery);
            }
            self.inner.notify.notify_waiters();
            return Ok(());
        }

        let delay = policy.backoff_for(delivery.attempt);
        warn!(
            transaction_id = %delivery.request.transaction_id,
            attempt = delivery.attempt,
            delay_ms = delay.as_millis() as u64,
            "Scheduling settlement redelivery"
        );

        // The delivery stays in flight while it waits, so the queue does not
        // report itself drained in the meantime.
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match inner.lock() {
                Ok(mut state) => {
                    state.in_flight = state.in_flight.saturating_sub(1);
                    state.pending.push_back(Delivery {
                        request: delivery.request,
                        attempt: delivery.attempt + 1,
                    });
                }
                Err(e) => error!(error = %e, "Failed to requeue settlement request"),
            }
            inner.notify.notify_waiters();
        });
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.inner.lock()?.closed = true;
        self.inner.notify.notify_waiters();
        Ok(())
    }
}
