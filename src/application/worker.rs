use crate::domain::commission::CommissionRule;
use crate::domain::ports::{CommissionLogStoreRef, TransactionLedgerRef};
use crate::domain::transaction::{StaffId, TransactionId, TransactionStatus};
use crate::error::{Result, SettlementError};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

/// Why a settlement request resolved without writing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The transaction is not (or no longer) completed.
    NotCompleted(TransactionStatus),
    /// Commission rows already exist for the transaction.
    AlreadySettled,
    /// No staff member is credited with the sale.
    NoStaff,
    /// A concurrent worker committed the batch first.
    LostRace,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    Settled {
        pool: Decimal,
        split_amount: Decimal,
        staff_count: usize,
        per_staff: Vec<(StaffId, Decimal)>,
    },
    Skipped(SkipReason),
}

/// Settles one transaction per call.
///
/// Holds no state between calls: every delivery reloads the transaction and
/// re-checks the commission store, so replaying a request is always safe.
#[derive(Clone)]
pub struct SettlementWorker {
    ledger: TransactionLedgerRef,
    logs: CommissionLogStoreRef,
}

impl SettlementWorker {
    pub fn new(ledger: TransactionLedgerRef, logs: CommissionLogStoreRef) -> Self {
        Self { ledger, logs }
    }

    /// Runs the settlement for `tx_id`.
    ///
    /// `Ok` outcomes and non-retryable errors are final. Retryable errors
    /// (see `SettlementError::is_retryable`) should be redelivered.
    pub async fn process(&self, tx_id: TransactionId) -> Result<SettlementOutcome> {
        let result = self.settle(tx_id).await;
        match &result {
            Ok(SettlementOutcome::Settled {
                split_amount,
                staff_count,
                ..
            }) => info!(
                transaction_id = %tx_id,
                %split_amount,
                staff_count,
                "Commission calculated"
            ),
            Ok(SettlementOutcome::Skipped(SkipReason::NoStaff)) => {
                warn!(transaction_id = %tx_id, "No staff assigned to transaction, skipping")
            }
            Ok(SettlementOutcome::Skipped(reason)) => {
                info!(transaction_id = %tx_id, ?reason, "Settlement skipped")
            }
            Err(e) => error!(
                transaction_id = %tx_id,
                error = %e,
                retryable = e.is_retryable(),
                "Settlement failed"
            ),
        }
        result
    }

    async fn settle(&self, tx_id: TransactionId) -> Result<SettlementOutcome> {
        let tx = self
            .ledger
            .get(tx_id)
            .await?
            .ok_or(SettlementError::NotFound(tx_id))?;

        if tx.status != TransactionStatus::Completed {
            return Ok(SettlementOutcome::Skipped(SkipReason::NotCompleted(
                tx.status,
            )));
        }

        if self.logs.exists_for_transaction(tx_id).await? {
            return Ok(SettlementOutcome::Skipped(SkipReason::AlreadySettled));
        }

        let staff = tx.staff();
        if staff.is_empty() {
            return Ok(SettlementOutcome::Skipped(SkipReason::NoStaff));
        }

        let split = CommissionRule::compute(tx.total_amount.value(), &staff)?;
        info!(
            transaction_id = %tx_id,
            rule = split.rule,
            rate = %split.rate,
            amount = %split.total_txn_amount,
            pool = %split.pool,
            "Computed commission split"
        );

        let outcome = SettlementOutcome::Settled {
            pool: split.pool,
            split_amount: split.split_amount(),
            staff_count: split.staff_count(),
            per_staff: split.per_staff.clone(),
        };

        match self.logs.insert_batch(split.into_logs(tx_id, Utc::now())).await {
            Ok(()) => Ok(outcome),
            Err(SettlementError::ConstraintViolation { .. }) => {
                Ok(SettlementOutcome::Skipped(SkipReason::LostRace))
            }
            Err(e) => Err(e),
        }
    }
}
