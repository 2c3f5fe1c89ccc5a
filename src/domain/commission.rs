//! Commission rules and the audit record produced by a settlement.

use super::money::{round_minor, truncate_minor};
use super::transaction::{StaffId, TransactionId};
use crate::error::SettlementError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Sales strictly above this amount earn the high-value rate.
pub const HIGH_VALUE_THRESHOLD: Decimal = dec!(100000);
pub const HIGH_VALUE_RATE: Decimal = dec!(0.10);
pub const STANDARD_RATE: Decimal = dec!(0.05);
pub const HIGH_VALUE_RULE: &str = "High Value (>100k)";
pub const STANDARD_RULE: &str = "Standard Value (<=100k)";
/// A transaction credits at most a primary and a secondary staff member.
pub const MAX_STAFF: usize = 2;

/// Result of applying the commission rules to one sale.
#[derive(Debug, Clone, PartialEq)]
pub struct CommissionSplit {
    pub rule: &'static str,
    pub rate: Decimal,
    pub total_txn_amount: Decimal,
    pub pool: Decimal,
    /// Share per staff member, in the order the staff were given.
    pub per_staff: Vec<(StaffId, Decimal)>,
}

impl CommissionSplit {
    pub fn staff_count(&self) -> usize {
        self.per_staff.len()
    }

    /// The nominal equal share, before the residual cent goes to the first entry.
    pub fn split_amount(&self) -> Decimal {
        self.per_staff
            .last()
            .map(|(_, amount)| *amount)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn details(&self) -> CalculationDetails {
        CalculationDetails {
            rule: self.rule.to_string(),
            rate: self.rate,
            total_txn_amount: self.total_txn_amount,
            total_commission_pool: self.pool,
            split_count: self.staff_count(),
        }
    }

    /// Builds the audit rows for this split, one per staff member.
    pub fn into_logs(
        self,
        transaction: TransactionId,
        calculated_at: DateTime<Utc>,
    ) -> Vec<CommissionLog> {
        let details = self.details();
        self.per_staff
            .into_iter()
            .enumerate()
            .map(|(position, (staff, amount))| CommissionLog {
                transaction,
                staff,
                position,
                amount,
                calculation_details: details.clone(),
                calculated_at,
            })
            .collect()
    }
}

/// The tiered commission rule.
///
/// Pure: no storage access, so every tier and rounding case is testable in isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommissionRule;

impl CommissionRule {
    /// Computes the commission pool for `amount` and splits it equally across `staff`.
    ///
    /// The pool is rounded half-even to the minor unit. Shares are truncated to the
    /// minor unit and the leftover cents go to the first staff entry, so the shares
    /// always add up to the pool exactly.
    pub fn compute(
        amount: Decimal,
        staff: &[StaffId],
    ) -> Result<CommissionSplit, SettlementError> {
        if amount < Decimal::ZERO {
            return Err(SettlementError::InvalidInput(format!(
                "Amount must not be negative, got {amount}"
            )));
        }
        if staff.is_empty() {
            return Err(SettlementError::InvalidInput(
                "At least one staff member is required".to_string(),
            ));
        }
        if staff.len() > MAX_STAFF {
            return Err(SettlementError::InvalidInput(format!(
                "At most {MAX_STAFF} staff members can share a commission, got {}",
                staff.len()
            )));
        }
        if staff.len() == 2 && staff[0] == staff[1] {
            return Err(SettlementError::InvalidInput(format!(
                "Staff member {} listed twice",
                staff[0]
            )));
        }

        let (rule, rate) = if amount > HIGH_VALUE_THRESHOLD {
            (HIGH_VALUE_RULE, HIGH_VALUE_RATE)
        } else {
            (STANDARD_RULE, STANDARD_RATE)
        };

        let pool = round_minor(amount * rate);
        let count = Decimal::from(staff.len());
        let share = truncate_minor(pool / count);
        let residual = pool - share * count;

        let per_staff = staff
            .iter()
            .enumerate()
            .map(|(i, member)| {
                let amount = if i == 0 { share + residual } else { share };
                (*member, amount)
            })
            .collect();

        Ok(CommissionSplit {
            rule,
            rate,
            total_txn_amount: amount,
            pool,
            per_staff,
        })
    }
}

/// Snapshot of the rule inputs used to derive a commission row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationDetails {
    pub rule: String,
    pub rate: Decimal,
    pub total_txn_amount: Decimal,
    pub total_commission_pool: Decimal,
    pub split_count: usize,
}

/// Immutable per-staff commission record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionLog {
    pub transaction: TransactionId,
    pub staff: StaffId,
    /// Index of the staff member within the split; 0 is the primary.
    #[serde(default)]
    pub position: usize,
    pub amount: Decimal,
    pub calculation_details: CalculationDetails,
    pub calculated_at: DateTime<Utc>,
}
