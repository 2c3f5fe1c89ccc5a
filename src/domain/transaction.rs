use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub Uuid);

impl PatientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of a staff member credited with a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(pub u32);

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum TransactionStatus {
    #[default]
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "VOID")]
    Voided,
}

/// A sale recorded against a patient, credited to at most two staff members.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: TransactionId,
    pub patient: PatientId,
    /// Primary staff member.
    pub staff_1: Option<StaffId>,
    /// Optional secondary staff member.
    pub staff_2: Option<StaffId>,
    pub total_amount: Money,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(patient: PatientId, total_amount: Money) -> Self {
        Self {
            id: TransactionId::new(),
            patient,
            staff_1: None,
            staff_2: None,
            total_amount,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn with_staff(mut self, primary: StaffId, secondary: Option<StaffId>) -> Self {
        self.staff_1 = Some(primary);
        self.staff_2 = secondary;
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// Distinct staff credited with this sale, primary first.
    pub fn staff(&self) -> Vec<StaffId> {
        let mut staff = Vec::with_capacity(2);
        for member in [self.staff_1, self.staff_2].into_iter().flatten() {
            if !staff.contains(&member) {
                staff.push(member);
            }
        }
        staff
    }
}
