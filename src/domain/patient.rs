use super::transaction::PatientId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Replacement for values too short to mask partially.
pub const SHORT_VALUE_MASK: &str = "*****";
const MIN_MASKABLE_LEN: usize = 6;
const VISIBLE_PREFIX: usize = 3;
const VISIBLE_SUFFIX: usize = 4;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Doctor,
    Admin,
    Nurse,
    Reception,
}

impl Role {
    /// Roles allowed to see contact data unmasked.
    pub fn sees_contact_data(self) -> bool {
        matches!(self, Self::Doctor | Self::Admin)
    }
}

/// Masks the interior of a contact value, keeping the first three and last four characters.
pub fn mask_contact(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < MIN_MASKABLE_LEN {
        return SHORT_VALUE_MASK.to_string();
    }
    let prefix: String = chars[..VISIBLE_PREFIX].iter().collect();
    let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    format!("{prefix}-XXX-{suffix}")
}

/// Returns `value` in full for privileged roles, masked for everyone else.
///
/// A caller whose role could not be resolved gets the masked form.
pub fn expose_contact(value: &str, role: Option<Role>) -> Cow<'_, str> {
    match role {
        Some(role) if role.sees_contact_data() => Cow::Borrowed(value),
        _ => Cow::Owned(mask_contact(value)),
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Patient {
    pub id: PatientId,
    /// Hospital number.
    pub hn: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// Outbound representation of a patient for a given caller.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PatientView {
    pub id: PatientId,
    pub hn: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl PatientView {
    pub fn for_role(patient: &Patient, role: Option<Role>) -> Self {
        Self {
            id: patient.id,
            hn: patient.hn.clone(),
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            phone_number: expose_contact(&patient.phone_number, role).into_owned(),
        }
    }
}
