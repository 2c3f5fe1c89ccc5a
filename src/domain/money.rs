use crate::error::SettlementError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places of the currency's minor unit.
pub const MINOR_UNIT_DP: u32 = 2;

/// A non-negative monetary amount.
///
/// Wraps `rust_decimal::Decimal` so that sale totals can never go negative
/// once they enter the ledger. Deserialized from the decimal's text form, so
/// CSV amounts never pass through `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub fn new(value: Decimal) -> Result<Self, SettlementError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(SettlementError::InvalidInput(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = rust_decimal::serde::str::deserialize(deserializer)?;
        Self::new(value).map_err(de::Error::custom)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rounds half-even to the minor unit.
pub fn round_minor(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MINOR_UNIT_DP, RoundingStrategy::MidpointNearestEven)
}

/// Truncates towards zero at the minor unit.
pub fn truncate_minor(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MINOR_UNIT_DP, RoundingStrategy::ToZero)
}
