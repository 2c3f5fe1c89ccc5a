//! Domain layer: the sale ledger model, commission rules and the storage ports.

pub mod commission;
pub mod money;
pub mod patient;
pub mod ports;
pub mod transaction;
