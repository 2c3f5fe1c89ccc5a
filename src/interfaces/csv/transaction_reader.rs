use crate::domain::transaction::Transaction;
use crate::error::{Result, SettlementError};
use std::io::Read;

/// Reads ledger writes from a CSV source.
///
/// Expected header: `id, patient, staff_1, staff_2, total_amount, status`.
/// Each row is one write to the ledger; a later row with the same `id` replaces
/// the earlier one. Whitespace is trimmed and empty staff columns read as absent.
pub struct TransactionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransactionReader<R> {
    /// Creates a new `TransactionReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes transactions.
    pub fn transactions(self) -> impl Iterator<Item = Result<Transaction>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(SettlementError::from))
    }
}
