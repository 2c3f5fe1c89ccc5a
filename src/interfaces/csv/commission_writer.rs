use crate::domain::commission::CommissionLog;
use crate::domain::transaction::{StaffId, TransactionId};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct CommissionRecord<'a> {
    transaction: TransactionId,
    staff: StaffId,
    amount: Decimal,
    rule: &'a str,
    rate: Decimal,
    total_commission_pool: Decimal,
    split_count: usize,
}

impl<'a> From<&'a CommissionLog> for CommissionRecord<'a> {
    fn from(log: &'a CommissionLog) -> Self {
        Self {
            transaction: log.transaction,
            staff: log.staff,
            amount: log.amount.normalize(),
            rule: &log.calculation_details.rule,
            rate: log.calculation_details.rate.normalize(),
            total_commission_pool: log.calculation_details.total_commission_pool.normalize(),
            split_count: log.calculation_details.split_count,
        }
    }
}

/// Writes commission rows as CSV.
pub struct CommissionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CommissionWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header and one line per row.
    ///
    /// Rows are ordered by transaction, then by position in the split, so the
    /// primary staff member comes first whatever order the store returned.
    pub fn write_logs(&mut self, mut logs: Vec<CommissionLog>) -> Result<()> {
        logs.sort_by_key(|log| (log.transaction, log.position));
        for log in &logs {
            self.writer.serialize(CommissionRecord::from(log))?;
        }
        if logs.is_empty() {
            self.writer.write_record([
                "transaction",
                "staff",
                "amount",
                "rule",
                "rate",
                "total_commission_pool",
                "split_count",
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
