#![allow(dead_code)]

use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use uuid::Uuid;

pub const HEADER: [&str; 6] = ["id", "patient", "staff_1", "staff_2", "total_amount", "status"];

/// One ledger write, as it appears in the input CSV.
pub struct Row {
    pub id: Uuid,
    pub staff_1: Option<u32>,
    pub staff_2: Option<u32>,
    pub amount: String,
    pub status: &'static str,
}

impl Row {
    pub fn new(id: Uuid, staff: &[u32], amount: &str, status: &'static str) -> Self {
        Self {
            id,
            staff_1: staff.first().copied(),
            staff_2: staff.get(1).copied(),
            amount: amount.to_string(),
            status,
        }
    }
}

fn staff_field(staff: Option<u32>) -> String {
    staff.map(|s| s.to_string()).unwrap_or_default()
}

pub fn write_rows(path: &Path, rows: &[Row]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;

    let patient = Uuid::new_v4().to_string();
    for row in rows {
        wtr.write_record([
            row.id.to_string(),
            patient.clone(),
            staff_field(row.staff_1),
            staff_field(row.staff_2),
            row.amount.clone(),
            row.status.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes `count` completed sales with random amounts and one or two staff.
///
/// Returns the number of commission rows the settlement should produce.
pub fn generate_completed_sales(path: &Path, count: usize) -> Result<usize, Error> {
    let mut rng = rand::thread_rng();
    let mut expected_rows = 0;
    let rows: Vec<Row> = (0..count)
        .map(|_| {
            let cents: u64 = rng.gen_range(0..50_000_000);
            let amount = format!("{}.{:02}", cents / 100, cents % 100);
            let staff: Vec<u32> = if rng.gen_bool(0.5) {
                vec![rng.gen_range(1..=20)]
            } else {
                let first = rng.gen_range(1..=20);
                vec![first, first + 100]
            };
            expected_rows += staff.len();
            Row::new(Uuid::new_v4(), &staff, &amount, "COMPLETED")
        })
        .collect();

    write_rows(path, &rows)?;
    Ok(expected_rows)
}
