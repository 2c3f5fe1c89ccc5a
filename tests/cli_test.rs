use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::NamedTempFile;
use uuid::Uuid;

mod common;
use common::Row;

const OUTPUT_HEADER: &str = "transaction,staff,amount,rule,rate,total_commission_pool,split_count";

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let high = Uuid::new_v4();
    let shared = Uuid::new_v4();
    let file = NamedTempFile::new()?;
    common::write_rows(
        file.path(),
        &[
            Row::new(high, &[1], "150000", "COMPLETED"),
            Row::new(shared, &[1, 2], "80000", "PENDING"),
            Row::new(shared, &[1, 2], "80000", "COMPLETED"),
        ],
    )?;

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(OUTPUT_HEADER))
        .stdout(predicate::str::contains(format!(
            "{high},1,15000,High Value (>100k),0.1,15000,1"
        )))
        .stdout(predicate::str::contains(format!(
            "{shared},1,2000,Standard Value (<=100k),0.05,4000,2"
        )))
        .stdout(predicate::str::contains(format!(
            "{shared},2,2000,Standard Value (<=100k),0.05,4000,2"
        )));

    Ok(())
}

#[test]
fn test_no_staff_pending_and_voided_produce_nothing() {
    let no_staff = Uuid::new_v4();
    let pending = Uuid::new_v4();
    let voided = Uuid::new_v4();
    let file = NamedTempFile::new().unwrap();
    common::write_rows(
        file.path(),
        &[
            Row::new(no_staff, &[], "50000", "COMPLETED"),
            Row::new(pending, &[1], "50000", "PENDING"),
            Row::new(voided, &[1], "50000", "VOID"),
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("clinic-settlement"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::diff(format!("{OUTPUT_HEADER}\n")))
        .stderr(predicate::str::contains("No staff assigned to transaction"));
}

#[test]
fn test_repeated_completion_settles_once() {
    let id = Uuid::new_v4();
    let file = NamedTempFile::new().unwrap();
    common::write_rows(
        file.path(),
        &[
            Row::new(id, &[4], "1000", "COMPLETED"),
            Row::new(id, &[4], "1000", "COMPLETED"),
            Row::new(id, &[4], "1000", "COMPLETED"),
        ],
    )
    .unwrap();

    let output = Command::new(cargo_bin!("clinic-settlement"))
        .arg(file.path())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(rows, vec![format!("{id},4,50,Standard Value (<=100k),0.05,50,1")]);
}

#[test]
fn test_odd_cent_split() {
    let id = Uuid::new_v4();
    let file = NamedTempFile::new().unwrap();
    common::write_rows(file.path(), &[Row::new(id, &[9, 3], "1.00", "COMPLETED")]).unwrap();

    let output = Command::new(cargo_bin!("clinic-settlement"))
        .arg(file.path())
        .args(["--workers", "1"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    // Primary staff first, holding the odd cent
    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(
        rows,
        vec![
            format!("{id},9,0.03,Standard Value (<=100k),0.05,0.05,2").as_str(),
            format!("{id},3,0.02,Standard Value (<=100k),0.05,0.05,2").as_str(),
        ]
    );
}
