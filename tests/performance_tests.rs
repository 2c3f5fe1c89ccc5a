use assert_cmd::cargo_bin;
use std::process::Command;

mod common;

#[test]
fn test_many_completions_settle_once_each() {
    let csv = tempfile::NamedTempFile::new().unwrap();
    let expected = common::generate_completed_sales(csv.path(), 5_000)
        .expect("Failed to generate sales CSV");

    let output = Command::new(cargo_bin!("clinic-settlement"))
        .arg(csv.path())
        .args(["--workers", "8"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Binary failed to settle large file");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().skip(1).count(), expected);
}

#[test]
fn test_single_worker_matches_output() {
    let csv = tempfile::NamedTempFile::new().unwrap();
    let expected = common::generate_completed_sales(csv.path(), 500)
        .expect("Failed to generate sales CSV");

    let output = Command::new(cargo_bin!("clinic-settlement"))
        .arg(csv.path())
        .args(["--workers", "1"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().skip(1).count(), expected);
}
