//! Integration test: the `run` subcommand end-to-end
//!
//! Spawns the real binary in a scratch workspace so the orchestrator's
//! child-process stages, exit codes, and artifact layout are all exercised
//! exactly as a user would hit them.

use polars::prelude::*;
use std::path::Path;
use std::process::Command;
use tripflow::io::DataSaver;

const BIN: &str = env!("CARGO_BIN_EXE_tripflow");

// 2023-01-01 00:00:00 UTC, epoch seconds
const BASE: i64 = 1_672_531_200;

fn raw_month(n: usize, dist_shift: f64) -> DataFrame {
    let mut vendor = Vec::with_capacity(n);
    let mut pickup = Vec::with_capacity(n);
    let mut dropoff = Vec::with_capacity(n);
    let mut passengers = Vec::with_capacity(n);
    let mut distance = Vec::with_capacity(n);
    let mut rate = Vec::with_capacity(n);
    let mut payment = Vec::with_capacity(n);

    for i in 0..n {
        let start = BASE + (i % 7) as i64 * 86_400 + (i % 24) as i64 * 3_600;
        let minutes = 5 + (i % 40) as i64;

        vendor.push((i % 2 + 1) as i64);
        pickup.push(start);
        dropoff.push(start + minutes * 60);
        passengers.push((i % 4 + 1) as i64);
        distance.push((i % 10) as f64 + 0.5 + dist_shift);
        rate.push(((i / 3) % 2 + 1) as i64);
        payment.push(((i / 2) % 3 + 1) as i64);
    }

    df!(
        "VendorID" => &vendor,
        "tpep_pickup_datetime" => &pickup,
        "tpep_dropoff_datetime" => &dropoff,
        "passenger_count" => &passengers,
        "trip_distance" => &distance,
        "RatecodeID" => &rate,
        "payment_type" => &payment
    )
    .unwrap()
}

fn write_raw(workspace: &Path, year: i32, month: u32, df: &mut DataFrame) {
    let path = workspace
        .join("data")
        .join("raw")
        .join(format!("yellow_tripdata_{year:04}-{month:02}.parquet"));
    DataSaver::save_parquet(df, &path).unwrap();
}

#[test]
fn test_run_month_selfcheck() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), 2023, 1, &mut raw_month(120, 0.0));

    let status = Command::new(BIN)
        .current_dir(dir.path())
        .args(["run", "--year", "2023", "--month", "1"])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(dir
        .path()
        .join("data/processed/train_2023_01.parquet")
        .exists());
    assert!(dir.path().join("artifacts/model.json").exists());
    assert!(dir
        .path()
        .join("reports/drift_202301_selfcheck.html")
        .exists());
}

#[test]
fn test_run_month_against_reference() {
    let dir = tempfile::tempdir().unwrap();
    write_raw(dir.path(), 2023, 1, &mut raw_month(120, 0.0));
    write_raw(dir.path(), 2023, 2, &mut raw_month(120, 6.0));

    let jan = Command::new(BIN)
        .current_dir(dir.path())
        .args(["run", "--year", "2023", "--month", "1"])
        .status()
        .unwrap();
    assert!(jan.success());

    let feb = Command::new(BIN)
        .current_dir(dir.path())
        .args([
            "run", "--year", "2023", "--month", "2", "--ref-year", "2023", "--ref-month", "1",
        ])
        .status()
        .unwrap();
    assert!(feb.success());

    let report = dir.path().join("reports/drift_202301_vs_202302.html");
    assert!(report.exists());

    // The distance distribution moved a full 6 miles, so the report must
    // carry at least one HIGH row
    let html = std::fs::read_to_string(&report).unwrap();
    assert!(html.contains("<td>HIGH</td>"));
}

#[test]
fn test_missing_raw_month_aborts_with_hint() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(BIN)
        .current_dir(dir.path())
        .args(["run", "--year", "2023", "--month", "3"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("yellow_tripdata_2023-03.parquet"));
    assert!(stderr.contains("hint"));

    assert!(!dir
        .path()
        .join("data/processed/train_2023_03.parquet")
        .exists());
    assert!(!dir.path().join("artifacts/model.json").exists());
    assert!(!dir.path().join("reports").join("drift_202303_selfcheck.html").exists());
}

#[test]
fn test_child_schema_failure_propagates_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let mut raw = raw_month(50, 0.0);
    raw.drop_in_place("trip_distance").unwrap();
    write_raw(dir.path(), 2023, 4, &mut raw);

    let output = Command::new(BIN)
        .current_dir(dir.path())
        .args(["run", "--year", "2023", "--month", "4"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(!dir
        .path()
        .join("data/processed/train_2023_04.parquet")
        .exists());
}

#[test]
fn test_ingest_subcommand_directly() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.parquet");
    let out = dir.path().join("processed.parquet");
    DataSaver::save_parquet(&mut raw_month(60, 0.0), &raw).unwrap();

    let status = Command::new(BIN)
        .args([
            "ingest",
            "--input",
            raw.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(out.exists());
}
