//! Tripflow CLI
//!
//! Subcommands for the full monthly run and for each stage on its own.
//! The orchestrator re-invokes this binary with the stage subcommands,
//! so `ingest`, `train`, and `drift` stay directly debuggable.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::drift::DriftStage;
use crate::ingest::IngestStage;
use crate::pipeline::{MonthWindow, PipelineConfig, PipelineRunner};
use crate::train::Trainer;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tripflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Monthly trip-record pipeline: ingest, train, drift")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full monthly pipeline (ingest -> train -> drift)
    Run {
        /// Trip data year, e.g. 2023
        #[arg(long)]
        year: i32,

        /// Trip data month (1-12)
        #[arg(long)]
        month: u32,

        /// Reference year for the drift comparison
        #[arg(long, requires = "ref_month")]
        ref_year: Option<i32>,

        /// Reference month for the drift comparison
        #[arg(long, requires = "ref_year")]
        ref_month: Option<u32>,
    },

    /// Ingest one raw batch into a validated feature batch
    Ingest {
        /// Raw input file (Parquet or CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Output Parquet path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Train the duration model on a processed batch
    Train {
        /// Processed feature batch (Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Model artifact output path
        #[arg(long, default_value = "artifacts/model.json")]
        model_out: PathBuf,
    },

    /// Score feature drift between two processed batches
    Drift {
        /// Reference batch (Parquet)
        #[arg(long)]
        reference: PathBuf,

        /// Current batch (Parquet)
        #[arg(long)]
        current: PathBuf,

        /// Output HTML report path
        #[arg(short, long)]
        out: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(
    year: i32,
    month: u32,
    ref_year: Option<i32>,
    ref_month: Option<u32>,
) -> anyhow::Result<()> {
    let window = MonthWindow::new(year, month)?;
    let reference = match (ref_year, ref_month) {
        (Some(y), Some(m)) => Some(MonthWindow::new(y, m)?),
        _ => None,
    };

    section(&format!("Monthly pipeline {window}"));
    let start = Instant::now();

    let runner = PipelineRunner::new(PipelineConfig::default());
    let outcome = runner.run_month(window, reference)?;

    section(&format!("Done in {:?}", start.elapsed()));
    step_ok(&format!("processed: {}", outcome.processed.display()));
    step_ok(&format!("model:     {}", outcome.model.display()));
    step_ok(&format!("drift:     {}", outcome.report.display()));
    Ok(())
}

pub fn cmd_ingest(input: &Path, output: &Path) -> anyhow::Result<()> {
    section("Ingest");
    let start = Instant::now();

    let rows = IngestStage::run(input, output)?;

    step_ok(&format!("{rows} rows in {:?}", start.elapsed()));
    step_ok(&format!("saved {}", output.display()));
    Ok(())
}

pub fn cmd_train(data: &Path, model_out: &Path) -> anyhow::Result<()> {
    section("Train");
    let start = Instant::now();

    let model = Trainer::default().run(data, model_out)?;

    step_ok(&format!(
        "fit {} rows; val MAE {:.3} in {:?}",
        model.n_train_rows,
        model.val_mae,
        start.elapsed()
    ));
    step_ok(&format!("saved {}", model_out.display()));
    Ok(())
}

pub fn cmd_drift(reference: &Path, current: &Path, out: &Path) -> anyhow::Result<()> {
    section("Drift");
    let start = Instant::now();

    let report = DriftStage::run(reference, current, out)?;

    step_ok(&format!("{} in {:?}", report.summary(), start.elapsed()));
    step_ok(&format!("saved {}", out.display()));
    Ok(())
}
