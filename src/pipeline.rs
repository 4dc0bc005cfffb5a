//! Monthly pipeline orchestrator
//!
//! Drives ingest, train, and drift as blocking child processes of the
//! current executable so each stage keeps single-process semantics and a
//! failed stage stops the month run with its own exit code. Inputs are
//! checked in-process before a stage is spawned; a missing file aborts
//! with a remediation hint instead of a stage traceback.

use crate::error::{PipelineError, Result};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

const RAW_DATA_URL: &str = "https://d37ci6vzurychx.cloudfront.net/trip-data";

/// One calendar month of trip data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(PipelineError::Data(format!(
                "month must be in 1..=12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Filesystem layout of one pipeline workspace
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    root: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl PipelineConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Upstream file name for a month of yellow-taxi records
    pub fn raw_file_name(window: MonthWindow) -> String {
        format!(
            "yellow_tripdata_{:04}-{:02}.parquet",
            window.year, window.month
        )
    }

    pub fn raw_path(&self, window: MonthWindow) -> PathBuf {
        self.root
            .join("data")
            .join("raw")
            .join(Self::raw_file_name(window))
    }

    pub fn processed_path(&self, window: MonthWindow) -> PathBuf {
        self.root.join("data").join("processed").join(format!(
            "train_{:04}_{:02}.parquet",
            window.year, window.month
        ))
    }

    pub fn model_path(&self) -> PathBuf {
        self.root.join("artifacts").join("model.json")
    }

    /// Report path; self-check naming when no reference month is given
    pub fn report_path(&self, window: MonthWindow, reference: Option<MonthWindow>) -> PathBuf {
        let name = match reference {
            Some(r) => format!(
                "drift_{:04}{:02}_vs_{:04}{:02}.html",
                r.year, r.month, window.year, window.month
            ),
            None => format!("drift_{:04}{:02}_selfcheck.html", window.year, window.month),
        };
        self.root.join("reports").join(name)
    }

    /// Create the workspace directory layout
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in ["data/raw", "data/processed", "reports", "artifacts"] {
            std::fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }
}

/// Paths produced by a completed month run
#[derive(Debug)]
pub struct PipelineOutcome {
    pub processed: PathBuf,
    pub model: PathBuf,
    pub report: PathBuf,
}

/// Runs the ingest -> train -> drift sequence for one month
pub struct PipelineRunner {
    config: PipelineConfig,
}

impl PipelineRunner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the full month pipeline. With a reference month the drift stage
    /// compares against that month's processed batch; without one it
    /// compares the current batch against itself as a wiring check.
    pub fn run_month(
        &self,
        window: MonthWindow,
        reference: Option<MonthWindow>,
    ) -> Result<PipelineOutcome> {
        self.config.ensure_dirs()?;

        let raw_path = self.config.raw_path(window);
        let processed = self.config.processed_path(window);
        let model = self.config.model_path();

        if !raw_path.exists() {
            return Err(PipelineError::PreconditionMissing {
                path: raw_path.display().to_string(),
                hint: download_hint(&raw_path, window),
            });
        }

        run_stage(
            "ingest",
            &[
                OsStr::new("ingest"),
                OsStr::new("--input"),
                raw_path.as_os_str(),
                OsStr::new("--output"),
                processed.as_os_str(),
            ],
        )?;

        // Overwrites the previous artifact; the model always tracks the
        // most recently ingested month.
        run_stage(
            "train",
            &[
                OsStr::new("train"),
                OsStr::new("--data"),
                processed.as_os_str(),
                OsStr::new("--model-out"),
                model.as_os_str(),
            ],
        )?;

        let report = match reference {
            Some(ref_window) => {
                let ref_path = self.config.processed_path(ref_window);
                if !ref_path.exists() {
                    return Err(PipelineError::PreconditionMissing {
                        path: ref_path.display().to_string(),
                        hint: format!(
                            "[hint] Generate it first (run the pipeline for {ref_window})."
                        ),
                    });
                }
                let out = self.config.report_path(window, Some(ref_window));
                run_stage(
                    "drift",
                    &[
                        OsStr::new("drift"),
                        OsStr::new("--reference"),
                        ref_path.as_os_str(),
                        OsStr::new("--current"),
                        processed.as_os_str(),
                        OsStr::new("--out"),
                        out.as_os_str(),
                    ],
                )?;
                out
            }
            None => {
                let out = self.config.report_path(window, None);
                run_stage(
                    "drift",
                    &[
                        OsStr::new("drift"),
                        OsStr::new("--reference"),
                        processed.as_os_str(),
                        OsStr::new("--current"),
                        processed.as_os_str(),
                        OsStr::new("--out"),
                        out.as_os_str(),
                    ],
                )?;
                out
            }
        };

        Ok(PipelineOutcome {
            processed,
            model,
            report,
        })
    }
}

/// Spawn a stage subcommand of this binary and wait for it, inheriting
/// stdio. Non-zero child exits propagate as stage failures.
fn run_stage(stage: &str, args: &[&OsStr]) -> Result<()> {
    let exe = std::env::current_exe()?;

    let rendered: Vec<String> = args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    println!("\n$ {} {}", exe.display(), rendered.join(" "));

    let status = Command::new(exe).args(args).status()?;
    if !status.success() {
        return Err(PipelineError::StageExecution {
            stage: stage.to_string(),
            code: status.code().unwrap_or(-1),
        });
    }

    tracing::info!(stage, "stage finished");
    Ok(())
}

fn download_hint(raw_path: &Path, window: MonthWindow) -> String {
    format!(
        "[hint] Download it with:\n       curl -o \"{}\" \"{}/{}\"",
        raw_path.display(),
        RAW_DATA_URL,
        PipelineConfig::raw_file_name(window)
    )
}
