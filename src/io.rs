//! Dataset loading and saving
//!
//! Batches move between stages as whole Parquet files; CSV is accepted on
//! the raw side so small fixtures and ad-hoc extracts work too. Reads and
//! writes are whole-batch, no streaming.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Loader for the columnar batch formats the pipeline accepts
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file, parsing date-like columns into Datetime
    pub fn load_csv(path: &Path) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| PipelineError::Data(e.to_string()))?;

        let parse_opts = CsvParseOptions::default().with_try_parse_dates(true);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PipelineError::Data(e.to_string()))
    }

    /// Load a Parquet file
    pub fn load_parquet(path: &Path) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| PipelineError::Data(e.to_string()))?;

        ParquetReader::new(file)
            .finish()
            .map_err(|e| PipelineError::Data(e.to_string()))
    }

    /// Detect file format from extension and load
    pub fn load_auto(path: &Path) -> Result<DataFrame> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "parquet" | "pq" => Self::load_parquet(path),
            "csv" => Self::load_csv(path),
            other => Err(PipelineError::Data(format!(
                "unsupported dataset format '{other}' for {}",
                path.display()
            ))),
        }
    }
}

/// Writer for persisted feature batches
pub struct DataSaver;

impl DataSaver {
    /// Save to Parquet, creating parent directories as needed
    pub fn save_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path).map_err(|e| PipelineError::Data(e.to_string()))?;

        ParquetWriter::new(file)
            .finish(df)
            .map_err(|e| PipelineError::Data(e.to_string()))?;

        Ok(())
    }

    /// Save to CSV, creating parent directories as needed
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path).map_err(|e| PipelineError::Data(e.to_string()))?;

        CsvWriter::new(&mut file)
            .finish(df)
            .map_err(|e| PipelineError::Data(e.to_string()))
    }
}
