//! Ingest stage: raw trip batch to validated feature batch
//!
//! Runs the two validation gates around feature engineering. The raw
//! schema gate fires before any transformation so a malformed extract
//! fails fast; the feature gate fires after, on the exact frame that
//! gets persisted.

use crate::error::Result;
use crate::features::FeatureEngineer;
use crate::io::{DataLoader, DataSaver};
use crate::schema::{FeatureValidator, SchemaValidator};
use std::path::Path;

pub struct IngestStage;

impl IngestStage {
    /// Load a raw batch, validate, engineer features, persist as Parquet.
    /// Returns the number of rows written.
    pub fn run(input: &Path, output: &Path) -> Result<usize> {
        let raw = DataLoader::load_auto(input)?;
        tracing::info!(rows = raw.height(), path = %input.display(), "loaded raw batch");

        SchemaValidator::validate(&raw)?;

        let mut features = FeatureEngineer::transform(raw)?;
        FeatureValidator::validate(&features)?;

        DataSaver::save_parquet(&mut features, output)?;
        tracing::info!(
            rows = features.height(),
            path = %output.display(),
            "saved processed batch"
        );

        Ok(features.height())
    }
}
