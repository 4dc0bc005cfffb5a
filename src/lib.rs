//! Tripflow - Monthly trip-record pipeline
//!
//! Ingests raw yellow-taxi trip batches, enforces schema and feature
//! contracts, trains a duration model, and scores distributional drift
//! between months with the Population Stability Index. Every validation
//! failure is a hard stop: the pipeline refuses to propagate bad data
//! forward.
//!
//! # Modules
//!
//! ## Pipeline stages
//! - [`ingest`] - Raw batch to validated feature batch
//! - [`train`] - Least-squares duration model with validation MAE
//! - [`drift`] - PSI scoring and the ranked HTML report
//! - [`pipeline`] - Monthly orchestrator running the stages as child processes
//!
//! ## Data contracts
//! - [`schema`] - Column descriptors and both validation gates
//! - [`features`] - Feature engineering over raw trip records
//!
//! ## Infrastructure
//! - [`error`] - Pipeline error taxonomy and exit codes
//! - [`io`] - Parquet/CSV batch loading and saving
//! - [`model`] - Duration model artifact with constant fallback
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data contracts
pub mod schema;
pub mod features;

// Pipeline stages
pub mod ingest;
pub mod train;
pub mod drift;
pub mod pipeline;

// Infrastructure
pub mod io;
pub mod model;
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::drift::{DriftReport, DriftScorer, DriftStage, PsiScorer, Severity};
    pub use crate::error::{PipelineError, Result};
    pub use crate::features::FeatureEngineer;
    pub use crate::ingest::IngestStage;
    pub use crate::io::{DataLoader, DataSaver};
    pub use crate::model::{LinearModel, Model, PredictionInput};
    pub use crate::pipeline::{MonthWindow, PipelineConfig, PipelineRunner};
    pub use crate::schema::{FeatureValidator, SchemaValidator};
    pub use crate::train::Trainer;
}
