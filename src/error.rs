//! Error types for the tripflow pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline
///
/// Every validation failure is a hard stop: the pipeline refuses to
/// propagate bad data forward rather than recovering silently.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("schema validation failed: missing raw columns {missing:?}")]
    SchemaValidation { missing: Vec<String> },

    #[error("feature validation failed: {0}")]
    FeatureValidation(String),

    #[error("missing required input: {path}\n{hint}")]
    PreconditionMissing { path: String, hint: String },

    #[error("stage '{stage}' failed with exit code {code}")]
    StageExecution { stage: String, code: i32 },

    #[error("data error: {0}")]
    Data(String),

    #[error("computation error: {0}")]
    Computation(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Exit code the process should terminate with when this error
    /// aborts a run. Stage failures propagate the child's code unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::StageExecution { code, .. } => *code,
            PipelineError::SchemaValidation { .. } | PipelineError::FeatureValidation(_) => 2,
            PipelineError::PreconditionMissing { .. } => 3,
            _ => 1,
        }
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}
