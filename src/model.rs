//! Model artifact handling
//!
//! The serving model is a tagged handle: either the constant fallback used
//! before any training run has produced an artifact, or a fitted linear
//! model. Dispatch is explicit on the variant, never by inspecting
//! structure, and the handle is owned by its caller rather than living in
//! process-global state.

use crate::error::{PipelineError, Result};
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One feature row at serving time: the feature schema minus the target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    pub vendor_id: i64,
    pub passenger_count: i64,
    pub trip_distance: f64,
    pub rate_code: i64,
    pub payment_type: i64,
    pub pickup_hour: i64,
    pub pickup_weekday: i64,
}

impl PredictionInput {
    fn value(&self, feature: &str) -> Option<f64> {
        match feature {
            "vendor_id" => Some(self.vendor_id as f64),
            "passenger_count" => Some(self.passenger_count as f64),
            "trip_distance" => Some(self.trip_distance),
            "rate_code" => Some(self.rate_code as f64),
            "payment_type" => Some(self.payment_type as f64),
            "pickup_hour" => Some(self.pickup_hour as f64),
            "pickup_weekday" => Some(self.pickup_weekday as f64),
            _ => None,
        }
    }
}

/// Fitted least-squares duration model, persisted as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    /// Feature order the coefficients were fitted in
    pub feature_names: Vec<String>,
    pub coefficients: Array1<f64>,
    pub intercept: f64,
    /// Validation mean absolute error at fit time
    pub val_mae: f64,
    pub n_train_rows: usize,
    pub trained_at: DateTime<Utc>,
}

impl LinearModel {
    pub fn predict_row(&self, x: &Array1<f64>) -> f64 {
        x.dot(&self.coefficients) + self.intercept
    }

    /// Persist the artifact, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// The serving model handle
#[derive(Debug, Clone)]
pub enum Model {
    /// Flat prediction used when no artifact exists yet
    Constant { value: f64 },
    Fitted(LinearModel),
}

impl Model {
    /// Fallback prediction in minutes when no artifact has been trained
    pub const DEFAULT_CONSTANT_MINUTES: f64 = 12.0;

    /// Load the artifact at `path`, or the constant fallback when the
    /// file does not exist. A present-but-unreadable artifact is an
    /// error, not a silent fallback.
    pub fn load(path: &Path) -> Result<Model> {
        if !path.exists() {
            return Ok(Model::Constant {
                value: Self::DEFAULT_CONSTANT_MINUTES,
            });
        }
        Ok(Model::Fitted(LinearModel::load(path)?))
    }

    /// Predict the trip duration in minutes for one feature row
    pub fn predict(&self, input: &PredictionInput) -> Result<f64> {
        match self {
            Model::Constant { value } => Ok(*value),
            Model::Fitted(model) => {
                let values = model
                    .feature_names
                    .iter()
                    .map(|name| {
                        input.value(name).ok_or_else(|| {
                            PipelineError::Data(format!("model expects unknown feature '{name}'"))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?;
                Ok(model.predict_row(&Array1::from_vec(values)))
            }
        }
    }
}
