//! Static schema descriptors for the raw and feature batch contracts
//!
//! Both pipeline gates check batches structurally against these ordered
//! descriptors instead of duck-typing on column names at call sites. The
//! raw descriptor governs presence only (types are enforced downstream by
//! coercion); the feature descriptor carries the full range and
//! cardinality constraints.

pub mod validate;

pub use validate::{FeatureValidator, SchemaValidator};

/// Expected value kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Datetime,
}

/// Inclusive numeric bounds a column's values must satisfy
#[derive(Debug, Clone, Copy)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One column of a batch contract: name, kind, constraints
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Inclusive range the validator enforces, when declared
    pub range: Option<ValueRange>,
    /// Categorical columns must show at least [`MIN_CATEGORICAL_CARDINALITY`]
    /// distinct values across a batch
    pub categorical: bool,
}

impl ColumnSpec {
    const fn numeric(name: &'static str, kind: ColumnKind, min: f64, max: f64) -> Self {
        Self {
            name,
            kind,
            range: Some(ValueRange::new(min, max)),
            categorical: false,
        }
    }

    const fn categorical(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            kind: ColumnKind::Int,
            range: Some(ValueRange::new(min, max)),
            categorical: true,
        }
    }

    const fn raw(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            range: None,
            categorical: false,
        }
    }
}

/// Minimum distinct values a categorical column must exhibit per batch
pub const MIN_CATEGORICAL_CARDINALITY: usize = 2;

/// The prediction target; present in processed batches, absent at serving
pub const TARGET_COLUMN: &str = "duration_min";

/// Raw batch contract: these columns must exist (case-insensitive) before
/// any transformation runs
pub static RAW_SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::raw("tpep_pickup_datetime", ColumnKind::Datetime),
    ColumnSpec::raw("tpep_dropoff_datetime", ColumnKind::Datetime),
    ColumnSpec::raw("vendorid", ColumnKind::Int),
    ColumnSpec::raw("ratecodeid", ColumnKind::Int),
    ColumnSpec::raw("payment_type", ColumnKind::Int),
    ColumnSpec::raw("passenger_count", ColumnKind::Int),
    ColumnSpec::raw("trip_distance", ColumnKind::Float),
];

/// Feature batch contract: the exact model-input schema, in order
pub static FEATURE_SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::categorical("vendor_id", 0.0, f64::INFINITY),
    ColumnSpec::numeric("passenger_count", ColumnKind::Int, 0.0, 8.0),
    ColumnSpec::numeric("trip_distance", ColumnKind::Float, 0.0, 100.0),
    ColumnSpec::categorical("rate_code", 0.0, f64::INFINITY),
    ColumnSpec::categorical("payment_type", 0.0, f64::INFINITY),
    ColumnSpec::numeric("pickup_hour", ColumnKind::Int, 0.0, 23.0),
    ColumnSpec::numeric("pickup_weekday", ColumnKind::Int, 0.0, 6.0),
    ColumnSpec::numeric(TARGET_COLUMN, ColumnKind::Float, 0.0, 180.0),
];

/// Ordered names of every required feature column
pub fn feature_names() -> Vec<&'static str> {
    FEATURE_SCHEMA.iter().map(|spec| spec.name).collect()
}

/// Feature columns the model is served with (target excluded)
pub fn serving_features() -> Vec<&'static str> {
    FEATURE_SCHEMA
        .iter()
        .map(|spec| spec.name)
        .filter(|name| *name != TARGET_COLUMN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_schema_shape() {
        assert_eq!(FEATURE_SCHEMA.len(), 8);
        assert_eq!(serving_features().len(), 7);
        assert!(!serving_features().contains(&TARGET_COLUMN));

        let categoricals: Vec<&str> = FEATURE_SCHEMA
            .iter()
            .filter(|s| s.categorical)
            .map(|s| s.name)
            .collect();
        assert_eq!(categoricals, vec!["vendor_id", "rate_code", "payment_type"]);
    }

    #[test]
    fn test_range_contains() {
        let range = ValueRange::new(0.0, 8.0);
        assert!(range.contains(0.0));
        assert!(range.contains(8.0));
        assert!(!range.contains(8.5));
        assert!(!range.contains(-1.0));
    }

    #[test]
    fn test_raw_schema_names_are_lowercase() {
        for spec in RAW_SCHEMA {
            assert_eq!(spec.name, spec.name.to_lowercase());
        }
    }
}
