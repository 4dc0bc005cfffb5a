//! The two fail-fast validation gates
//!
//! `SchemaValidator` runs before any transformation; `FeatureValidator`
//! runs before a processed batch may be persisted. Checks are grouped in
//! categories: the first failing category aborts, but every offending
//! column within it is collected first so the report is complete.

use crate::error::{PipelineError, Result};
use crate::schema::{FEATURE_SCHEMA, MIN_CATEGORICAL_CARDINALITY, RAW_SCHEMA};
use polars::prelude::*;
use std::collections::HashSet;

/// First gate: the raw batch must contain every required raw column,
/// compared case-insensitively. Pure check, no side effects.
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn validate(df: &DataFrame) -> Result<()> {
        let present: HashSet<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.as_str().to_lowercase())
            .collect();

        let missing: Vec<String> = RAW_SCHEMA
            .iter()
            .filter(|spec| !present.contains(spec.name))
            .map(|spec| spec.name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(PipelineError::SchemaValidation { missing });
        }

        tracing::debug!(columns = present.len(), "raw schema check passed");
        Ok(())
    }
}

/// Second gate: the derived batch must match the feature contract exactly.
///
/// Categories, in order: column presence, nulls, declared ranges,
/// categorical cardinality. A batch failing here is never persisted.
pub struct FeatureValidator;

impl FeatureValidator {
    pub fn validate(df: &DataFrame) -> Result<()> {
        Self::check_presence(df)?;
        Self::check_nulls(df)?;
        Self::check_ranges(df)?;
        Self::check_cardinality(df)?;

        tracing::debug!(rows = df.height(), "feature contract check passed");
        Ok(())
    }

    fn check_presence(df: &DataFrame) -> Result<()> {
        let present: HashSet<&str> = df
            .get_column_names()
            .iter()
            .map(|name| name.as_str())
            .collect();

        let missing: Vec<&str> = FEATURE_SCHEMA
            .iter()
            .filter(|spec| !present.contains(spec.name))
            .map(|spec| spec.name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::FeatureValidation(format!(
                "missing feature columns {missing:?}"
            )))
        }
    }

    fn check_nulls(df: &DataFrame) -> Result<()> {
        let mut offenders = Vec::new();
        for spec in FEATURE_SCHEMA {
            if df.column(spec.name)?.null_count() > 0 {
                offenders.push(spec.name);
            }
        }

        if offenders.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::FeatureValidation(format!(
                "null values present in columns {offenders:?}"
            )))
        }
    }

    fn check_ranges(df: &DataFrame) -> Result<()> {
        let mut offenders = Vec::new();
        for spec in FEATURE_SCHEMA {
            let Some(range) = spec.range else { continue };

            let values = df
                .column(spec.name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let ca = values.f64()?;

            // Empty columns have nothing to violate
            if let (Some(lo), Some(hi)) = (ca.min(), ca.max()) {
                if lo < range.min || hi > range.max {
                    offenders.push(format!(
                        "{} (allowed [{}, {}], observed [{}, {}])",
                        spec.name, range.min, range.max, lo, hi
                    ));
                }
            }
        }

        if offenders.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::FeatureValidation(format!(
                "out-of-range values in {offenders:?}"
            )))
        }
    }

    fn check_cardinality(df: &DataFrame) -> Result<()> {
        let mut offenders = Vec::new();
        for spec in FEATURE_SCHEMA.iter().filter(|s| s.categorical) {
            let distinct = df
                .column(spec.name)?
                .as_materialized_series()
                .n_unique()?;
            if distinct < MIN_CATEGORICAL_CARDINALITY {
                offenders.push(spec.name);
            }
        }

        if offenders.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::FeatureValidation(format!(
                "categorical columns with fewer than {MIN_CATEGORICAL_CARDINALITY} distinct values {offenders:?}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_raw() -> DataFrame {
        df!(
            "tpep_pickup_datetime" => &[1_700_000_000i64, 1_700_003_600],
            "tpep_dropoff_datetime" => &[1_700_000_900i64, 1_700_004_500],
            "VendorID" => &[1i64, 2],
            "RatecodeID" => &[1i64, 1],
            "payment_type" => &[1i64, 2],
            "passenger_count" => &[1i64, 2],
            "trip_distance" => &[2.5f64, 3.1],
        )
        .unwrap()
    }

    fn valid_features() -> DataFrame {
        df!(
            "vendor_id" => &[1i64, 2, 1, 2],
            "passenger_count" => &[1i64, 2, 3, 1],
            "trip_distance" => &[1.2f64, 3.4, 2.2, 5.0],
            "rate_code" => &[1i64, 1, 2, 1],
            "payment_type" => &[1i64, 2, 1, 1],
            "pickup_hour" => &[8i64, 9, 17, 23],
            "pickup_weekday" => &[0i64, 1, 4, 6],
            "duration_min" => &[10.0f64, 15.5, 30.0, 12.0],
        )
        .unwrap()
    }

    #[test]
    fn test_raw_schema_passes_case_insensitive() {
        // VendorID / RatecodeID arrive mixed-case from the upstream source
        assert!(SchemaValidator::validate(&valid_raw()).is_ok());
    }

    #[test]
    fn test_raw_schema_lists_every_missing_column() {
        let df = valid_raw()
            .drop("VendorID")
            .unwrap()
            .drop("trip_distance")
            .unwrap();

        let err = SchemaValidator::validate(&df).unwrap_err();
        match err {
            PipelineError::SchemaValidation { missing } => {
                assert_eq!(missing, vec!["vendorid", "trip_distance"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_feature_validator_accepts_valid_batch() {
        assert!(FeatureValidator::validate(&valid_features()).is_ok());
    }

    #[test]
    fn test_feature_validator_itemizes_missing_columns() {
        let df = valid_features().drop("pickup_hour").unwrap();

        let err = FeatureValidator::validate(&df).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureValidation(_)));
        assert!(err.to_string().contains("pickup_hour"));
    }

    #[test]
    fn test_feature_validator_names_null_column() {
        let mut df = valid_features();
        df.with_column(Column::new(
            "passenger_count".into(),
            &[Some(1i64), None, Some(3), Some(1)],
        ))
        .unwrap();

        let err = FeatureValidator::validate(&df).unwrap_err();
        assert!(err.to_string().contains("null values"));
        assert!(err.to_string().contains("passenger_count"));
    }

    #[test]
    fn test_feature_validator_names_out_of_range_column() {
        let mut df = valid_features();
        df.with_column(Column::new("pickup_hour".into(), &[8i64, 9, 17, 29]))
            .unwrap();

        let err = FeatureValidator::validate(&df).unwrap_err();
        assert!(err.to_string().contains("out-of-range"));
        assert!(err.to_string().contains("pickup_hour"));
    }

    #[test]
    fn test_feature_validator_rejects_constant_categorical() {
        let mut df = valid_features();
        df.with_column(Column::new("payment_type".into(), &[1i64, 1, 1, 1]))
            .unwrap();

        let err = FeatureValidator::validate(&df).unwrap_err();
        assert!(err.to_string().contains("payment_type"));
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn test_null_check_runs_before_range_check() {
        // A column that is both null-bearing and out of range reports nulls
        let mut df = valid_features();
        df.with_column(Column::new(
            "pickup_hour".into(),
            &[Some(8i64), None, Some(17), Some(29)],
        ))
        .unwrap();

        let err = FeatureValidator::validate(&df).unwrap_err();
        assert!(err.to_string().contains("null values"));
    }
}
