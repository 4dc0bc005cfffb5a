//! Feature engineering: raw trip records to the model-input schema
//!
//! The transform is a fixed sequence of filters and derivations. Row order
//! is preserved except where filtering removes rows, and no per-row anomaly
//! ever raises: unparseable or out-of-range rows are silently dropped, so
//! callers observe only the final row count.

use crate::error::Result;
use crate::schema::{ColumnKind, RAW_SCHEMA};
use polars::prelude::*;

/// Column names selected into the output, pre-rename, in contract order
const OUTPUT_COLUMNS: &[&str] = &[
    "vendorid",
    "passenger_count",
    "trip_distance",
    "ratecodeid",
    "payment_type",
    "pickup_hour",
    "pickup_weekday",
    "duration_min",
];

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;

/// Transforms a schema-validated raw batch into a feature batch
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Run the full transform. Steps, in order: lowercase names, distance
    /// filter, pickup-time derivations, duration derivation and filter,
    /// numeric coercion, passenger filter, projection with null drop,
    /// canonical renames.
    pub fn transform(df: DataFrame) -> Result<DataFrame> {
        let mut df = Self::lowercase_columns(df)?;

        df = Self::filter_by(df, "trip_distance", |v| (0.0..=100.0).contains(&v))?;

        let pickup = Self::epoch_seconds(&df, "tpep_pickup_datetime")?;
        let dropoff = Self::epoch_seconds(&df, "tpep_dropoff_datetime")?;

        let hours: Vec<Option<i64>> = pickup
            .iter()
            .map(|v| v.map(|t| t.rem_euclid(SECS_PER_DAY) / SECS_PER_HOUR))
            .collect();
        // Day 0 of the epoch was a Thursday; +3 shifts to Monday = 0
        let weekdays: Vec<Option<i64>> = pickup
            .iter()
            .map(|v| v.map(|t| (t.div_euclid(SECS_PER_DAY) + 3).rem_euclid(7)))
            .collect();
        let durations: Vec<Option<f64>> = pickup
            .iter()
            .zip(dropoff.iter())
            .map(|(p, d)| match (p, d) {
                (Some(p), Some(d)) => Some((d - p) as f64 / 60.0),
                _ => None,
            })
            .collect();

        df.with_column(Column::new("pickup_hour".into(), hours))?;
        df.with_column(Column::new("pickup_weekday".into(), weekdays))?;
        df.with_column(Column::new("duration_min".into(), durations))?;

        df = Self::filter_by(df, "duration_min", |v| v > 0.0 && v <= 180.0)?;

        df = Self::coerce_numerics(df)?;

        df = Self::filter_by(df, "passenger_count", |v| (0.0..=8.0).contains(&v))?;

        df = Self::project_and_drop_nulls(df)?;

        df.rename("vendorid", "vendor_id".into())?;
        df.rename("ratecodeid", "rate_code".into())?;

        Ok(df)
    }

    fn lowercase_columns(mut df: DataFrame) -> Result<DataFrame> {
        let renames: Vec<(String, String)> = df
            .get_column_names()
            .iter()
            .map(|name| (name.to_string(), name.to_lowercase()))
            .collect();

        for (old, new) in renames {
            if old != new {
                df.rename(&old, new.into())?;
            }
        }
        Ok(df)
    }

    /// Keep rows where `column`, viewed as f64, satisfies `keep`.
    /// Nulls and unparseable values never satisfy it and are dropped.
    fn filter_by<F>(df: DataFrame, column: &str, keep: F) -> Result<DataFrame>
    where
        F: Fn(f64) -> bool,
    {
        let values = df
            .column(column)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        let mask: BooleanChunked = values
            .f64()?
            .into_iter()
            .map(|v| Some(v.is_some_and(&keep)))
            .collect();

        Ok(df.filter(&mask)?)
    }

    /// Extract a timestamp-like column as epoch seconds, null on failure.
    ///
    /// Accepts Datetime of any time unit, Int64 already in epoch seconds,
    /// or strings parseable as datetimes.
    fn epoch_seconds(df: &DataFrame, column: &str) -> Result<Vec<Option<i64>>> {
        let series = df.column(column)?.as_materialized_series().clone();

        let (series, divisor) = match series.dtype() {
            DataType::Datetime(TimeUnit::Nanoseconds, _) => {
                (series.cast(&DataType::Int64)?, 1_000_000_000i64)
            }
            DataType::Datetime(TimeUnit::Microseconds, _) => {
                (series.cast(&DataType::Int64)?, 1_000_000)
            }
            DataType::Datetime(TimeUnit::Milliseconds, _) => {
                (series.cast(&DataType::Int64)?, 1_000)
            }
            DataType::String => {
                let parsed = series.cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
                (parsed.cast(&DataType::Int64)?, 1_000_000)
            }
            _ => (series.cast(&DataType::Int64)?, 1),
        };

        let ca = series.i64()?;
        Ok(ca
            .into_iter()
            .map(|v| v.map(|t| t.div_euclid(divisor)))
            .collect())
    }

    /// Cast the numeric-ish raw columns to their contract kinds.
    /// The cast is non-strict: values that do not convert become nulls,
    /// which the projection step drops.
    fn coerce_numerics(mut df: DataFrame) -> Result<DataFrame> {
        for spec in RAW_SCHEMA.iter().filter(|s| s.kind != ColumnKind::Datetime) {
            if let Ok(col) = df.column(spec.name) {
                let dtype = match spec.kind {
                    ColumnKind::Float => DataType::Float64,
                    _ => DataType::Int64,
                };
                let cast = col.as_materialized_series().cast(&dtype)?;
                df.with_column(cast)?;
            }
        }
        Ok(df)
    }

    fn project_and_drop_nulls(df: DataFrame) -> Result<DataFrame> {
        let present: Vec<&str> = OUTPUT_COLUMNS
            .iter()
            .copied()
            .filter(|c| df.get_column_names().iter().any(|n| n.as_str() == *c))
            .collect();

        let df = df.select(present)?;

        let mut keep = BooleanChunked::full("keep".into(), true, df.height());
        for col in df.get_columns() {
            keep = &keep & &col.as_materialized_series().is_not_null();
        }

        Ok(df.filter(&keep)?)
    }
}
