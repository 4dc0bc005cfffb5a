//! Drift report assembly and HTML rendering
//!
//! One row per feature common to both batches (target excluded, numeric
//! on the reference side), ranked worst-first: fixed severity order, ties
//! broken by descending score.

use crate::drift::{PsiScorer, Severity};
use crate::error::Result;
use crate::schema::TARGET_COLUMN;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

/// Drift outcome for a single feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftRow {
    pub feature: String,
    /// PSI rounded to 4 decimals; 0.0 when the score is undefined
    pub psi: f64,
    pub level: Severity,
    pub ref_mean: Option<f64>,
    pub cur_mean: Option<f64>,
    pub ref_std: Option<f64>,
    pub cur_std: Option<f64>,
}

/// Full comparison of a reference batch against a current batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub reference: String,
    pub current: String,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<DriftRow>,
}

impl DriftReport {
    /// One-line digest for logging
    pub fn summary(&self) -> String {
        match self.rows.first() {
            Some(worst) => format!(
                "{} features compared; worst level {} (psi {:.4} on {})",
                self.rows.len(),
                worst.level,
                worst.psi,
                worst.feature
            ),
            None => "no features compared".to_string(),
        }
    }

    /// Render the self-contained HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!doctype html><html><head><meta charset='utf-8'>");
        html.push_str(STYLE);
        html.push_str("</head><body>");
        html.push_str("<h1>Drift Report (PSI)</h1>");
        html.push_str(&format!(
            "<div class='meta'>Ref: {}<br/>Cur: {}<br/>Generated: {}</div>",
            self.reference,
            self.current,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));

        html.push_str("<table><thead><tr>");
        for heading in [
            "feature", "psi", "level", "ref_mean", "cur_mean", "ref_std", "cur_std",
        ] {
            html.push_str(&format!("<th>{heading}</th>"));
        }
        html.push_str("</tr></thead><tbody>");

        for row in &self.rows {
            html.push_str(&format!("<tr class='{}'>", row.level.css_class()));
            html.push_str(&format!("<td>{}</td>", row.feature));
            html.push_str(&format!("<td>{:.4}</td>", row.psi));
            html.push_str(&format!("<td>{}</td>", row.level));
            for stat in [row.ref_mean, row.cur_mean, row.ref_std, row.cur_std] {
                html.push_str(&format!("<td>{}</td>", fmt_stat(stat)));
            }
            html.push_str("</tr>");
        }

        html.push_str("</tbody></table></body></html>");
        html
    }

    /// Write the HTML document, creating parent directories as needed
    pub fn save_html(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_html())?;
        Ok(())
    }
}

const STYLE: &str = "<style>\
body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial; margin: 24px; }\
h1 { margin-bottom: 0; }\
.meta { color: #666; margin-top: 4px; }\
table { border-collapse: collapse; width: 100%; margin-top: 16px; }\
th, td { border: 1px solid #ddd; padding: 8px; text-align: right; }\
th { background: #f6f6f6; }\
td:first-child, th:first-child { text-align: left; }\
.HIGH { background: #ffe5e5; }\
.MODERATE { background: #fff3cd; }\
.LOW { background: #e7f3ff; }\
.NONE { background: #f7fff3; }\
.NA { background: #f0f0f0; }\
</style>";

fn fmt_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "n/a".to_string(),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Compares two feature batches column by column
pub struct DriftScorer {
    scorer: PsiScorer,
}

impl Default for DriftScorer {
    fn default() -> Self {
        Self::new(10)
    }
}

impl DriftScorer {
    pub fn new(n_bins: usize) -> Self {
        Self {
            scorer: PsiScorer::new(n_bins),
        }
    }

    /// Build the ranked report. `ref_name` and `cur_name` identify the two
    /// source datasets in the report header.
    pub fn compare(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        ref_name: &str,
        cur_name: &str,
    ) -> Result<DriftReport> {
        let mut rows = Vec::new();

        for column in reference.get_columns() {
            let name = column.name().as_str();
            if name == TARGET_COLUMN || !is_numeric(column.dtype()) {
                continue;
            }
            if current.column(name).is_err() {
                continue;
            }

            let ref_vals = numeric_values(reference, name)?;
            let cur_vals = numeric_values(current, name)?;

            let score = self.scorer.score(&ref_vals, &cur_vals);
            let (psi, level) = match score {
                Some(v) if !v.is_nan() => (round4(v), Severity::from_psi(v)),
                _ => (0.0, Severity::Undefined),
            };

            let (ref_mean, ref_std) = side_stats(&ref_vals);
            let (cur_mean, cur_std) = side_stats(&cur_vals);

            rows.push(DriftRow {
                feature: name.to_string(),
                psi,
                level,
                ref_mean,
                cur_mean,
                ref_std,
                cur_std,
            });
        }

        rank_rows(&mut rows);

        Ok(DriftReport {
            reference: ref_name.to_string(),
            current: cur_name.to_string(),
            generated_at: Utc::now(),
            rows,
        })
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Non-null, non-NaN values of a column as f64
fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// Display mean and sample standard deviation, `None` when undefined
fn side_stats(values: &[f64]) -> (Option<f64>, Option<f64>) {
    let n = values.len();
    if n == 0 {
        return (None, None);
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (Some(round4(mean)), None);
    }

    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (Some(round4(mean)), Some(round4(var.sqrt())))
}

/// Fixed severity order (worst first), ties broken by descending score
fn rank_rows(rows: &mut [DriftRow]) {
    rows.sort_by(|a, b| {
        a.level
            .rank()
            .cmp(&b.level.rank())
            .then(b.psi.partial_cmp(&a.psi).unwrap_or(Ordering::Equal))
    });
}
