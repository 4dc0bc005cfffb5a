//! Training stage: least-squares duration model
//!
//! Fits `duration_min` on the seven serving features over a processed
//! batch, holds out a shuffled validation split for the MAE metric, and
//! persists the artifact for [`crate::model::Model::load`].

use crate::error::{PipelineError, Result};
use crate::io::DataLoader;
use crate::model::LinearModel;
use crate::schema::{serving_features, TARGET_COLUMN};
use chrono::Utc;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;

/// Trainer with a reproducible validation split
pub struct Trainer {
    validation_split: f64,
    seed: u64,
}

impl Default for Trainer {
    fn default() -> Self {
        Self {
            validation_split: 0.2,
            seed: 42,
        }
    }
}

impl Trainer {
    /// Load a processed batch, fit, persist the artifact, return the model
    pub fn run(&self, data_path: &Path, model_path: &Path) -> Result<LinearModel> {
        let df = DataLoader::load_auto(data_path)?;
        let model = self.fit(&df)?;
        model.save(model_path)?;
        tracing::info!(
            path = %model_path.display(),
            "model saved; val MAE={:.3}",
            model.val_mae
        );
        Ok(model)
    }

    /// Fit on a feature batch already conforming to the feature contract
    pub fn fit(&self, df: &DataFrame) -> Result<LinearModel> {
        let features = serving_features();
        let x = columns_to_array2(df, &features)?;
        let y = column_to_array1(df, TARGET_COLUMN)?;

        let (x_train, x_val, y_train, y_val) = self.shuffled_split(&x, &y)?;

        let (coefficients, intercept) = fit_least_squares(&x_train, &y_train)?;

        let preds = x_val.dot(&coefficients) + intercept;
        let val_mae = mean_absolute_error(&y_val, &preds);

        Ok(LinearModel {
            feature_names: features.iter().map(|s| s.to_string()).collect(),
            coefficients,
            intercept,
            val_mae,
            n_train_rows: x_train.nrows(),
            trained_at: Utc::now(),
        })
    }

    fn shuffled_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>)> {
        let n = x.nrows();
        let val_size = (n as f64 * self.validation_split) as usize;
        let train_size = n - val_size;

        if train_size < 2 || val_size < 1 {
            return Err(PipelineError::Data(format!(
                "not enough rows to train on ({n})"
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let gather_rows = |idx: &[usize]| {
            Array2::from_shape_fn((idx.len(), x.ncols()), |(r, c)| x[[idx[r], c]])
        };
        let gather_vals = |idx: &[usize]| idx.iter().map(|&i| y[i]).collect::<Array1<f64>>();

        Ok((
            gather_rows(&indices[..train_size]),
            gather_rows(&indices[train_size..]),
            gather_vals(&indices[..train_size]),
            gather_vals(&indices[train_size..]),
        ))
    }
}

/// Extract named columns into a row-major f64 matrix
fn columns_to_array2(df: &DataFrame, names: &[&str]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let col_data: Vec<Vec<f64>> = names
        .iter()
        .map(|name| -> Result<Vec<f64>> {
            let series = df
                .column(name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            Ok(series
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect())
        })
        .collect::<Result<_>>()?;

    Ok(Array2::from_shape_fn((n_rows, names.len()), |(r, c)| {
        col_data[c][r]
    }))
}

fn column_to_array1(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect())
}

/// Centered ordinary least squares via the normal equations
fn fit_least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Result<(Array1<f64>, f64)> {
    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| PipelineError::Computation("empty feature matrix".to_string()))?;
    let y_mean = y.mean().unwrap_or(0.0);

    let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
    let y_centered = y - y_mean;

    let xtx = x_centered.t().dot(&x_centered);
    let xty = x_centered.t().dot(&y_centered);

    let coefficients = cholesky_solve(&xtx, &xty).ok_or_else(|| {
        PipelineError::Computation("normal equations are singular".to_string())
    })?;

    let intercept = y_mean - coefficients.dot(&x_mean);
    Ok((coefficients, intercept))
}

/// Solve the symmetric system Ax = b by Cholesky decomposition, retrying
/// once with a small ridge term when A is not positive definite (constant
/// or collinear feature columns).
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let l = match cholesky_factor(a) {
        Some(l) => l,
        None => {
            let n = a.nrows();
            let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
            let mut a_reg = a.clone();
            for k in 0..n {
                a_reg[[k, k]] += ridge;
            }
            cholesky_factor(&a_reg)?
        }
    };

    let n = l.nrows();

    // Forward substitution: L * u = b
    let mut u = Array1::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * u[j]).sum();
        u[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = u
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (u[i] - sum) / l[[i, i]];
    }

    Some(x)
}

fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    Some(l)
}

fn mean_absolute_error(truth: &Array1<f64>, preds: &Array1<f64>) -> f64 {
    truth
        .iter()
        .zip(preds.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / truth.len() as f64
}
