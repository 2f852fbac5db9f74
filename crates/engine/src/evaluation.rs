//! Error metrics and per-model comparison reports

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

fn check_lengths(truth: &[f64], predicted: &[f64]) -> Result<()> {
    if truth.len() != predicted.len() {
        return Err(RecommendError::ShapeMismatch {
            truth: truth.len(),
            predicted: predicted.len(),
        });
    }
    if truth.is_empty() {
        return Err(RecommendError::EmptyInput {
            what: "evaluation values",
        });
    }
    Ok(())
}

/// Mean absolute error
pub fn mae(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(truth, predicted)?;
    let total: f64 = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).abs())
        .sum();
    Ok(total / truth.len() as f64)
}

/// Mean squared error
pub fn mse(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(truth, predicted)?;
    let total: f64 = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(total / truth.len() as f64)
}

/// Root mean squared error
pub fn rmse(truth: &[f64], predicted: &[f64]) -> Result<f64> {
    Ok(mse(truth, predicted)?.sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
}

impl ErrorMetrics {
    pub fn compute(truth: &[f64], predicted: &[f64]) -> Result<Self> {
        let mae = mae(truth, predicted)?;
        let mse = mse(truth, predicted)?;
        Ok(Self {
            mae,
            mse,
            rmse: mse.sqrt(),
        })
    }
}

impl fmt::Display for ErrorMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE={:.4} MSE={:.4} RMSE={:.4}",
            self.mae, self.mse, self.rmse
        )
    }
}

/// Metrics of one named model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRun {
    pub name: String,
    pub metrics: ErrorMetrics,
}

/// Metrics for several models on the same held-out data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub runs: Vec<ModelRun>,
}

impl EvaluationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, metrics: ErrorMetrics) {
        self.runs.push(ModelRun {
            name: name.into(),
            metrics,
        });
    }

    pub fn get(&self, name: &str) -> Option<&ErrorMetrics> {
        self.runs
            .iter()
            .find(|run| run.name == name)
            .map(|run| &run.metrics)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .runs
            .iter()
            .map(|run| run.name.len())
            .chain(std::iter::once("model".len()))
            .max()
            .unwrap_or(0);

        writeln!(f, "{:<width$}  {:>8}  {:>8}  {:>8}", "model", "MAE", "MSE", "RMSE")?;
        for run in &self.runs {
            writeln!(
                f,
                "{:<width$}  {:>8.4}  {:>8.4}  {:>8.4}",
                run.name, run.metrics.mae, run.metrics.mse, run.metrics.rmse
            )?;
        }
        Ok(())
    }
}
