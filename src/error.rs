//! Error types surfaced by the library.
//!
//! Soft conditions (failed calibration, sparse results) are not errors; they
//! are reported as [`crate::search::SearchWarning`]s on the outcome.

use crate::fields::FieldRole;
use thiserror::Error;

/// Problems with the input table, detected before any processing.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("required field `{role}` could not be resolved from columns {columns:?}")]
    UnresolvedField { role: FieldRole, columns: Vec<String> },
    #[error("row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: frame value {value} is not a non-negative integer")]
    InvalidFrame { row: usize, value: f64 },
}

/// Invalid run configuration; the matching phase does not run.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("distance window is inverted: low {low} > high {high}")]
    InvertedDistance { low: f64, high: f64 },
    #[error("distance window bounds must be non-negative, got {low}..{high}")]
    NegativeDistance { low: f64, high: f64 },
    #[error("angle bound {value} is not finite")]
    NonFiniteAngle { value: f64 },
    #[error("order count must be at least 2, got {0}")]
    TooFewOrders(usize),
    #[error("intensity ratio must be positive, got {0}")]
    InvalidRatio(f64),
    #[error("isolation radius must be positive, got {0}")]
    InvalidRadius(f64),
}

/// Failures of the parallel frame pass.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to start worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
}

/// Any hard failure of a full run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
