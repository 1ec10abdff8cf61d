//! Error types for the powerplan library.

use std::path::PathBuf;
use thiserror::Error;

/// A rejected operator answer.
///
/// Every variant is terminal for the session that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A menu answer outside its enumerated options.
    #[error("Invalid selector for '{field}': {value} (expected one of {options})")]
    InvalidSelector {
        field: String,
        value: String,
        options: String,
    },

    /// A probability, proportion or correlation outside (0, 1), or a
    /// required-positive value that is not.
    #[error("Value out of range for '{field}': {value} (must be {expected})")]
    OutOfRange {
        field: String,
        value: f64,
        expected: String,
    },

    /// An upper bound not strictly greater than its lower bound.
    #[error("Ordering violation for '{field}': {upper} is not greater than {lower}")]
    OrderingViolation { field: String, lower: f64, upper: f64 },

    /// A sweep step not strictly smaller than the span it subdivides.
    #[error("Interval too large for '{field}': step {step} does not subdivide span {span}")]
    IntervalTooLarge { field: String, step: f64, span: f64 },

    /// A sweep step so small the grid would exceed the point limit.
    #[error("Interval too small for '{field}': step {step} gives {points} points, limit is {limit}")]
    TooManyPoints { field: String, step: f64, points: f64, limit: usize },

    /// An answer that is not a number at all.
    #[error("Malformed answer for '{field}': '{input}'")]
    Malformed { field: String, input: String },
}

impl ValidationError {
    /// Short machine-friendly tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidSelector { .. } => "invalid_selector",
            ValidationError::OutOfRange { .. } => "out_of_range",
            ValidationError::OrderingViolation { .. } => "ordering_violation",
            ValidationError::IntervalTooLarge { .. } => "interval_too_large",
            ValidationError::TooManyPoints { .. } => "too_many_points",
            ValidationError::Malformed { .. } => "malformed",
        }
    }
}

/// Main error type for powerplan operations.
#[derive(Debug, Error)]
pub enum PowerError {
    /// An answer failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The engine cannot satisfy the design (e.g. too few clusters).
    #[error("Infeasible design: {0}")]
    Infeasible(String),

    /// No point of a sweep produced a finite result.
    #[error("Empty sweep: {0}")]
    EmptySweep(String),

    /// The answer source ran out before the session finished.
    #[error("Input closed while waiting for '{0}'")]
    InputClosed(String),

    /// Error writing an artifact or reading input.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error drawing a sweep graph.
    #[error("Render error for '{path}': {message}")]
    Render { path: PathBuf, message: String },

    /// The specification lacks a value, or holds one its branch does not use.
    #[error("Specification error: {0}")]
    Specification(String),
}

impl PowerError {
    /// The validation error behind this failure, if any.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            PowerError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for powerplan operations.
pub type Result<T> = std::result::Result<T, PowerError>;
