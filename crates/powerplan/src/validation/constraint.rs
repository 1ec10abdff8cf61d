//! The fixed catalog of answer constraints.

use crate::error::ValidationError;

/// Largest number of grid points a sweep may evaluate.
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// A predicate applied to exactly one collected value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// `0 < value < 1`.
    OpenUnit,
    /// `value > 0`.
    Positive,
    /// `value > lower`, and `value < ceiling` when a ceiling is given.
    Above { lower: f64, ceiling: Option<f64> },
    /// `0 < value < span`, with at most [`MAX_SWEEP_POINTS`] grid points.
    Subdivides { span: f64 },
    /// A whole number of at least 1.
    Count,
}

impl Constraint {
    /// Check `value`, naming `field` in the diagnostic.
    pub fn check(&self, field: &str, value: f64) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                expected: "a finite number".to_string(),
            });
        }

        match *self {
            Constraint::OpenUnit => {
                if value <= 0.0 || value >= 1.0 {
                    return Err(out_of_range(field, value, "strictly between 0 and 1"));
                }
            }
            Constraint::Positive => {
                if value <= 0.0 {
                    return Err(out_of_range(field, value, "greater than 0"));
                }
            }
            Constraint::Count => {
                if value < 1.0 || value.fract() != 0.0 {
                    return Err(out_of_range(field, value, "a whole number of at least 1"));
                }
            }
            Constraint::Above { lower, ceiling } => {
                if value <= lower {
                    return Err(ValidationError::OrderingViolation {
                        field: field.to_string(),
                        lower,
                        upper: value,
                    });
                }
                if let Some(ceiling) = ceiling.filter(|c| value >= *c) {
                    return Err(out_of_range(field, value, &format!("less than {ceiling}")));
                }
            }
            Constraint::Subdivides { span } => {
                if value <= 0.0 {
                    return Err(out_of_range(field, value, "greater than 0"));
                }
                if value >= span {
                    return Err(ValidationError::IntervalTooLarge {
                        field: field.to_string(),
                        step: value,
                        span,
                    });
                }
                let points = (span / value).floor() + 1.0;
                if points > MAX_SWEEP_POINTS as f64 {
                    return Err(ValidationError::TooManyPoints {
                        field: field.to_string(),
                        step: value,
                        points,
                        limit: MAX_SWEEP_POINTS,
                    });
                }
            }
        }

        Ok(value)
    }
}

fn out_of_range(field: &str, value: f64, expected: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        value,
        expected: expected.to_string(),
    }
}
