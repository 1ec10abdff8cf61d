//! Sweep ranges.

use serde::Serialize;

use crate::design::{Leaf, Param, StudySpecification};
use crate::error::{PowerError, Result, ValidationError};
use crate::validation::Constraint;

/// Slack when deciding whether the last grid point reaches `upper`.
const GRID_EPSILON: f64 = 1e-9;

/// A closed range and the step used to walk it.
///
/// Always satisfies `0 < step < upper - lower`, so the grid has at least two
/// points, and never more than `MAX_SWEEP_POINTS`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRequest {
    lower: f64,
    upper: f64,
    step: f64,
}

impl SweepRequest {
    pub fn new(lower: f64, upper: f64, step: f64) -> std::result::Result<Self, ValidationError> {
        Constraint::Above {
            lower,
            ceiling: None,
        }
        .check("upper", upper)?;
        Constraint::Subdivides {
            span: upper - lower,
        }
        .check("interval", step)?;

        Ok(Self { lower, upper, step })
    }

    /// Read the range triple of the specification's leaf.
    pub fn from_spec(spec: &StudySpecification, leaf: Leaf) -> Result<Self> {
        let (lower, upper) = match leaf.spec().method_params {
            [.., lower, upper, Param::Interval] => (*lower, *upper),
            _ => {
                return Err(PowerError::Specification(format!(
                    "{} has no sweep range",
                    leaf
                )));
            }
        };

        Ok(Self::new(
            spec.require(lower)?,
            spec.require(upper)?,
            spec.require(Param::Interval)?,
        )?)
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Grid points from `lower` towards `upper`, computed by index to avoid drift.
    pub fn grid(&self) -> Vec<f64> {
        let steps = ((self.upper - self.lower) / self.step + GRID_EPSILON).floor() as usize;
        (0..=steps)
            .map(|i| self.lower + i as f64 * self.step)
            .collect()
    }
}
