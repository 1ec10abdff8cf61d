//! Answer validation.

mod constraint;

pub use constraint::{Constraint, MAX_SWEEP_POINTS};
