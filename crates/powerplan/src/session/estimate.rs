//! Point estimation at the resolved value.

use tracing::info;

use crate::design::{Axis, Param, StudySpecification};
use crate::engine::{Design, PointEstimate, PowerEngine, Resolution};
use crate::error::{PowerError, Result};

use super::inflection::treatment_value;

/// Calls the engine once for a fully resolved specification.
pub struct PointEstimator<'e> {
    engine: &'e dyn PowerEngine,
}

impl<'e> PointEstimator<'e> {
    pub fn new(engine: &'e dyn PowerEngine) -> Self {
        Self { engine }
    }

    pub fn estimate(&self, spec: &StudySpecification) -> Result<PointEstimate> {
        let leaf = spec
            .leaf()
            .ok_or_else(|| PowerError::Specification("no design has been selected".into()))?;
        let design = Design::from_spec(spec)?;

        let at = match leaf.spec().axis {
            Axis::TreatmentMean | Axis::TreatmentProportion => {
                Resolution::Treatment(treatment_value(spec, leaf)?)
            }
            Axis::ControlArmSize => Resolution::ControlArmSize(spec.require(Param::SampleSize)?),
        };

        let estimate = self.engine.compute_point(&design, at)?;
        info!(
            leaf = %leaf,
            required_n = estimate.required_n,
            effect = estimate.effect,
            "point estimate"
        );
        Ok(estimate)
    }
}
