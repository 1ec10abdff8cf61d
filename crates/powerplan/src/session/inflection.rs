//! Folding the operator's post-sweep judgment back into the specification.

use crate::design::{Axis, Leaf, Param, StudySpecification};
use crate::error::{PowerError, Result, ValidationError};
use crate::input::{Collector, Prompt};
use crate::validation::Constraint;

/// Ask for the value where the sweep curve flattens and record it.
///
/// No rule picks this value; the operator reads it off the sweep graph.
pub fn resolve_inflection(
    collector: &mut Collector<'_>,
    spec: StudySpecification,
    leaf: Leaf,
) -> Result<StudySpecification> {
    let leaf_spec = leaf.spec();
    let param = leaf_spec.resolution;

    let constraint = match (leaf_spec.axis, param) {
        (Axis::TreatmentProportion, Param::Mdes) => Constraint::OpenUnit,
        _ => Constraint::Positive,
    };
    let hint = match constraint {
        Constraint::OpenUnit => "between 0 and 1",
        _ => "greater than 0",
    };

    let prompt = Prompt::new(param.key(), param.question()).with_hint(hint);
    let value = collector.collect(&prompt, constraint)?;

    if leaf_spec.axis == Axis::TreatmentProportion {
        let treatment = spec.require(Param::ControlProportion)? + value;
        Constraint::OpenUnit
            .check("treatment_prop", treatment)
            .map_err(|err| match err {
                ValidationError::OutOfRange { value, .. } => ValidationError::OutOfRange {
                    field: "treatment_prop".to_string(),
                    value,
                    expected: "strictly between 0 and 1 (control proportion + mdes)".to_string(),
                },
                other => other,
            })?;
    }

    spec.with_param(param, value)
}

/// Treatment-arm design point implied by the resolved effect.
pub fn treatment_value(spec: &StudySpecification, leaf: Leaf) -> Result<f64> {
    let control = match leaf.spec().axis {
        Axis::TreatmentMean => spec.require(Param::ControlMean)?,
        Axis::TreatmentProportion => spec.require(Param::ControlProportion)?,
        Axis::ControlArmSize => {
            return Err(PowerError::Specification(format!(
                "{} is resolved at a sample size",
                leaf
            )));
        }
    };
    Ok(control + spec.require(Param::Mdes)?)
}
