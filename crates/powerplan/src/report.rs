//! Human-readable summary of a finished session.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::design::{Axis, Leaf, Param, StudySpecification, TestKind};
use crate::engine::PointEstimate;
use crate::sweep::Artifacts;

/// Final output of a successful session.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub leaf: Leaf,
    pub title: String,
    pub specification: StudySpecification,
    pub estimate: PointEstimate,
    pub artifacts: Artifacts,
    pub summary: String,
    pub completed_at: DateTime<Utc>,
}

impl Report {
    pub fn new(
        leaf: Leaf,
        specification: StudySpecification,
        estimate: PointEstimate,
        artifacts: Artifacts,
    ) -> Self {
        let summary = sentence(leaf, &specification, &estimate);
        Self {
            leaf,
            title: leaf.title(),
            specification,
            estimate,
            artifacts,
            summary,
            completed_at: Utc::now(),
        }
    }

    /// The one-sentence summary for this branch.
    pub fn sentence(&self) -> &str {
        &self.summary
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

fn sentence(leaf: Leaf, spec: &StudySpecification, est: &PointEstimate) -> String {
    let leaf_spec = leaf.spec();
    let preamble = format!(
        "With alpha = {} and power = {}",
        number(spec.alpha.unwrap_or_default()),
        number(spec.power.unwrap_or_default())
    );
    let effect = effect_phrase(leaf_spec.test, est);

    match (leaf_spec.axis, leaf.is_cluster()) {
        (Axis::ControlArmSize, _) => format!(
            "{}, N = {} ({} control, {} treatment) can detect a minimum effect of {}.",
            preamble, est.required_n, est.control_n, est.treatment_n, effect
        ),
        (_, false) => format!(
            "{}, detecting {} requires N = {}: {} in control and {} in treatment.",
            preamble, effect, est.required_n, est.control_n, est.treatment_n
        ),
        (_, true) => {
            let icc = number(spec.get(Param::Icc).unwrap_or_default());
            let control = cluster_phrase(
                spec.get(Param::ControlClusters).map(number),
                est.control_clusters,
                spec.get(Param::ControlClusterSize).map(number),
                est.control_cluster_size,
            );
            let treatment = cluster_phrase(
                spec.get(Param::TreatmentClusters).map(number),
                est.treatment_clusters,
                spec.get(Param::TreatmentClusterSize).map(number),
                est.treatment_cluster_size,
            );
            format!(
                "{} and icc = {}, detecting {} requires N = {}: {} in control and {} in treatment.",
                preamble, icc, effect, est.required_n, control, treatment
            )
        }
    }
}

fn effect_phrase(test: TestKind, est: &PointEstimate) -> String {
    match test {
        TestKind::Means => format!(
            "a difference of {} (control mean {} vs treatment mean {})",
            number(est.effect),
            number(est.control_value),
            number(est.treatment_value)
        ),
        TestKind::Proportions => format!(
            "{:.2} percentage points (control {} vs treatment {})",
            est.effect,
            proportion(est.control_value),
            proportion(est.treatment_value)
        ),
    }
}

/// "10 clusters of 2": whichever side was fixed comes from the specification.
fn cluster_phrase(
    fixed_count: Option<String>,
    computed_count: Option<u64>,
    fixed_size: Option<String>,
    computed_size: Option<u64>,
) -> String {
    let count = fixed_count
        .or_else(|| computed_count.map(|c| c.to_string()))
        .unwrap_or_else(|| "?".to_string());
    let size = fixed_size
        .or_else(|| computed_size.map(|s| s.to_string()))
        .unwrap_or_else(|| "?".to_string());
    format!("{} clusters of {}", count, size)
}

/// Whole numbers print without decimals, everything else with two.
fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn proportion(value: f64) -> String {
    format!("{:.3}", value)
}
