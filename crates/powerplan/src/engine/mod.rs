//! Computation engine boundary.
//!
//! The session only talks to engines through [`PowerEngine`]. A fully
//! resolved [`Design`] is built from the specification once the branch is
//! known; the engine then either evaluates one point or a whole grid.

mod analytic;

use serde::{Deserialize, Serialize};

use crate::design::{Axis, DesignKind, MethodKind, Param, StudySpecification, TestKind};
use crate::error::{PowerError, Result};

pub use analytic::AnalyticEngine;

/// Control-arm outcome model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Means { control_mean: f64, sd: f64 },
    Proportions { control: f64 },
}

impl Outcome {
    /// Control-arm design point.
    pub fn control(&self) -> f64 {
        match *self {
            Outcome::Means { control_mean, .. } => control_mean,
            Outcome::Proportions { control } => control,
        }
    }
}

/// How units are spread over the two arms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Allocation {
    /// Individual randomization with treatment/control size ratio.
    Individual { nratio: f64 },
    /// Cluster randomization with cluster counts fixed (`k1`/`k2`).
    FixedCounts {
        icc: f64,
        control_clusters: f64,
        treatment_clusters: f64,
    },
    /// Cluster randomization with cluster sizes fixed (`m1`/`m2`).
    FixedSizes {
        icc: f64,
        control_size: f64,
        treatment_size: f64,
    },
}

/// Everything an engine needs except the swept or resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Design {
    pub outcome: Outcome,
    pub allocation: Allocation,
    pub alpha: f64,
    pub power: f64,
}

impl Design {
    /// Build the engine design for the specification's leaf.
    pub fn from_spec(spec: &StudySpecification) -> Result<Self> {
        let leaf = spec
            .leaf()
            .ok_or_else(|| PowerError::Specification("no design has been selected".into()))?;
        let leaf_spec = leaf.spec();

        let outcome = match leaf_spec.test {
            TestKind::Means => Outcome::Means {
                control_mean: spec.require(Param::ControlMean)?,
                sd: spec.require(Param::StandardDeviation)?,
            },
            TestKind::Proportions => Outcome::Proportions {
                control: spec.require(Param::ControlProportion)?,
            },
        };

        let allocation = match (leaf_spec.design, leaf_spec.method) {
            (DesignKind::Individual, _) => Allocation::Individual {
                nratio: spec.require(Param::NRatio)?,
            },
            (DesignKind::Cluster, MethodKind::VaryEffect) => Allocation::FixedCounts {
                icc: spec.require(Param::Icc)?,
                control_clusters: spec.require(Param::ControlClusters)?,
                treatment_clusters: spec.require(Param::TreatmentClusters)?,
            },
            (DesignKind::Cluster, MethodKind::VarySampleSize) => Allocation::FixedSizes {
                icc: spec.require(Param::Icc)?,
                control_size: spec.require(Param::ControlClusterSize)?,
                treatment_size: spec.require(Param::TreatmentClusterSize)?,
            },
        };

        Ok(Self {
            outcome,
            allocation,
            alpha: spec.alpha()?,
            power: spec.power()?,
        })
    }
}

/// The value the point estimate is pinned at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Resolution {
    /// Treatment-arm mean or proportion.
    Treatment(f64),
    /// Control-arm size.
    ControlArmSize(f64),
}

/// Decomposed result of a single engine evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    /// Total participants over both arms.
    pub required_n: u64,
    pub control_n: u64,
    pub treatment_n: u64,
    /// Raw difference for means, percentage points for proportions.
    pub effect: f64,
    /// Control-arm design point.
    pub control_value: f64,
    /// Treatment-arm design point.
    pub treatment_value: f64,

    /// Computed clusters per arm (only when sizes were fixed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_clusters: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_clusters: Option<u64>,

    /// Computed cluster sizes (only when counts were fixed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_cluster_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_cluster_size: Option<u64>,
}

/// One evaluated grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Swept value (treatment value or control arm size).
    pub axis_value: f64,
    /// Required total N, or detectable effect for sample-size sweeps.
    pub value: f64,
}

/// A power-analysis computation engine.
pub trait PowerEngine {
    /// Evaluate the design at one resolved value.
    fn compute_point(&self, design: &Design, at: Resolution) -> Result<PointEstimate>;

    /// Evaluate the design over `grid` along `axis`.
    ///
    /// Grid values the design cannot satisfy are left out of the series.
    fn compute_sweep(&self, design: &Design, axis: Axis, grid: &[f64]) -> Result<Vec<SweepPoint>>;
}

impl<E: PowerEngine + ?Sized> PowerEngine for &E {
    fn compute_point(&self, design: &Design, at: Resolution) -> Result<PointEstimate> {
        (**self).compute_point(design, at)
    }

    fn compute_sweep(&self, design: &Design, axis: Axis, grid: &[f64]) -> Result<Vec<SweepPoint>> {
        (**self).compute_sweep(design, axis, grid)
    }
}

/// Round to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
