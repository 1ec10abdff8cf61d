//! Closed-form two-sample power engine.
//!
//! Uses the normal approximation for a two-sided test. With
//! `Z = z(1 - alpha/2) + z(power)`:
//!
//! - means: `n_c = (1 + 1/r) * sd^2 * Z^2 / delta^2`
//! - proportions: `n_c = (z_a * sqrt(pbar*qbar*(1 + 1/r)) + z_b * sqrt(p_c*q_c + p_t*q_t/r))^2 / delta^2`
//! - clusters inflate the per-arm variance by `1 + (m - 1) * icc`.

use once_cell::sync::Lazy;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use crate::design::Axis;
use crate::error::{PowerError, Result};

use super::{Allocation, Design, Outcome, PointEstimate, PowerEngine, Resolution, SweepPoint, round2};

static STANDARD_NORMAL: Lazy<Normal> = Lazy::new(|| Normal::new(0.0, 1.0).unwrap());

/// Bisection steps for the proportions MDES search.
const BISECTION_STEPS: usize = 100;

/// Slack for ceilings so exact integers are not bumped up by float noise.
const CEIL_EPSILON: f64 = 1e-9;

/// Largest per-arm count (units, clusters or cluster size) the engine reports.
const MAX_UNITS: f64 = 1e12;

/// Analytic engine based on normal-approximation sample size formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEngine;

/// Critical values for a design.
#[derive(Debug, Clone, Copy)]
struct Critical {
    z_alpha: f64,
    z_beta: f64,
}

impl Critical {
    fn new(alpha: f64, power: f64) -> Self {
        Self {
            z_alpha: STANDARD_NORMAL.inverse_cdf(1.0 - alpha / 2.0),
            z_beta: STANDARD_NORMAL.inverse_cdf(power),
        }
    }

    fn total(&self) -> f64 {
        self.z_alpha + self.z_beta
    }
}

impl AnalyticEngine {
    pub fn new() -> Self {
        Self
    }

    /// Unrounded control-arm size for an individually randomized design.
    pub fn control_arm_size(
        &self,
        outcome: &Outcome,
        treatment: f64,
        nratio: f64,
        alpha: f64,
        power: f64,
    ) -> Result<f64> {
        let z = Critical::new(alpha, power);
        let delta = nonzero_delta(outcome.control(), treatment)?;
        Ok(control_arm_exact(outcome, treatment, nratio, delta, &z))
    }

    fn individual_at_treatment(&self, design: &Design, nratio: f64, treatment: f64) -> Result<PointEstimate> {
        let z = Critical::new(design.alpha, design.power);
        let delta = nonzero_delta(design.outcome.control(), treatment)?;

        let control_n = units(control_arm_exact(&design.outcome, treatment, nratio, delta, &z))?;
        let treatment_n = units(nratio * control_n as f64)?;

        Ok(PointEstimate {
            required_n: control_n + treatment_n,
            control_n,
            treatment_n,
            effect: reported_effect(&design.outcome, delta),
            control_value: design.outcome.control(),
            treatment_value: treatment,
            control_clusters: None,
            treatment_clusters: None,
            control_cluster_size: None,
            treatment_cluster_size: None,
        })
    }

    fn individual_at_size(&self, design: &Design, nratio: f64, n: f64) -> Result<PointEstimate> {
        let z = Critical::new(design.alpha, design.power);
        let control_n = units(n)?;
        let treatment_n = units(nratio * control_n as f64)?;
        // Effective ratio after rounding both arms.
        let ratio = treatment_n as f64 / control_n as f64;

        let delta = match design.outcome {
            Outcome::Means { sd, .. } => {
                z.total() * sd * (1.0 / control_n as f64 + 1.0 / treatment_n as f64).sqrt()
            }
            Outcome::Proportions { control } => {
                proportion_mdes(&design.outcome, control, ratio, control_n as f64, &z)?
            }
        };

        Ok(PointEstimate {
            required_n: control_n + treatment_n,
            control_n,
            treatment_n,
            effect: reported_effect(&design.outcome, delta),
            control_value: design.outcome.control(),
            treatment_value: design.outcome.control() + delta,
            control_clusters: None,
            treatment_clusters: None,
            control_cluster_size: None,
            treatment_cluster_size: None,
        })
    }

    fn cluster_fixed_counts(
        &self,
        design: &Design,
        icc: f64,
        control_clusters: f64,
        treatment_clusters: f64,
        treatment: f64,
    ) -> Result<PointEstimate> {
        let z = Critical::new(design.alpha, design.power);
        let control = design.outcome.control();
        let delta = nonzero_delta(control, treatment)?;

        let spread = variance(&design.outcome, control) / control_clusters
            + variance(&design.outcome, treatment) / treatment_clusters;
        let threshold = delta * delta / (z.total().powi(2) * spread);
        if threshold <= icc {
            return Err(PowerError::Infeasible(format!(
                "{} and {} clusters cannot detect an effect of {} with icc {}",
                control_clusters, treatment_clusters, delta, icc
            )));
        }

        let size = units((1.0 - icc) / (threshold - icc))?;
        let control_n = units(control_clusters * size as f64)?;
        let treatment_n = units(treatment_clusters * size as f64)?;

        Ok(PointEstimate {
            required_n: control_n + treatment_n,
            control_n,
            treatment_n,
            effect: reported_effect(&design.outcome, delta),
            control_value: control,
            treatment_value: treatment,
            control_clusters: None,
            treatment_clusters: None,
            control_cluster_size: Some(size),
            treatment_cluster_size: Some(size),
        })
    }

    fn cluster_fixed_sizes(
        &self,
        design: &Design,
        icc: f64,
        control_size: f64,
        treatment_size: f64,
        treatment: f64,
    ) -> Result<PointEstimate> {
        let z = Critical::new(design.alpha, design.power);
        let control = design.outcome.control();
        let delta = nonzero_delta(control, treatment)?;

        let inflated = |value: f64, size: f64| {
            variance(&design.outcome, value) * (1.0 + (size - 1.0) * icc) / size
        };
        let clusters_exact = z.total().powi(2)
            * (inflated(control, control_size) + inflated(treatment, treatment_size))
            / (delta * delta);

        let clusters = units(clusters_exact)?;
        let control_n = units(clusters as f64 * control_size)?;
        let treatment_n = units(clusters as f64 * treatment_size)?;

        Ok(PointEstimate {
            required_n: control_n + treatment_n,
            control_n,
            treatment_n,
            effect: reported_effect(&design.outcome, delta),
            control_value: control,
            treatment_value: treatment,
            control_clusters: Some(clusters),
            treatment_clusters: Some(clusters),
            control_cluster_size: None,
            treatment_cluster_size: None,
        })
    }
}

impl PowerEngine for AnalyticEngine {
    fn compute_point(&self, design: &Design, at: Resolution) -> Result<PointEstimate> {
        match (design.allocation, at) {
            (Allocation::Individual { nratio }, Resolution::Treatment(t)) => {
                self.individual_at_treatment(design, nratio, t)
            }
            (Allocation::Individual { nratio }, Resolution::ControlArmSize(n)) => {
                self.individual_at_size(design, nratio, n)
            }
            (
                Allocation::FixedCounts {
                    icc,
                    control_clusters,
                    treatment_clusters,
                },
                Resolution::Treatment(t),
            ) => self.cluster_fixed_counts(design, icc, control_clusters, treatment_clusters, t),
            (
                Allocation::FixedSizes {
                    icc,
                    control_size,
                    treatment_size,
                },
                Resolution::Treatment(t),
            ) => self.cluster_fixed_sizes(design, icc, control_size, treatment_size, t),
            (_, Resolution::ControlArmSize(_)) => Err(PowerError::Specification(
                "cluster designs are resolved at an effect, not a sample size".into(),
            )),
        }
    }

    fn compute_sweep(&self, design: &Design, axis: Axis, grid: &[f64]) -> Result<Vec<SweepPoint>> {
        let mut series = Vec::with_capacity(grid.len());

        for &axis_value in grid {
            let at = if axis.is_effect() {
                Resolution::Treatment(axis_value)
            } else {
                Resolution::ControlArmSize(axis_value)
            };

            match self.compute_point(design, at) {
                Ok(estimate) => {
                    let value = if axis.is_effect() {
                        estimate.required_n as f64
                    } else {
                        estimate.effect
                    };
                    series.push(SweepPoint { axis_value, value });
                }
                Err(PowerError::Infeasible(reason)) => {
                    debug!(axis_value, %reason, "skipping sweep point");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(series)
    }
}

fn nonzero_delta(control: f64, treatment: f64) -> Result<f64> {
    let delta = treatment - control;
    if delta.abs() < f64::EPSILON {
        return Err(PowerError::Infeasible(
            "treatment equals control, no effect to detect".into(),
        ));
    }
    Ok(delta)
}

/// Outcome variance at a design point.
fn variance(outcome: &Outcome, value: f64) -> f64 {
    match *outcome {
        Outcome::Means { sd, .. } => sd * sd,
        Outcome::Proportions { .. } => value * (1.0 - value),
    }
}

fn control_arm_exact(outcome: &Outcome, treatment: f64, nratio: f64, delta: f64, z: &Critical) -> f64 {
    match *outcome {
        Outcome::Means { sd, .. } => (1.0 + 1.0 / nratio) * (sd * z.total() / delta).powi(2),
        Outcome::Proportions { control } => {
            let pooled = (control + nratio * treatment) / (1.0 + nratio);
            let null_sd = (pooled * (1.0 - pooled) * (1.0 + 1.0 / nratio)).sqrt();
            let alt_sd = (variance(outcome, control) + variance(outcome, treatment) / nratio).sqrt();
            ((z.z_alpha * null_sd + z.z_beta * alt_sd) / delta).powi(2)
        }
    }
}

/// Smallest treatment proportion above `control` detectable with `n` control units.
fn proportion_mdes(outcome: &Outcome, control: f64, ratio: f64, n: f64, z: &Critical) -> Result<f64> {
    let required = |treatment: f64| control_arm_exact(outcome, treatment, ratio, treatment - control, z);

    let mut low = control;
    let mut high = 1.0 - CEIL_EPSILON;
    if required(high) > n {
        return Err(PowerError::Infeasible(format!(
            "{} control units cannot detect any increase from {}",
            n, control
        )));
    }

    for _ in 0..BISECTION_STEPS {
        let mid = (low + high) / 2.0;
        if required(mid) > n {
            low = mid;
        } else {
            high = mid;
        }
    }

    Ok(high - control)
}

/// Effect in reporting units: raw difference, or percentage points for proportions.
fn reported_effect(outcome: &Outcome, delta: f64) -> f64 {
    match outcome {
        Outcome::Means { .. } => delta,
        Outcome::Proportions { .. } => round2(delta * 100.0),
    }
}

/// Round a unit count up to a whole number of at least 1.
///
/// Counts that are not finite or exceed [`MAX_UNITS`] make the design infeasible.
fn units(value: f64) -> Result<u64> {
    if !value.is_finite() || value > MAX_UNITS {
        return Err(PowerError::Infeasible(format!(
            "{} units exceeds the largest reportable design",
            value
        )));
    }
    if value <= 1.0 {
        return Ok(1);
    }
    Ok((value - CEIL_EPSILON).ceil() as u64)
}
