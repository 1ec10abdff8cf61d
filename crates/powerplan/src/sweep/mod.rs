//! Sweep orchestration: evaluate a leaf over a range and export the trade-off.

mod artifact;
mod request;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::design::{Axis, Leaf, StudySpecification};
use crate::engine::{Design, PowerEngine, SweepPoint};
use crate::error::{PowerError, Result};

pub use artifact::{ArtifactWriter, Artifacts};
pub use request::SweepRequest;

/// A finished sweep, handed to the operator before the inflection value is chosen.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub leaf: Leaf,
    pub axis: Axis,
    pub request: SweepRequest,
    /// Evaluated points in grid order.
    pub series: Vec<SweepPoint>,
    pub artifacts: Artifacts,
    pub generated_at: DateTime<Utc>,
}

/// Runs one sweep per session through an engine and exports its artifacts.
pub struct SweepOrchestrator<'e> {
    engine: &'e dyn PowerEngine,
    writer: ArtifactWriter,
}

impl<'e> SweepOrchestrator<'e> {
    pub fn new(engine: &'e dyn PowerEngine, writer: ArtifactWriter) -> Self {
        Self { engine, writer }
    }

    /// Evaluate the specification's leaf over `request` with everything else held fixed.
    pub fn sweep(&self, spec: &StudySpecification, request: SweepRequest) -> Result<SweepResult> {
        let leaf = spec
            .leaf()
            .ok_or_else(|| PowerError::Specification("no design has been selected".into()))?;
        let axis = leaf.spec().axis;
        let design = Design::from_spec(spec)?;

        let series = self.engine.compute_sweep(&design, axis, &request.grid())?;
        if series.is_empty() {
            return Err(PowerError::EmptySweep(format!(
                "no point in [{}, {}] produced a result for {}",
                request.lower(),
                request.upper(),
                leaf
            )));
        }

        let artifacts = self.writer.export(leaf, &series)?;
        info!(
            leaf = %leaf,
            points = series.len(),
            artifacts = artifacts.paths().count(),
            "sweep exported"
        );

        Ok(SweepResult {
            leaf,
            axis,
            request,
            series,
            artifacts,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{DesignKind, MethodKind, Param, TestKind};
    use crate::engine::AnalyticEngine;
    use tempfile::TempDir;

    fn means_spec() -> StudySpecification {
        StudySpecification::new()
            .with_alpha(0.05)
            .with_power(0.8)
            .with_test(TestKind::Means)
            .with_design(DesignKind::Individual)
            .with_method(MethodKind::VaryEffect)
            .with_param(Param::ControlMean, 100.0)
            .and_then(|s| s.with_param(Param::StandardDeviation, 100.0))
            .and_then(|s| s.with_param(Param::NRatio, 1.0))
            .unwrap()
    }

    #[test]
    fn test_sweep_required_n_decreases() {
        let dir = TempDir::new().unwrap();
        let engine = AnalyticEngine::new();
        let orchestrator = SweepOrchestrator::new(&engine, ArtifactWriter::new(dir.path()));

        let request = SweepRequest::new(100.0, 110.0, 2.0).unwrap();
        let result = orchestrator.sweep(&means_spec(), request).unwrap();

        assert_eq!(result.leaf, Leaf::MeansIndividualEffect);
        assert_eq!(result.series.len(), 5);
        assert!(result.series.windows(2).all(|w| w[0].value > w[1].value));
        assert!(dir.path().join("MI_effect.svg").exists());
    }

    #[test]
    fn test_empty_sweep_is_an_error() {
        let dir = TempDir::new().unwrap();
        let engine = AnalyticEngine::new();
        let spec = StudySpecification::new()
            .with_alpha(0.05)
            .with_power(0.8)
            .with_test(TestKind::Means)
            .with_design(DesignKind::Cluster)
            .with_method(MethodKind::VaryEffect)
            .with_param(Param::ControlMean, 100.0)
            .and_then(|s| s.with_param(Param::StandardDeviation, 10.0))
            .and_then(|s| s.with_param(Param::Icc, 0.2))
            .and_then(|s| s.with_param(Param::ControlClusters, 2.0))
            .and_then(|s| s.with_param(Param::TreatmentClusters, 2.0))
            .unwrap();
        let orchestrator = SweepOrchestrator::new(&engine, ArtifactWriter::new(dir.path()));

        let request = SweepRequest::new(100.0, 102.0, 1.0).unwrap();
        let err = orchestrator.sweep(&spec, request).unwrap_err();

        assert!(matches!(err, PowerError::EmptySweep(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
