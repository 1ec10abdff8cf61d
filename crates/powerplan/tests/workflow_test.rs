//! End-to-end planning sessions driven by scripted answers.

use std::cell::Cell;
use std::path::Path;

use statrs::distribution::{ContinuousCDF, Normal};
use tempfile::TempDir;

use powerplan::{
    AnalyticEngine, Axis, Design, Leaf, Param, PlannerConfig, PointEstimate, PowerEngine,
    PowerError, Planner, Resolution, ScriptedAnswers, Session, Stage, SweepPoint,
};

/// Engine wrapper that counts every call.
struct CountingEngine {
    inner: AnalyticEngine,
    calls: Cell<usize>,
}

impl CountingEngine {
    fn new() -> Self {
        Self {
            inner: AnalyticEngine::new(),
            calls: Cell::new(0),
        }
    }
}

impl PowerEngine for CountingEngine {
    fn compute_point(&self, design: &Design, at: Resolution) -> powerplan::Result<PointEstimate> {
        self.calls.set(self.calls.get() + 1);
        self.inner.compute_point(design, at)
    }

    fn compute_sweep(
        &self,
        design: &Design,
        axis: Axis,
        grid: &[f64],
    ) -> powerplan::Result<Vec<SweepPoint>> {
        self.calls.set(self.calls.get() + 1);
        self.inner.compute_sweep(design, axis, grid)
    }
}

fn planner(dir: &TempDir) -> Planner {
    Planner::with_config(PlannerConfig::default().with_output_dir(dir.path()))
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("Failed to read output dir").count()
}

/// One valid script per leaf.
fn script(leaf: Leaf) -> Vec<&'static str> {
    match leaf {
        Leaf::MeansIndividualEffect => vec![
            "", "", "1", "1", "100", "100", "1", "1", "100", "110", "2", "6",
        ],
        Leaf::MeansIndividualSampleSize => vec![
            "", "", "1", "1", "100", "100", "1", "2", "100", "500", "50", "300",
        ],
        Leaf::MeansClusterFixedCounts => vec![
            "", "", "1", "2", "100", "10", "0.2", "1", "10", "10", "105", "115", "2.5", "10",
        ],
        Leaf::MeansClusterFixedSizes => vec![
            "", "", "1", "2", "100", "10", "0.2", "2", "20", "20", "102", "110", "2", "5",
        ],
        Leaf::ProportionsIndividualEffect => vec![
            "", "", "2", "1", "0.5", "1", "1", "0.55", "0.8", "0.05", "0.15",
        ],
        Leaf::ProportionsIndividualSampleSize => vec![
            "", "", "2", "1", "0.5", "1", "2", "100", "500", "50", "300",
        ],
        Leaf::ProportionsClusterFixedCounts => vec![
            "", "", "2", "2", "0.3", "0.05", "1", "20", "20", "0.4", "0.6", "0.05", "0.2",
        ],
        Leaf::ProportionsClusterFixedSizes => vec![
            "", "", "2", "2", "0.3", "0.05", "2", "15", "15", "0.4", "0.6", "0.05", "0.2",
        ],
    }
}

// =============================================================================
// Branch Completeness
// =============================================================================

#[test]
fn test_every_leaf_reaches_report() {
    for leaf in Leaf::all() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut answers = ScriptedAnswers::new(script(leaf));

        let report = planner(&dir)
            .run(&mut answers)
            .unwrap_or_else(|e| panic!("{leaf} failed: {e}"));

        assert_eq!(report.leaf, leaf);
        assert_eq!(answers.remaining(), 0, "{leaf} left answers unused");
        assert_eq!(answers.sweeps_presented(), 1);
        assert!(report.estimate.required_n > 0);
        assert_eq!(
            report.estimate.required_n,
            report.estimate.control_n + report.estimate.treatment_n
        );
    }
}

#[test]
fn test_every_leaf_holds_exactly_its_parameters() {
    for leaf in Leaf::all() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut answers = ScriptedAnswers::new(script(leaf));
        let report = planner(&dir).run(&mut answers).expect("Session failed");

        let collected: Vec<Param> = report.specification.params().map(|(p, _)| p).collect();
        assert_eq!(collected, leaf.required_params(), "{leaf}");
        assert!(report.specification.missing_params().is_empty());
    }
}

#[test]
fn test_every_leaf_exports_named_artifacts() {
    for leaf in Leaf::all() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut answers = ScriptedAnswers::new(script(leaf));
        let report = planner(&dir).run(&mut answers).expect("Session failed");

        let stem = leaf.artifact_stem();
        assert_eq!(report.artifacts.table, Some(dir.path().join(format!("{stem}.csv"))));
        assert_eq!(report.artifacts.graph, Some(dir.path().join(format!("{stem}.svg"))));
        assert_eq!(file_count(dir.path()), 2);
    }
}

#[test]
fn test_session_history_is_strictly_forward() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = PlannerConfig::default().with_output_dir(dir.path());
    let engine = AnalyticEngine::new();
    let mut session = Session::new(&engine, &config);
    let mut answers = ScriptedAnswers::new(script(Leaf::ProportionsClusterFixedSizes));

    session.run(&mut answers).expect("Session failed");

    assert_eq!(session.history().first(), Some(&Stage::Init));
    assert_eq!(session.history().last(), Some(&Stage::Report));
    assert!(session.history().windows(2).all(|w| w[0] < w[1]));
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_means_individual_vary_effect() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut answers = ScriptedAnswers::new(script(Leaf::MeansIndividualEffect));
    let report = planner(&dir).run(&mut answers).expect("Session failed");

    let normal = Normal::new(0.0, 1.0).unwrap();
    let z = normal.inverse_cdf(0.975) + normal.inverse_cdf(0.8);
    let per_arm = (2.0 * (100.0 * z / 6.0_f64).powi(2)).ceil() as u64;

    assert_eq!(report.estimate.treatment_value, 106.0);
    assert_eq!(report.estimate.control_n, per_arm);
    assert_eq!(report.estimate.treatment_n, per_arm);
    assert_eq!(report.estimate.required_n, 2 * per_arm);
    assert_eq!(report.estimate.required_n, 8722);
    assert!(report.sentence().contains("N = 8722"));
}

#[test]
fn test_proportions_individual_vary_sample_size() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut answers = ScriptedAnswers::new(script(Leaf::ProportionsIndividualSampleSize));
    let report = planner(&dir).run(&mut answers).expect("Session failed");

    let effect = report.estimate.effect;
    assert_eq!((effect * 100.0).round() / 100.0, effect);
    assert!(effect > 1.0, "effect should be in percentage points, got {effect}");
    assert_eq!(report.estimate.control_n, 300);
    assert!(report.sentence().contains("percentage points"));
}

#[test]
fn test_cluster_fixed_counts_returns_sizes() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut answers = ScriptedAnswers::new(script(Leaf::MeansClusterFixedCounts));
    let report = planner(&dir).run(&mut answers).expect("Session failed");

    let est = &report.estimate;
    assert!(est.control_cluster_size.is_some());
    assert!(est.treatment_cluster_size.is_some());
    assert!(est.control_clusters.is_none());
    assert!(est.treatment_clusters.is_none());
    assert_eq!(report.specification.get(Param::ControlClusters), Some(10.0));
}

#[test]
fn test_cluster_fixed_sizes_returns_counts() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut answers = ScriptedAnswers::new(script(Leaf::ProportionsClusterFixedSizes));
    let report = planner(&dir).run(&mut answers).expect("Session failed");

    let est = &report.estimate;
    assert!(est.control_clusters.is_some());
    assert!(est.control_cluster_size.is_none());
    assert_eq!(est.control_n, est.control_clusters.unwrap() * 15);
}

#[test]
fn test_invalid_alpha_aborts_before_engine() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = PlannerConfig::default().with_output_dir(dir.path());
    let engine = CountingEngine::new();
    let mut session = Session::new(&engine, &config);
    let mut answers = ScriptedAnswers::new(["1.5", "0.8", "1", "1"]);

    let err = session.run(&mut answers).unwrap_err();

    assert_eq!(err.as_validation().map(|e| e.kind()), Some("out_of_range"));
    assert_eq!(session.stage(), Stage::Aborted);
    assert_eq!(engine.calls.get(), 0);
    assert_eq!(file_count(dir.path()), 0);
}

// =============================================================================
// Validation Failures
// =============================================================================

fn run_expecting_failure(answers: Vec<&str>) -> (PowerError, usize) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut answers = ScriptedAnswers::new(answers);
    let err = planner(&dir)
        .run(&mut answers)
        .expect_err("Session should abort");
    (err, file_count(dir.path()))
}

#[test]
fn test_alpha_boundaries() {
    for alpha in ["0", "1"] {
        let (err, files) = run_expecting_failure(vec![alpha]);
        assert_eq!(err.as_validation().map(|e| e.kind()), Some("out_of_range"));
        assert_eq!(files, 0);
    }
}

#[test]
fn test_step_equal_to_span_aborts() {
    let (err, files) = run_expecting_failure(vec![
        "", "", "1", "1", "100", "100", "1", "1", "100", "110", "10", "6",
    ]);
    assert_eq!(err.as_validation().map(|e| e.kind()), Some("interval_too_large"));
    assert_eq!(files, 0);
}

#[test]
fn test_reversed_range_aborts() {
    let (err, _) = run_expecting_failure(vec![
        "", "", "2", "1", "0.5", "1", "2", "500", "100", "50", "300",
    ]);
    assert_eq!(err.as_validation().map(|e| e.kind()), Some("ordering_violation"));
}

#[test]
fn test_nonpositive_nratio_aborts() {
    for nratio in ["0", "-1"] {
        let (err, _) = run_expecting_failure(vec!["", "", "1", "1", "100", "100", nratio]);
        assert_eq!(err.as_validation().map(|e| e.kind()), Some("out_of_range"));
    }
}

#[test]
fn test_icc_must_be_open_unit() {
    let (err, _) = run_expecting_failure(vec!["", "", "1", "2", "100", "10", "1"]);
    match err.as_validation() {
        Some(powerplan::ValidationError::OutOfRange { field, .. }) => assert_eq!(field, "icc"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invalid_method_selector_aborts() {
    let (err, _) = run_expecting_failure(vec!["", "", "1", "1", "100", "100", "1", "0"]);
    assert_eq!(err.as_validation().map(|e| e.kind()), Some("invalid_selector"));
}

#[test]
fn test_treatment_proportion_above_one_aborts_after_sweep() {
    let (err, files) = run_expecting_failure(vec![
        "", "", "2", "1", "0.5", "1", "1", "0.55", "0.8", "0.05", "0.6",
    ]);
    assert_eq!(err.as_validation().map(|e| e.kind()), Some("out_of_range"));
    // The sweep already ran and exported before the bad inflection answer.
    assert_eq!(files, 2);
}

#[test]
fn test_input_closed_mid_session() {
    let (err, _) = run_expecting_failure(vec!["", "", "1", "1", "100"]);
    assert!(matches!(err, PowerError::InputClosed(field) if field == "sd"));
}

#[test]
fn test_custom_defaults_apply_to_blank_answers() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = PlannerConfig::default().with_output_dir(dir.path());
    config.default_alpha = 0.01;
    config.default_power = 0.9;
    let mut answers = ScriptedAnswers::new(script(Leaf::MeansIndividualEffect));

    let report = Planner::with_config(config)
        .run(&mut answers)
        .expect("Session failed");

    assert_eq!(report.specification.alpha, Some(0.01));
    assert_eq!(report.specification.power, Some(0.9));
    assert!(report.estimate.required_n > 8722);
}

// =============================================================================
// Extreme Inputs
// =============================================================================

#[test]
fn test_unreportable_sizes_leave_an_empty_sweep() {
    let (err, files) = run_expecting_failure(vec![
        "", "", "1", "1", "100", "1e10", "1", "1", "101", "110", "2", "0.001",
    ]);
    assert!(matches!(err, PowerError::EmptySweep(_)));
    assert_eq!(files, 0);
}

#[test]
fn test_fractional_control_arm_rounds_up_to_one_unit() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut answers = ScriptedAnswers::new([
        "", "", "1", "1", "100", "100", "1", "2", "100", "500", "50", "1e-10",
    ]);

    let report = planner(&dir).run(&mut answers).expect("Session failed");

    assert_eq!(report.estimate.control_n, 1);
    assert_eq!(report.estimate.treatment_n, 1);
    assert_eq!(report.estimate.required_n, 2);
    assert!(report.estimate.effect.is_finite());
    assert!(!report.sentence().contains("inf"));
}

#[test]
fn test_tiny_step_exceeds_point_limit() {
    let (err, files) = run_expecting_failure(vec![
        "", "", "1", "1", "100", "100", "1", "2", "100", "500", "1e-9", "300",
    ]);
    assert_eq!(err.as_validation().map(|e| e.kind()), Some("too_many_points"));
    assert_eq!(files, 0);
}

#[test]
fn test_fractional_cluster_count_aborts() {
    let (err, _) = run_expecting_failure(vec!["", "", "1", "2", "100", "10", "0.2", "1", "2.5"]);
    match err.as_validation() {
        Some(powerplan::ValidationError::OutOfRange { field, .. }) => assert_eq!(field, "k1"),
        other => panic!("unexpected error: {other:?}"),
    }
}
