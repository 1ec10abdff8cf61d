//! The interactive planning session.
//!
//! A session walks a fixed sequence of stages, strictly forward:
//!
//! ```text
//! Init -> CollectGlobals -> SelectTest -> SelectDesign -> CollectDesignParams
//!      -> SelectMethod -> CollectMethodParams -> Sweep -> AwaitInflection
//!      -> PointEstimate -> Report
//! ```
//!
//! Any failure moves it to `Aborted` and unwinds the whole run. The
//! specification is threaded by value through the stages; each stage hands
//! back an extended copy.

mod estimate;
mod inflection;

use serde::Serialize;
use tracing::{debug, warn};

use crate::design::{
    DesignKind, Leaf, MethodKind, Param, Selectable, StudySpecification, TestKind,
};
use crate::engine::PowerEngine;
use crate::error::{PowerError, Result};
use crate::input::{AnswerSource, Collector, Prompt};
use crate::planner::PlannerConfig;
use crate::report::Report;
use crate::sweep::{SweepOrchestrator, SweepRequest};
use crate::validation::Constraint;

pub use estimate::PointEstimator;
pub use inflection::{resolve_inflection, treatment_value};

/// Session states in protocol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    CollectGlobals,
    SelectTest,
    SelectDesign,
    CollectDesignParams,
    SelectMethod,
    CollectMethodParams,
    Sweep,
    AwaitInflection,
    PointEstimate,
    Report,
    Aborted,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Report | Stage::Aborted)
    }
}

/// One run of the planning protocol.
pub struct Session<'a> {
    engine: &'a dyn PowerEngine,
    config: &'a PlannerConfig,
    stage: Stage,
    history: Vec<Stage>,
}

impl<'a> Session<'a> {
    pub fn new(engine: &'a dyn PowerEngine, config: &'a PlannerConfig) -> Self {
        Self {
            engine,
            config,
            stage: Stage::Init,
            history: vec![Stage::Init],
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Every stage entered so far, in order.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Run the session to completion against `source`.
    ///
    /// A session runs once; calling this again after a terminal stage fails.
    pub fn run(&mut self, source: &mut dyn AnswerSource) -> Result<Report> {
        if self.stage != Stage::Init {
            return Err(PowerError::Specification(format!(
                "session already ran (stage {:?})",
                self.stage
            )));
        }

        match self.drive(source) {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!(stage = ?self.stage, error = %err, "session aborted");
                self.enter(Stage::Aborted);
                Err(err)
            }
        }
    }

    fn drive(&mut self, source: &mut dyn AnswerSource) -> Result<Report> {
        let mut collector = Collector::new(source);

        self.enter(Stage::CollectGlobals);
        let spec = self.collect_globals(&mut collector, StudySpecification::new())?;

        self.enter(Stage::SelectTest);
        let test: TestKind =
            collector.select("Which outcome do the arms compare?", TestKind::menu())?;
        let spec = spec.with_test(test);

        self.enter(Stage::SelectDesign);
        let design: DesignKind =
            collector.select("How are units randomized?", DesignKind::menu())?;
        let spec = spec.with_design(design);

        self.enter(Stage::CollectDesignParams);
        let spec = collect_params(&mut collector, spec, Leaf::design_params(test, design))?;

        self.enter(Stage::SelectMethod);
        let menu = match design {
            DesignKind::Individual => MethodKind::menu(),
            DesignKind::Cluster => MethodKind::OPTIONS
                .iter()
                .enumerate()
                .map(|(i, m)| format!("{} = {}", i + 1, m.cluster_label()))
                .collect::<Vec<_>>()
                .join(", "),
        };
        let method: MethodKind = collector.select("What should the sweep vary?", menu)?;
        let spec = spec.with_method(method);
        let leaf = Leaf::select(test, design, method);
        debug!(leaf = %leaf, "design selected");

        self.enter(Stage::CollectMethodParams);
        let spec = collect_params(&mut collector, spec, leaf.spec().method_params)?;

        self.enter(Stage::Sweep);
        let request = SweepRequest::from_spec(&spec, leaf)?;
        let orchestrator = SweepOrchestrator::new(self.engine, self.config.artifact_writer());
        let sweep = orchestrator.sweep(&spec, request)?;
        collector.source().present_sweep(&sweep);

        self.enter(Stage::AwaitInflection);
        let spec = resolve_inflection(&mut collector, spec, leaf)?;

        self.enter(Stage::PointEstimate);
        let estimate = PointEstimator::new(self.engine).estimate(&spec)?;

        self.enter(Stage::Report);
        Ok(Report::new(leaf, spec, estimate, sweep.artifacts))
    }

    fn collect_globals(
        &self,
        collector: &mut Collector<'_>,
        spec: StudySpecification,
    ) -> Result<StudySpecification> {
        let alpha = collector.collect(
            &Prompt::new("alpha", "Significance level (alpha)")
                .with_hint("between 0 and 1")
                .with_default(self.config.default_alpha),
            Constraint::OpenUnit,
        )?;
        let power = collector.collect(
            &Prompt::new("power", "Target power")
                .with_hint("between 0 and 1")
                .with_default(self.config.default_power),
            Constraint::OpenUnit,
        )?;

        Ok(spec.with_alpha(alpha).with_power(power))
    }

    fn enter(&mut self, next: Stage) {
        debug_assert!(
            next == Stage::Aborted || next > self.stage,
            "stage {:?} does not follow {:?}",
            next,
            self.stage
        );
        debug!(from = ?self.stage, to = ?next, "stage");
        self.stage = next;
        self.history.push(next);
    }
}

/// Collect `params` in order, each under its own constraint.
fn collect_params(
    collector: &mut Collector<'_>,
    mut spec: StudySpecification,
    params: &[Param],
) -> Result<StudySpecification> {
    for &param in params {
        let constraint = constraint_for(param, &spec)?;
        let prompt = Prompt::new(param.key(), param.question()).with_hint(hint_for(&constraint));
        let value = collector.collect(&prompt, constraint)?;
        spec = spec.with_param(param, value)?;
    }
    Ok(spec)
}

/// The catalog entry applied to each parameter.
fn constraint_for(param: Param, spec: &StudySpecification) -> Result<Constraint> {
    let constraint = match param {
        Param::ControlProportion | Param::Icc | Param::LowerProportion => Constraint::OpenUnit,
        Param::ControlClusters
        | Param::TreatmentClusters
        | Param::ControlClusterSize
        | Param::TreatmentClusterSize => Constraint::Count,
        Param::UpperMean => Constraint::Above {
            lower: spec.require(Param::LowerMean)?,
            ceiling: None,
        },
        Param::UpperProportion => Constraint::Above {
            lower: spec.require(Param::LowerProportion)?,
            ceiling: Some(1.0),
        },
        Param::UpperN => Constraint::Above {
            lower: spec.require(Param::LowerN)?,
            ceiling: None,
        },
        Param::Interval => {
            let (lower, upper) = if let Some(lower) = spec.get(Param::LowerMean) {
                (lower, spec.require(Param::UpperMean)?)
            } else if let Some(lower) = spec.get(Param::LowerProportion) {
                (lower, spec.require(Param::UpperProportion)?)
            } else {
                (spec.require(Param::LowerN)?, spec.require(Param::UpperN)?)
            };
            Constraint::Subdivides {
                span: (upper - lower).abs(),
            }
        }
        Param::ControlMean
        | Param::StandardDeviation
        | Param::NRatio
        | Param::LowerMean
        | Param::LowerN
        | Param::Mdes
        | Param::SampleSize => Constraint::Positive,
    };
    Ok(constraint)
}

fn hint_for(constraint: &Constraint) -> String {
    match constraint {
        Constraint::OpenUnit => "between 0 and 1".to_string(),
        Constraint::Positive => "greater than 0".to_string(),
        Constraint::Count => "a whole number, at least 1".to_string(),
        Constraint::Above {
            lower,
            ceiling: None,
        } => format!("greater than {lower}"),
        Constraint::Above {
            lower,
            ceiling: Some(ceiling),
        } => format!("between {lower} and {ceiling}"),
        Constraint::Subdivides { span } => format!("greater than 0 and less than {span}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AnalyticEngine;
    use crate::input::ScriptedAnswers;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> PlannerConfig {
        PlannerConfig::default().with_output_dir(dir.path())
    }

    #[test]
    fn test_stages_move_forward_to_report() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let engine = AnalyticEngine::new();
        let mut session = Session::new(&engine, &config);
        let mut answers = ScriptedAnswers::new([
            "", "", "1", "1", "100", "100", "1", "1", "100", "110", "2", "6",
        ]);

        let report = session.run(&mut answers).unwrap();

        assert_eq!(session.stage(), Stage::Report);
        assert!(session.history().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(session.history().len(), 11);
        assert_eq!(report.estimate.required_n, 8722);
        assert_eq!(answers.remaining(), 0);
    }

    #[test]
    fn test_abort_stops_at_failing_stage() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let engine = AnalyticEngine::new();
        let mut session = Session::new(&engine, &config);
        let mut answers = ScriptedAnswers::new(["", "", "3", "1"]);

        let err = session.run(&mut answers).unwrap_err();

        assert_eq!(err.as_validation().unwrap().kind(), "invalid_selector");
        assert_eq!(session.stage(), Stage::Aborted);
        assert_eq!(
            session.history(),
            [
                Stage::Init,
                Stage::CollectGlobals,
                Stage::SelectTest,
                Stage::Aborted
            ]
        );
        assert_eq!(answers.remaining(), 1);
    }

    #[test]
    fn test_session_runs_once() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let engine = AnalyticEngine::new();
        let mut session = Session::new(&engine, &config);

        let mut answers = ScriptedAnswers::new(["0"]);
        assert!(session.run(&mut answers).is_err());
        let mut answers = ScriptedAnswers::new([""]);
        assert!(matches!(
            session.run(&mut answers),
            Err(PowerError::Specification(_))
        ));
    }

    #[test]
    fn test_interval_constraint_uses_collected_span() {
        let spec = StudySpecification::new()
            .with_test(TestKind::Means)
            .with_design(DesignKind::Individual)
            .with_method(MethodKind::VarySampleSize)
            .with_param(Param::LowerN, 100.0)
            .and_then(|s| s.with_param(Param::UpperN, 500.0))
            .unwrap();

        assert_eq!(
            constraint_for(Param::Interval, &spec).unwrap(),
            Constraint::Subdivides { span: 400.0 }
        );
    }

    #[test]
    fn test_cluster_counts_and_sizes_are_whole_numbers() {
        let spec = StudySpecification::new();
        for param in [
            Param::ControlClusters,
            Param::TreatmentClusters,
            Param::ControlClusterSize,
            Param::TreatmentClusterSize,
        ] {
            assert_eq!(constraint_for(param, &spec).unwrap(), Constraint::Count);
        }
    }

    #[test]
    fn test_upper_bound_requires_lower() {
        let spec = StudySpecification::new().with_test(TestKind::Means);
        assert!(constraint_for(Param::UpperMean, &spec).is_err());
    }
}
