//! Main Planner struct and public API.

use std::path::PathBuf;

use crate::engine::{AnalyticEngine, PowerEngine};
use crate::error::Result;
use crate::input::AnswerSource;
use crate::report::Report;
use crate::session::Session;
use crate::sweep::ArtifactWriter;

/// Configuration for a planning session, fixed before the session starts.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Directory sweep artifacts are written to. Must already exist.
    pub output_dir: PathBuf,
    /// Write the sweep table as CSV.
    pub export_table: bool,
    /// Write the sweep graph as SVG.
    pub export_graph: bool,
    /// Alpha used when the operator leaves the prompt blank.
    pub default_alpha: f64,
    /// Power used when the operator leaves the prompt blank.
    pub default_power: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            export_table: true,
            export_graph: true,
            default_alpha: 0.05,
            default_power: 0.8,
        }
    }
}

impl PlannerConfig {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_export(mut self, table: bool, graph: bool) -> Self {
        self.export_table = table;
        self.export_graph = graph;
        self
    }

    pub(crate) fn artifact_writer(&self) -> ArtifactWriter {
        ArtifactWriter::new(&self.output_dir)
            .with_table(self.export_table)
            .with_graph(self.export_graph)
    }
}

/// Entry point: runs planning sessions against a computation engine.
pub struct Planner {
    config: PlannerConfig,
    engine: Box<dyn PowerEngine>,
}

impl Planner {
    /// Create a planner with default configuration and the analytic engine.
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    /// Create a planner with custom configuration and the analytic engine.
    pub fn with_config(config: PlannerConfig) -> Self {
        Self {
            config,
            engine: Box::new(AnalyticEngine::new()),
        }
    }

    /// Replace the computation engine.
    pub fn with_engine(mut self, engine: impl PowerEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Run one full session, answering prompts from `source`.
    pub fn run(&self, source: &mut dyn AnswerSource) -> Result<Report> {
        Session::new(self.engine.as_ref(), &self.config).run(source)
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}
