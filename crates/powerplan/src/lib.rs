//! powerplan: interactive sample size planning for two-group experiments.
//!
//! A planning session walks the operator through a power analysis for a
//! comparison of means or proportions, with individual or cluster
//! randomization. It sweeps a range of effects or sample sizes, exports the
//! trade-off as a table and graph, waits for the operator to pick the point
//! where the curve flattens, and reports the exact design at that point.
//!
//! # Example
//!
//! ```no_run
//! use powerplan::{Planner, PlannerConfig, ScriptedAnswers};
//!
//! let planner = Planner::with_config(PlannerConfig::default().with_output_dir("plans"));
//! let mut answers = ScriptedAnswers::new([
//!     "0.05", "0.8", // alpha, power
//!     "1", "1",      // means, individual
//!     "100", "100", "1", // control mean, sd, nratio
//!     "1",           // vary effect
//!     "100", "110", "2", // treatment mean range
//!     "6",           // mdes read off the graph
//! ]);
//! let report = planner.run(&mut answers).unwrap();
//!
//! println!("{}", report);
//! ```

pub mod design;
pub mod engine;
pub mod error;
pub mod input;
pub mod report;
pub mod session;
pub mod sweep;
pub mod validation;

mod planner;

pub use crate::planner::{Planner, PlannerConfig};
pub use design::{Axis, DesignKind, Leaf, MethodKind, Param, StudySpecification, TestKind};
pub use engine::{AnalyticEngine, Design, PointEstimate, PowerEngine, Resolution, SweepPoint};
pub use error::{PowerError, Result, ValidationError};
pub use input::{AnswerSource, Prompt, ScriptedAnswers};
pub use report::Report;
pub use session::{Session, Stage};
pub use sweep::{Artifacts, SweepRequest, SweepResult};
