//! Operator input: the answer source abstraction and the collector.

mod collector;
mod source;

pub use collector::Collector;
pub use source::{AnswerSource, Prompt, ScriptedAnswers};
