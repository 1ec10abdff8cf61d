//! Where answers come from.

use std::collections::VecDeque;

use crate::error::Result;
use crate::sweep::SweepResult;

/// A single question put to the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Field the answer is stored under.
    pub field: String,
    /// Question text.
    pub question: String,
    /// Menu or range hint shown next to the question.
    pub hint: Option<String>,
    /// Value used when the operator gives a blank answer.
    pub default: Option<f64>,
}

impl Prompt {
    pub fn new(field: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            question: question.into(),
            hint: None,
            default: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self
    }
}

/// Synchronous request/response channel to the operator.
pub trait AnswerSource {
    /// Block until the operator answers. `Ok(None)` means the input is closed.
    fn answer(&mut self, prompt: &Prompt) -> Result<Option<String>>;

    /// Show a finished sweep before the operator is asked to pick a value.
    fn present_sweep(&mut self, _sweep: &SweepResult) {}
}

impl<A: AnswerSource + ?Sized> AnswerSource for &mut A {
    fn answer(&mut self, prompt: &Prompt) -> Result<Option<String>> {
        (**self).answer(prompt)
    }

    fn present_sweep(&mut self, sweep: &SweepResult) {
        (**self).present_sweep(sweep)
    }
}

/// Answers replayed from a fixed script, for tests and batch drivers.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnswers {
    answers: VecDeque<String>,
    asked: Vec<String>,
    sweeps_presented: usize,
}

impl ScriptedAnswers {
    /// Create a script from answers in prompt order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
            sweeps_presented: 0,
        }
    }

    /// Fields asked so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    /// Number of sweeps shown to the operator.
    pub fn sweeps_presented(&self) -> usize {
        self.sweeps_presented
    }
}

impl AnswerSource for ScriptedAnswers {
    fn answer(&mut self, prompt: &Prompt) -> Result<Option<String>> {
        self.asked.push(prompt.field.clone());
        Ok(self.answers.pop_front())
    }

    fn present_sweep(&mut self, _sweep: &SweepResult) {
        self.sweeps_presented += 1;
    }
}
