//! Parameter collection: one prompt, one answer, one constraint.

use tracing::debug;

use crate::design::Selectable;
use crate::error::{PowerError, Result, ValidationError};
use crate::validation::Constraint;

use super::source::{AnswerSource, Prompt};

/// Asks for values one at a time and validates each answer.
pub struct Collector<'a> {
    source: &'a mut dyn AnswerSource,
}

impl<'a> Collector<'a> {
    pub fn new(source: &'a mut dyn AnswerSource) -> Self {
        Self { source }
    }

    /// Access the underlying source, e.g. to present a sweep.
    pub fn source(&mut self) -> &mut dyn AnswerSource {
        &mut *self.source
    }

    /// Ask for one number and apply `constraint` to it.
    ///
    /// A blank answer takes the prompt default when there is one.
    pub fn collect(&mut self, prompt: &Prompt, constraint: Constraint) -> Result<f64> {
        let raw = self.ask(prompt)?;
        let value = match (raw.trim(), prompt.default) {
            ("", Some(default)) => default,
            (text, _) => text.parse::<f64>().map_err(|_| ValidationError::Malformed {
                field: prompt.field.clone(),
                input: text.to_string(),
            })?,
        };

        let value = constraint.check(&prompt.field, value)?;
        debug!(field = %prompt.field, value, "collected");
        Ok(value)
    }

    /// Ask a menu question answered with a 1-based selector code.
    pub fn select<T: Selectable>(&mut self, question: &str, menu: String) -> Result<T> {
        let prompt = Prompt::new(T::FIELD, question).with_hint(menu);
        let raw = self.ask(&prompt)?;
        let text = raw.trim();

        let choice = text
            .parse::<u8>()
            .ok()
            .and_then(T::from_code)
            .ok_or_else(|| ValidationError::InvalidSelector {
                field: T::FIELD.to_string(),
                value: text.to_string(),
                options: format!("1..={}", T::OPTIONS.len()),
            })?;

        debug!(field = T::FIELD, choice = choice.label(), "selected");
        Ok(choice)
    }

    fn ask(&mut self, prompt: &Prompt) -> Result<String> {
        self.source
            .answer(prompt)?
            .ok_or_else(|| PowerError::InputClosed(prompt.field.clone()))
    }
}
