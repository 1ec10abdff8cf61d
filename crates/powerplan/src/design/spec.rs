//! The study specification accumulated over one session.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{PowerError, Result};

use super::kinds::{DesignKind, MethodKind, TestKind};
use super::leaf::{LEAVES, Leaf, Param};

/// Everything the operator has answered so far.
///
/// Values are only ever added. A parameter is accepted only if some leaf
/// consistent with the choices made so far requires it, so fields from
/// unchosen branches stay absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudySpecification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<TestKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<DesignKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodKind>,

    /// Design-specific values in collection order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    params: IndexMap<Param, f64>,
}

impl StudySpecification {
    /// Create an empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the significance level.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    /// Set the target power.
    pub fn with_power(mut self, power: f64) -> Self {
        self.power = Some(power);
        self
    }

    /// Record the outcome comparison.
    pub fn with_test(mut self, test: TestKind) -> Self {
        self.test = Some(test);
        self
    }

    /// Record how units are randomized.
    pub fn with_design(mut self, design: DesignKind) -> Self {
        self.design = Some(design);
        self
    }

    /// Record what the sweep varies.
    pub fn with_method(mut self, method: MethodKind) -> Self {
        self.method = Some(method);
        self
    }

    /// Record a design-specific value.
    ///
    /// Fails if no leaf reachable from the current choices uses `param`, or if
    /// the value was already recorded.
    pub fn with_param(mut self, param: Param, value: f64) -> Result<Self> {
        if !self.admits(param) {
            return Err(PowerError::Specification(format!(
                "'{}' is not used by the selected design",
                param
            )));
        }
        if self.params.contains_key(&param) {
            return Err(PowerError::Specification(format!(
                "'{}' was already collected",
                param
            )));
        }
        self.params.insert(param, value);
        Ok(self)
    }

    /// Whether some leaf consistent with the choices made so far requires `param`.
    pub fn admits(&self, param: Param) -> bool {
        LEAVES.iter().any(|spec| {
            self.test.is_none_or(|t| t == spec.test)
                && self.design.is_none_or(|d| d == spec.design)
                && self.method.is_none_or(|m| m == spec.method)
                && spec.leaf.accepts(param)
        })
    }

    /// Look up a collected value.
    pub fn get(&self, param: Param) -> Option<f64> {
        self.params.get(&param).copied()
    }

    /// Look up a value the current stage cannot proceed without.
    pub fn require(&self, param: Param) -> Result<f64> {
        self.get(param).ok_or_else(|| {
            PowerError::Specification(format!("'{}' has not been collected", param))
        })
    }

    pub fn alpha(&self) -> Result<f64> {
        self.alpha
            .ok_or_else(|| PowerError::Specification("alpha has not been collected".into()))
    }

    pub fn power(&self) -> Result<f64> {
        self.power
            .ok_or_else(|| PowerError::Specification("power has not been collected".into()))
    }

    /// The selected leaf, once all three choices are made.
    pub fn leaf(&self) -> Option<Leaf> {
        Some(Leaf::select(self.test?, self.design?, self.method?))
    }

    /// Collected parameters in collection order.
    pub fn params(&self) -> impl Iterator<Item = (Param, f64)> + '_ {
        self.params.iter().map(|(p, v)| (*p, *v))
    }

    /// Parameters the selected leaf still needs.
    pub fn missing_params(&self) -> Vec<Param> {
        match self.leaf() {
            Some(leaf) => leaf
                .required_params()
                .into_iter()
                .filter(|p| !self.params.contains_key(p))
                .collect(),
            None => Vec::new(),
        }
    }
}
