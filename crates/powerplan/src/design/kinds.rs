//! The three independent choices that select a computation path.

use serde::{Deserialize, Serialize};

/// What kind of outcome is compared between arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Difference in means of a continuous outcome.
    Means,
    /// Difference in proportions of a binary outcome.
    Proportions,
}

/// How units are assigned to arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignKind {
    /// Individuals are randomized.
    Individual,
    /// Whole clusters are randomized.
    Cluster,
}

/// Which quantity the sweep varies.
///
/// For cluster designs both methods sweep the effect; the method instead
/// decides whether cluster counts or cluster sizes are held fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Sweep the effect, report required sample size.
    VaryEffect,
    /// Sweep the sample size, report detectable effect.
    VarySampleSize,
}

/// A menu choice answered with a 1-based selector code.
pub trait Selectable: Sized + Copy + 'static {
    /// Options in selector order (code 1 first).
    const OPTIONS: &'static [Self];

    /// Field name used in prompts and diagnostics.
    const FIELD: &'static str;

    /// Human-readable label of this option.
    fn label(&self) -> &'static str;

    /// Resolve a selector code to an option.
    fn from_code(code: u8) -> Option<Self> {
        let index = usize::from(code).checked_sub(1)?;
        Self::OPTIONS.get(index).copied()
    }

    /// Render the menu, e.g. `1 = means, 2 = proportions`.
    fn menu() -> String {
        Self::OPTIONS
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{} = {}", i + 1, option.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Selectable for TestKind {
    const OPTIONS: &'static [Self] = &[TestKind::Means, TestKind::Proportions];
    const FIELD: &'static str = "test";

    fn label(&self) -> &'static str {
        match self {
            TestKind::Means => "means",
            TestKind::Proportions => "proportions",
        }
    }
}

impl Selectable for DesignKind {
    const OPTIONS: &'static [Self] = &[DesignKind::Individual, DesignKind::Cluster];
    const FIELD: &'static str = "design";

    fn label(&self) -> &'static str {
        match self {
            DesignKind::Individual => "individual randomization",
            DesignKind::Cluster => "cluster randomization",
        }
    }
}

impl Selectable for MethodKind {
    const OPTIONS: &'static [Self] = &[MethodKind::VaryEffect, MethodKind::VarySampleSize];
    const FIELD: &'static str = "method";

    fn label(&self) -> &'static str {
        match self {
            MethodKind::VaryEffect => "vary effect size",
            MethodKind::VarySampleSize => "vary sample size",
        }
    }
}

impl MethodKind {
    /// Label shown for cluster designs, where the method picks the fixed dimension.
    pub fn cluster_label(&self) -> &'static str {
        match self {
            MethodKind::VaryEffect => "fix cluster counts, solve cluster size",
            MethodKind::VarySampleSize => "fix cluster sizes, solve cluster count",
        }
    }
}
