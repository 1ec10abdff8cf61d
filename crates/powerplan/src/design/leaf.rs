//! The eight computation paths and the parameters each one requires.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::kinds::{DesignKind, MethodKind, Selectable, TestKind};

/// A design-specific parameter collected from the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    ControlMean,
    StandardDeviation,
    NRatio,
    ControlProportion,
    Icc,
    ControlClusters,
    TreatmentClusters,
    ControlClusterSize,
    TreatmentClusterSize,
    LowerMean,
    UpperMean,
    LowerProportion,
    UpperProportion,
    LowerN,
    UpperN,
    Interval,
    Mdes,
    SampleSize,
}

impl Param {
    /// Stable key used in diagnostics and JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            Param::ControlMean => "control_mean",
            Param::StandardDeviation => "sd",
            Param::NRatio => "nratio",
            Param::ControlProportion => "control_prop",
            Param::Icc => "icc",
            Param::ControlClusters => "k1",
            Param::TreatmentClusters => "k2",
            Param::ControlClusterSize => "m1",
            Param::TreatmentClusterSize => "m2",
            Param::LowerMean => "lower_mean",
            Param::UpperMean => "upper_mean",
            Param::LowerProportion => "lower_prop",
            Param::UpperProportion => "upper_prop",
            Param::LowerN => "lower_n",
            Param::UpperN => "upper_n",
            Param::Interval => "interval",
            Param::Mdes => "mdes",
            Param::SampleSize => "n",
        }
    }

    /// Question asked when collecting this parameter.
    pub fn question(&self) -> &'static str {
        match self {
            Param::ControlMean => "Mean outcome in the control arm",
            Param::StandardDeviation => "Standard deviation of the outcome",
            Param::NRatio => "Ratio of treatment arm size to control arm size",
            Param::ControlProportion => "Proportion with the outcome in the control arm",
            Param::Icc => "Intra-cluster correlation (rho)",
            Param::ControlClusters => "Number of clusters in the control arm",
            Param::TreatmentClusters => "Number of clusters in the treatment arm",
            Param::ControlClusterSize => "Cluster size in the control arm",
            Param::TreatmentClusterSize => "Cluster size in the treatment arm",
            Param::LowerMean => "Lowest treatment mean to sweep",
            Param::UpperMean => "Highest treatment mean to sweep",
            Param::LowerProportion => "Lowest treatment proportion to sweep",
            Param::UpperProportion => "Highest treatment proportion to sweep",
            Param::LowerN => "Smallest control arm size to sweep",
            Param::UpperN => "Largest control arm size to sweep",
            Param::Interval => "Sweep interval",
            Param::Mdes => "Effect where the curve flattens (difference from control)",
            Param::SampleSize => "Control arm size where the curve flattens",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Quantity varied along a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Treatment-arm mean; the series holds required N.
    TreatmentMean,
    /// Treatment-arm proportion; the series holds required N.
    TreatmentProportion,
    /// Control-arm size; the series holds the detectable effect.
    ControlArmSize,
}

impl Axis {
    /// Label for the swept quantity.
    pub fn label(&self) -> &'static str {
        match self {
            Axis::TreatmentMean => "Treatment mean",
            Axis::TreatmentProportion => "Treatment proportion",
            Axis::ControlArmSize => "Control arm size",
        }
    }

    /// Label for the computed quantity.
    pub fn value_label(&self) -> &'static str {
        match self {
            Axis::TreatmentMean | Axis::TreatmentProportion => "Required total N",
            Axis::ControlArmSize => "Minimum detectable effect",
        }
    }

    /// Whether the sweep varies the effect (as opposed to the sample size).
    pub fn is_effect(&self) -> bool {
        !matches!(self, Axis::ControlArmSize)
    }
}

/// One of the eight computation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leaf {
    MeansIndividualEffect,
    MeansIndividualSampleSize,
    MeansClusterFixedCounts,
    MeansClusterFixedSizes,
    ProportionsIndividualEffect,
    ProportionsIndividualSampleSize,
    ProportionsClusterFixedCounts,
    ProportionsClusterFixedSizes,
}

/// Static description of a leaf.
#[derive(Debug, Clone, Copy)]
pub struct LeafSpec {
    pub leaf: Leaf,
    pub test: TestKind,
    pub design: DesignKind,
    pub method: MethodKind,
    /// Two-character branch code used in artifact names.
    pub code: &'static str,
    /// Axis part of artifact names.
    pub axis_description: &'static str,
    pub axis: Axis,
    /// Parameters collected after the design is chosen.
    pub design_params: &'static [Param],
    /// Parameters collected after the method is chosen, range triple last.
    pub method_params: &'static [Param],
    /// Scalar supplied by the operator after the sweep.
    pub resolution: Param,
}

const MEANS_INDIVIDUAL: &[Param] = &[Param::ControlMean, Param::StandardDeviation, Param::NRatio];
const MEANS_CLUSTER: &[Param] = &[Param::ControlMean, Param::StandardDeviation, Param::Icc];
const PROPS_INDIVIDUAL: &[Param] = &[Param::ControlProportion, Param::NRatio];
const PROPS_CLUSTER: &[Param] = &[Param::ControlProportion, Param::Icc];

const MEAN_RANGE: &[Param] = &[Param::LowerMean, Param::UpperMean, Param::Interval];
const PROP_RANGE: &[Param] = &[Param::LowerProportion, Param::UpperProportion, Param::Interval];
const N_RANGE: &[Param] = &[Param::LowerN, Param::UpperN, Param::Interval];

const MEANS_COUNTS: &[Param] = &[
    Param::ControlClusters,
    Param::TreatmentClusters,
    Param::LowerMean,
    Param::UpperMean,
    Param::Interval,
];
const MEANS_SIZES: &[Param] = &[
    Param::ControlClusterSize,
    Param::TreatmentClusterSize,
    Param::LowerMean,
    Param::UpperMean,
    Param::Interval,
];
const PROPS_COUNTS: &[Param] = &[
    Param::ControlClusters,
    Param::TreatmentClusters,
    Param::LowerProportion,
    Param::UpperProportion,
    Param::Interval,
];
const PROPS_SIZES: &[Param] = &[
    Param::ControlClusterSize,
    Param::TreatmentClusterSize,
    Param::LowerProportion,
    Param::UpperProportion,
    Param::Interval,
];

/// The dispatch table, one row per leaf.
pub const LEAVES: [LeafSpec; 8] = [
    LeafSpec {
        leaf: Leaf::MeansIndividualEffect,
        test: TestKind::Means,
        design: DesignKind::Individual,
        method: MethodKind::VaryEffect,
        code: "MI",
        axis_description: "effect",
        axis: Axis::TreatmentMean,
        design_params: MEANS_INDIVIDUAL,
        method_params: MEAN_RANGE,
        resolution: Param::Mdes,
    },
    LeafSpec {
        leaf: Leaf::MeansIndividualSampleSize,
        test: TestKind::Means,
        design: DesignKind::Individual,
        method: MethodKind::VarySampleSize,
        code: "MI",
        axis_description: "sample_size",
        axis: Axis::ControlArmSize,
        design_params: MEANS_INDIVIDUAL,
        method_params: N_RANGE,
        resolution: Param::SampleSize,
    },
    LeafSpec {
        leaf: Leaf::MeansClusterFixedCounts,
        test: TestKind::Means,
        design: DesignKind::Cluster,
        method: MethodKind::VaryEffect,
        code: "MC",
        axis_description: "effect_fixed_counts",
        axis: Axis::TreatmentMean,
        design_params: MEANS_CLUSTER,
        method_params: MEANS_COUNTS,
        resolution: Param::Mdes,
    },
    LeafSpec {
        leaf: Leaf::MeansClusterFixedSizes,
        test: TestKind::Means,
        design: DesignKind::Cluster,
        method: MethodKind::VarySampleSize,
        code: "MC",
        axis_description: "effect_fixed_sizes",
        axis: Axis::TreatmentMean,
        design_params: MEANS_CLUSTER,
        method_params: MEANS_SIZES,
        resolution: Param::Mdes,
    },
    LeafSpec {
        leaf: Leaf::ProportionsIndividualEffect,
        test: TestKind::Proportions,
        design: DesignKind::Individual,
        method: MethodKind::VaryEffect,
        code: "PI",
        axis_description: "effect",
        axis: Axis::TreatmentProportion,
        design_params: PROPS_INDIVIDUAL,
        method_params: PROP_RANGE,
        resolution: Param::Mdes,
    },
    LeafSpec {
        leaf: Leaf::ProportionsIndividualSampleSize,
        test: TestKind::Proportions,
        design: DesignKind::Individual,
        method: MethodKind::VarySampleSize,
        code: "PI",
        axis_description: "sample_size",
        axis: Axis::ControlArmSize,
        design_params: PROPS_INDIVIDUAL,
        method_params: N_RANGE,
        resolution: Param::SampleSize,
    },
    LeafSpec {
        leaf: Leaf::ProportionsClusterFixedCounts,
        test: TestKind::Proportions,
        design: DesignKind::Cluster,
        method: MethodKind::VaryEffect,
        code: "PC",
        axis_description: "effect_fixed_counts",
        axis: Axis::TreatmentProportion,
        design_params: PROPS_CLUSTER,
        method_params: PROPS_COUNTS,
        resolution: Param::Mdes,
    },
    LeafSpec {
        leaf: Leaf::ProportionsClusterFixedSizes,
        test: TestKind::Proportions,
        design: DesignKind::Cluster,
        method: MethodKind::VarySampleSize,
        code: "PC",
        axis_description: "effect_fixed_sizes",
        axis: Axis::TreatmentProportion,
        design_params: PROPS_CLUSTER,
        method_params: PROPS_SIZES,
        resolution: Param::Mdes,
    },
];

impl Leaf {
    /// Pure dispatch from the three choices to a leaf.
    pub fn select(test: TestKind, design: DesignKind, method: MethodKind) -> Leaf {
        use DesignKind::*;
        use MethodKind::*;
        use TestKind::*;

        match (test, design, method) {
            (Means, Individual, VaryEffect) => Leaf::MeansIndividualEffect,
            (Means, Individual, VarySampleSize) => Leaf::MeansIndividualSampleSize,
            (Means, Cluster, VaryEffect) => Leaf::MeansClusterFixedCounts,
            (Means, Cluster, VarySampleSize) => Leaf::MeansClusterFixedSizes,
            (Proportions, Individual, VaryEffect) => Leaf::ProportionsIndividualEffect,
            (Proportions, Individual, VarySampleSize) => Leaf::ProportionsIndividualSampleSize,
            (Proportions, Cluster, VaryEffect) => Leaf::ProportionsClusterFixedCounts,
            (Proportions, Cluster, VarySampleSize) => Leaf::ProportionsClusterFixedSizes,
        }
    }

    /// Parameters collected once test and design are known, before the method is chosen.
    pub fn design_params(test: TestKind, design: DesignKind) -> &'static [Param] {
        Leaf::select(test, design, MethodKind::VaryEffect)
            .spec()
            .design_params
    }

    /// All leaves in table order.
    pub fn all() -> impl Iterator<Item = Leaf> {
        LEAVES.iter().map(|spec| spec.leaf)
    }

    /// The table row for this leaf.
    pub fn spec(&self) -> &'static LeafSpec {
        let index = match self {
            Leaf::MeansIndividualEffect => 0,
            Leaf::MeansIndividualSampleSize => 1,
            Leaf::MeansClusterFixedCounts => 2,
            Leaf::MeansClusterFixedSizes => 3,
            Leaf::ProportionsIndividualEffect => 4,
            Leaf::ProportionsIndividualSampleSize => 5,
            Leaf::ProportionsClusterFixedCounts => 6,
            Leaf::ProportionsClusterFixedSizes => 7,
        };
        &LEAVES[index]
    }

    /// Every parameter this leaf requires beyond alpha and power, in collection order.
    pub fn required_params(&self) -> Vec<Param> {
        let spec = self.spec();
        spec.design_params
            .iter()
            .chain(spec.method_params)
            .copied()
            .chain(std::iter::once(spec.resolution))
            .collect()
    }

    /// Whether this leaf may hold `param`.
    pub fn accepts(&self, param: Param) -> bool {
        self.required_params().contains(&param)
    }

    /// Base file name (without extension) of this leaf's sweep artifacts.
    pub fn artifact_stem(&self) -> String {
        let spec = self.spec();
        format!("{}_{}", spec.code, spec.axis_description)
    }

    /// Human-readable title.
    pub fn title(&self) -> String {
        let spec = self.spec();
        let method = match spec.design {
            DesignKind::Individual => spec.method.label(),
            DesignKind::Cluster => spec.method.cluster_label(),
        };
        format!(
            "Two-sample {} / {} / {}",
            spec.test.label(),
            spec.design.label(),
            method
        )
    }

    pub fn is_cluster(&self) -> bool {
        self.spec().design == DesignKind::Cluster
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.artifact_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_matches_select() {
        for spec in &LEAVES {
            assert_eq!(Leaf::select(spec.test, spec.design, spec.method), spec.leaf);
            assert_eq!(spec.leaf.spec().leaf, spec.leaf);
        }
    }

    #[test]
    fn test_artifact_stems_are_distinct() {
        let stems: HashSet<String> = Leaf::all().map(|l| l.artifact_stem()).collect();
        assert_eq!(stems.len(), 8);
        assert_eq!(Leaf::MeansIndividualEffect.artifact_stem(), "MI_effect");
    }

    #[test]
    fn test_cluster_leaves_use_distinct_fixed_dimension() {
        let counts = Leaf::MeansClusterFixedCounts.required_params();
        let sizes = Leaf::MeansClusterFixedSizes.required_params();

        assert!(counts.contains(&Param::ControlClusters));
        assert!(!counts.contains(&Param::ControlClusterSize));
        assert!(sizes.contains(&Param::TreatmentClusterSize));
        assert!(!sizes.contains(&Param::TreatmentClusters));
    }

    #[test]
    fn test_individual_leaves_never_require_icc() {
        for leaf in Leaf::all().filter(|l| !l.is_cluster()) {
            assert!(!leaf.accepts(Param::Icc));
            assert!(leaf.accepts(Param::NRatio));
        }
        for leaf in Leaf::all().filter(|l| l.is_cluster()) {
            assert!(leaf.accepts(Param::Icc));
            assert!(!leaf.accepts(Param::NRatio));
        }
    }

    #[test]
    fn test_required_params_have_no_duplicates() {
        for leaf in Leaf::all() {
            let params = leaf.required_params();
            let unique: HashSet<Param> = params.iter().copied().collect();
            assert_eq!(unique.len(), params.len(), "{leaf}");
        }
    }

    #[test]
    fn test_titles_name_every_choice() {
        let titles: HashSet<String> = Leaf::all().map(|l| l.title()).collect();
        assert_eq!(titles.len(), LEAVES.len());

        let title = Leaf::MeansIndividualEffect.title();
        assert!(title.starts_with("Two-sample "));
        assert!(title.contains(TestKind::Means.label()));
        assert!(title.contains(DesignKind::Individual.label()));
        assert!(title.contains(MethodKind::VaryEffect.label()));
        assert!(
            Leaf::ProportionsClusterFixedSizes
                .title()
                .contains(MethodKind::VarySampleSize.cluster_label())
        );
    }
}
