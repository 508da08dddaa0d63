//! Schema entities for the clustering and PCA sections.
//!
//! Every entity is an immutable value object built from a raw section. Each
//! one also implements [`Validate`](misfit_shared::Validate) over a raw
//! `serde_json::Value`, so it can be checked on its own with paths relative
//! to its own root.

use crate::issues::{IssueKind, IssueSink};
use crate::raw::{Section, literal, positive_int, render, strict_number, unit_interval};
use misfit_domain::{
    ClusteringKind, DistanceMetric, FclusterCriterion, LinkageMethod, Literal, PositiveInt,
    StrictNumber, UnitInterval,
};
use misfit_shared::FieldPath;
use serde::Serialize;
use serde_json::{Map, Value};

/// Default fcluster depth.
pub const DEFAULT_DEPTH: u64 = 2;
/// Default threshold for max-cluster criteria.
pub const DEFAULT_MAX_CLUSTER_THRESHOLD: i64 = 5;
/// Default threshold for every other criterion.
pub const DEFAULT_THRESHOLD: f64 = 1.15;
/// Default PCA variance threshold.
pub const DEFAULT_PCA_THRESHOLD: f64 = 0.95;

/// Construction from a raw section, reporting into a shared sink.
pub(crate) trait FromSection: Sized {
    fn from_section(section: &mut Section<'_>, sink: &mut IssueSink) -> Option<Self>;
}

/// Open the section at `path`, build `T` from it and report leftover keys.
pub(crate) fn nested<T: FromSection>(
    value: Option<&Value>,
    path: FieldPath,
    sink: &mut IssueSink,
) -> Option<T> {
    let mut section = Section::open(value, path, sink)?;
    let built = T::from_section(&mut section, sink);
    section.close(sink);
    built
}

macro_rules! validate_from_section {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl ::misfit_shared::Validate for $entity {
                type Input = ::serde_json::Value;
                type Error = $crate::issues::ConfigValidationError;

                fn validate(
                    input: &::serde_json::Value,
                ) -> Result<Self, $crate::issues::ConfigValidationError> {
                    let mut sink = $crate::issues::IssueSink::default();
                    let built = $crate::schema::nested::<Self>(
                        Some(input),
                        ::misfit_shared::FieldPath::root(),
                        &mut sink,
                    );
                    sink.finish(built)
                }
            }
        )+
    };
}

pub(crate) use validate_from_section;

/// Linkage parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LinkageConfig {
    method: LinkageMethod,
    metric: DistanceMetric,
}

impl LinkageConfig {
    /// Linkage method.
    #[must_use]
    pub const fn method(&self) -> LinkageMethod {
        self.method
    }

    /// Distance metric.
    #[must_use]
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

impl FromSection for LinkageConfig {
    fn from_section(section: &mut Section<'_>, sink: &mut IssueSink) -> Option<Self> {
        let method = literal(
            section.take("method"),
            LinkageMethod::default(),
            section.child("method"),
            sink,
        );
        let metric = literal(
            section.take("metric"),
            DistanceMetric::default(),
            section.child("metric"),
            sink,
        );
        Some(Self {
            method: method?,
            metric: metric?,
        })
    }
}

/// Fcluster parameters carrying only the depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BaseFclusterConfig {
    depth: PositiveInt,
}

impl BaseFclusterConfig {
    /// Depth used by the inconsistency calculation.
    #[must_use]
    pub const fn depth(&self) -> PositiveInt {
        self.depth
    }
}

impl FromSection for BaseFclusterConfig {
    fn from_section(section: &mut Section<'_>, sink: &mut IssueSink) -> Option<Self> {
        let depth = positive_int(
            section.take("depth"),
            DEFAULT_DEPTH,
            section.child("depth"),
            sink,
        )?;
        Some(Self { depth })
    }
}

/// Full fcluster parameters.
///
/// The threshold type and default depend on the criterion: max-cluster
/// criteria count clusters, so their threshold is an integer (default 5);
/// other criteria take any positive number (default 1.15).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FclusterConfig {
    depth: PositiveInt,
    criterion: FclusterCriterion,
    threshold: StrictNumber,
}

impl FclusterConfig {
    /// Depth used by the inconsistency calculation.
    #[must_use]
    pub const fn depth(&self) -> PositiveInt {
        self.depth
    }

    /// Flat-cluster criterion.
    #[must_use]
    pub const fn criterion(&self) -> FclusterCriterion {
        self.criterion
    }

    /// Criterion cutoff, always strictly positive.
    #[must_use]
    pub const fn threshold(&self) -> StrictNumber {
        self.threshold
    }
}

impl FromSection for FclusterConfig {
    fn from_section(section: &mut Section<'_>, sink: &mut IssueSink) -> Option<Self> {
        let depth = positive_int(
            section.take("depth"),
            DEFAULT_DEPTH,
            section.child("depth"),
            sink,
        );
        let criterion = literal(
            section.take("criterion"),
            FclusterCriterion::default(),
            section.child("criterion"),
            sink,
        );
        let max_cluster = criterion.is_some_and(FclusterCriterion::is_max_cluster);
        let threshold_path = section.child("threshold");

        let threshold = match section.take("threshold") {
            None if max_cluster => Some(StrictNumber::Integer(DEFAULT_MAX_CLUSTER_THRESHOLD)),
            None => Some(StrictNumber::Float(DEFAULT_THRESHOLD)),
            Some(raw) => match strict_number(raw, threshold_path.clone(), sink) {
                Some(number) if max_cluster && !number.is_integer() => {
                    sink.push(
                        threshold_path,
                        IssueKind::CriterionThresholdMismatch,
                        "threshold must be an integer if a max cluster criterion is chosen",
                    );
                    None
                },
                Some(number) if !number.is_positive() => {
                    sink.push(
                        threshold_path,
                        IssueKind::OutOfRange,
                        format!("threshold must be larger than zero, is {number}"),
                    );
                    None
                },
                parsed => parsed,
            },
        };

        Some(Self {
            depth: depth?,
            criterion: criterion?,
            threshold: threshold?,
        })
    }
}

/// Read-only view of a clustering section handed to the clustering routine.
pub trait ClusterParameters {
    /// Discriminator of the clustering variant.
    fn kind(&self) -> ClusteringKind;

    /// Linkage parameters.
    fn linkage(&self) -> &LinkageConfig;

    /// Fcluster depth.
    fn depth(&self) -> PositiveInt;

    /// Flattened keyword arguments: linkage keys followed by fcluster keys.
    fn cluster_args(&self) -> Map<String, Value>;
}

fn linkage_args(linkage: &LinkageConfig, depth: PositiveInt) -> Map<String, Value> {
    let mut args = Map::new();
    args.insert("method".to_string(), Value::from(linkage.method.as_str()));
    args.insert("metric".to_string(), Value::from(linkage.metric.as_str()));
    args.insert("depth".to_string(), Value::from(depth.get()));
    args
}

/// Check a clustering `type` tag against the variant `expected`.
///
/// A known but foreign tag is named together with the workflow that owns
/// `expected`.
pub(crate) fn check_clustering_tag(
    tag: &Value,
    expected: ClusteringKind,
    path: FieldPath,
    sink: &mut IssueSink,
) -> bool {
    match tag.as_str().and_then(ClusteringKind::parse) {
        Some(kind) if kind == expected => true,
        Some(kind) => {
            sink.push(
                path,
                IssueKind::UnsupportedVariant,
                format!(
                    "Clustering {kind} is not supported by workflow {}",
                    expected.workflow_kind()
                ),
            );
            false
        },
        None => {
            sink.push(
                path,
                IssueKind::UnknownVariant,
                format!("Unknown clustering {}", render(tag)),
            );
            false
        },
    }
}

/// Consume the optional `type` tag; absent tags default to `expected`.
fn expect_clustering_tag(
    section: &mut Section<'_>,
    expected: ClusteringKind,
    sink: &mut IssueSink,
) -> Option<()> {
    let path = section.child("type");
    match section.take("type") {
        None => Some(()),
        Some(tag) => check_clustering_tag(tag, expected, path, sink).then_some(()),
    }
}

/// Hierarchical clustering with full fcluster parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename = "hierarchical")]
pub struct HierarchicalConfig {
    linkage: LinkageConfig,
    fcluster: FclusterConfig,
}

impl HierarchicalConfig {
    /// Fcluster parameters.
    #[must_use]
    pub const fn fcluster(&self) -> &FclusterConfig {
        &self.fcluster
    }
}

impl ClusterParameters for HierarchicalConfig {
    fn kind(&self) -> ClusteringKind {
        ClusteringKind::Hierarchical
    }

    fn linkage(&self) -> &LinkageConfig {
        &self.linkage
    }

    fn depth(&self) -> PositiveInt {
        self.fcluster.depth
    }

    fn cluster_args(&self) -> Map<String, Value> {
        let mut args = linkage_args(&self.linkage, self.fcluster.depth);
        args.insert(
            "criterion".to_string(),
            Value::from(self.fcluster.criterion.as_str()),
        );
        let threshold = match self.fcluster.threshold {
            StrictNumber::Integer(value) => Value::from(value),
            StrictNumber::Unsigned(value) => Value::from(value),
            StrictNumber::Float(value) => Value::from(value),
        };
        args.insert("threshold".to_string(), threshold);
        args
    }
}

impl FromSection for HierarchicalConfig {
    fn from_section(section: &mut Section<'_>, sink: &mut IssueSink) -> Option<Self> {
        let tag = expect_clustering_tag(section, ClusteringKind::Hierarchical, sink);
        let linkage = nested(section.take("linkage"), section.child("linkage"), sink);
        let fcluster = nested(section.take("fcluster"), section.child("fcluster"), sink);
        tag?;
        Some(Self {
            linkage: linkage?,
            fcluster: fcluster?,
        })
    }
}

/// Hierarchical clustering limited to linkage and depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "limited_hierarchical")]
pub struct LimitedHierarchicalConfig {
    linkage: LinkageConfig,
    fcluster: BaseFclusterConfig,
}

impl LimitedHierarchicalConfig {
    /// Fcluster parameters.
    #[must_use]
    pub const fn fcluster(&self) -> &BaseFclusterConfig {
        &self.fcluster
    }
}

impl ClusterParameters for LimitedHierarchicalConfig {
    fn kind(&self) -> ClusteringKind {
        ClusteringKind::LimitedHierarchical
    }

    fn linkage(&self) -> &LinkageConfig {
        &self.linkage
    }

    fn depth(&self) -> PositiveInt {
        self.fcluster.depth
    }

    fn cluster_args(&self) -> Map<String, Value> {
        linkage_args(&self.linkage, self.fcluster.depth)
    }
}

impl FromSection for LimitedHierarchicalConfig {
    fn from_section(section: &mut Section<'_>, sink: &mut IssueSink) -> Option<Self> {
        let tag = expect_clustering_tag(section, ClusteringKind::LimitedHierarchical, sink);
        let linkage = nested(section.take("linkage"), section.child("linkage"), sink);
        let fcluster = nested(section.take("fcluster"), section.child("fcluster"), sink);
        tag?;
        Some(Self {
            linkage: linkage?,
            fcluster: fcluster?,
        })
    }
}

/// Principal component analysis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PcaConfig {
    threshold: UnitInterval,
}

impl PcaConfig {
    /// Explained-variance threshold in `(0, 1.0]`.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold.get()
    }
}

impl FromSection for PcaConfig {
    fn from_section(section: &mut Section<'_>, sink: &mut IssueSink) -> Option<Self> {
        let threshold = unit_interval(
            section.take("threshold"),
            DEFAULT_PCA_THRESHOLD,
            section.child("threshold"),
            sink,
        )?;
        Some(Self { threshold })
    }
}

validate_from_section!(
    LinkageConfig,
    BaseFclusterConfig,
    FclusterConfig,
    HierarchicalConfig,
    LimitedHierarchicalConfig,
    PcaConfig,
);

#[cfg(test)]
mod tests {
    use super::*;
    use misfit_shared::Validate;
    use proptest::prelude::*;
    use serde_json::json;
    use std::error::Error;

    fn threshold_path() -> FieldPath {
        FieldPath::from_keys(&["threshold"])
    }

    #[test]
    fn fcluster_defaults_follow_criterion() -> Result<(), Box<dyn Error>> {
        for criterion in FclusterCriterion::ALL {
            let config = FclusterConfig::validate(&json!({"criterion": criterion.as_str()}))?;
            let expected = if criterion.is_max_cluster() {
                StrictNumber::Integer(5)
            } else {
                StrictNumber::Float(1.15)
            };
            assert_eq!(config.threshold(), expected, "criterion {criterion}");
            assert_eq!(config.depth().get(), 2);
        }
        Ok(())
    }

    #[test]
    fn max_cluster_criteria_reject_float_thresholds() -> Result<(), Box<dyn Error>> {
        for criterion in ["maxclust", "maxclust_monocrit"] {
            let Err(error) =
                FclusterConfig::validate(&json!({"criterion": criterion, "threshold": 1.2}))
            else {
                return Err(format!("{criterion} accepted a float threshold").into());
            };
            assert!(error.has_issue_at(&threshold_path(), IssueKind::CriterionThresholdMismatch));
            assert_eq!(error.len(), 1);
        }
        Ok(())
    }

    #[test]
    fn integer_threshold_is_valid_for_every_criterion() -> Result<(), Box<dyn Error>> {
        for criterion in FclusterCriterion::ALL {
            let config = FclusterConfig::validate(
                &json!({"criterion": criterion.as_str(), "threshold": 12}),
            )?;
            assert_eq!(config.threshold(), StrictNumber::Integer(12));
        }
        Ok(())
    }

    #[test]
    fn thresholds_beyond_i64_stay_integers() -> Result<(), Box<dyn Error>> {
        let beyond = 9_223_372_036_854_775_808_u64;
        let config = HierarchicalConfig::validate(&json!({
            "fcluster": {"criterion": "maxclust", "threshold": beyond}
        }))?;
        assert_eq!(config.fcluster().threshold(), StrictNumber::Unsigned(beyond));
        assert!(
            config
                .cluster_args()
                .get("threshold")
                .is_some_and(|threshold| threshold.as_u64() == Some(beyond))
        );
        Ok(())
    }

    #[test]
    fn non_positive_and_null_thresholds_fail() {
        for criterion in FclusterCriterion::ALL {
            for threshold in [json!(0), json!(-1), Value::Null] {
                let result = FclusterConfig::validate(
                    &json!({"criterion": criterion.as_str(), "threshold": threshold}),
                );
                assert!(result.is_err(), "{criterion} accepted {threshold}");
            }
        }
    }

    #[test]
    fn zero_threshold_names_the_value() -> Result<(), Box<dyn Error>> {
        let Err(error) = FclusterConfig::validate(&json!({"threshold": 0.0})) else {
            return Err("zero threshold accepted".into());
        };
        let messages: Vec<_> = error.issues().iter().map(|issue| issue.message()).collect();
        assert_eq!(messages, vec!["threshold must be larger than zero, is 0.0"]);
        Ok(())
    }

    #[test]
    fn depth_rejections_are_reported_with_threshold_issues() -> Result<(), Box<dyn Error>> {
        let Err(error) = FclusterConfig::validate(&json!({"depth": 1.5, "threshold": -1})) else {
            return Err("invalid depth and threshold accepted".into());
        };
        assert!(error.has_issue_at(&FieldPath::from_keys(&["depth"]), IssueKind::InvalidType));
        assert!(error.has_issue_at(&threshold_path(), IssueKind::OutOfRange));
        Ok(())
    }

    #[test]
    fn base_fcluster_rejects_extended_keys() -> Result<(), Box<dyn Error>> {
        let Err(error) = BaseFclusterConfig::validate(&json!({"criterion": "distance"})) else {
            return Err("criterion accepted by base fcluster".into());
        };
        assert!(error.has_issue_at(
            &FieldPath::from_keys(&["criterion"]),
            IssueKind::UnknownField
        ));
        Ok(())
    }

    #[test]
    fn hierarchical_flattens_cluster_args() -> Result<(), Box<dyn Error>> {
        let config = HierarchicalConfig::validate(&json!({
            "type": "hierarchical",
            "linkage": {"method": "complete", "metric": "jensenshannon"},
            "fcluster": {"criterion": "maxclust"}
        }))?;
        assert_eq!(
            Value::Object(config.cluster_args()),
            json!({
                "method": "complete",
                "metric": "jensenshannon",
                "depth": 2,
                "criterion": "maxclust",
                "threshold": 5
            })
        );
        assert_eq!(config.kind(), ClusteringKind::Hierarchical);
        Ok(())
    }

    #[test]
    fn limited_hierarchical_flattens_linkage_and_depth() -> Result<(), Box<dyn Error>> {
        let config = LimitedHierarchicalConfig::validate(&json!({"fcluster": {"depth": 4}}))?;
        assert_eq!(
            Value::Object(config.cluster_args()),
            json!({"method": "average", "metric": "euclidean", "depth": 4})
        );
        Ok(())
    }

    #[test]
    fn clustering_tag_must_match_variant() -> Result<(), Box<dyn Error>> {
        let type_path = FieldPath::from_keys(&["type"]);
        let Err(error) = HierarchicalConfig::validate(&json!({"type": "limited_hierarchical"}))
        else {
            return Err("mismatched tag accepted".into());
        };
        assert!(error.has_issue_at(&type_path, IssueKind::UnsupportedVariant));
        assert_eq!(
            error.issues().first().map(|issue| issue.message()),
            Some("Clustering limited_hierarchical is not supported by workflow spearman_correlation")
        );

        let Err(error) = LimitedHierarchicalConfig::validate(&json!({"type": "k_means"})) else {
            return Err("unknown tag accepted".into());
        };
        assert!(error.has_issue_at(&type_path, IssueKind::UnknownVariant));
        Ok(())
    }

    #[test]
    fn linkage_reports_both_fields() -> Result<(), Box<dyn Error>> {
        let Err(error) = LinkageConfig::validate(&json!({"method": null, "metric": "secret"}))
        else {
            return Err("invalid linkage accepted".into());
        };
        assert!(error.has_issue_at(&FieldPath::from_keys(&["method"]), IssueKind::NotOneOf));
        assert!(error.has_issue_at(&FieldPath::from_keys(&["metric"]), IssueKind::NotOneOf));
        Ok(())
    }

    #[test]
    fn pca_threshold_bounds() -> Result<(), Box<dyn Error>> {
        let default = PcaConfig::validate(&json!({}))?;
        assert!((default.threshold() - 0.95).abs() < f64::EPSILON);
        let widened = PcaConfig::validate(&json!({"threshold": 1}))?;
        assert!((widened.threshold() - 1.0).abs() < f64::EPSILON);
        for threshold in [json!(-1), json!(0), json!(10), json!(1.0001), json!("0.5")] {
            assert!(
                PcaConfig::validate(&json!({"threshold": threshold})).is_err(),
                "accepted {threshold}"
            );
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn positive_depths_are_accepted(depth in 1_u64..=10_000_000_000) {
            let config = BaseFclusterConfig::validate(&json!({"depth": depth}));
            prop_assert_eq!(config.map(|config| config.depth().get()).ok(), Some(depth));
        }

        #[test]
        fn positive_float_thresholds_pass_non_max_criteria(threshold in 1e-6_f64..1e6) {
            let config = FclusterConfig::validate(
                &json!({"criterion": "distance", "threshold": threshold}),
            );
            prop_assert!(config.is_ok());
        }
    }
}
