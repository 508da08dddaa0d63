//! Closed literal sets for the clustering workflow.
//!
//! Every configurable choice is a fieldless enum implementing [`Literal`], so
//! raw strings are parsed against a fixed table and unknown values can be
//! reported together with the permitted set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed set of string literals backed by a fieldless enum.
pub trait Literal: Copy + Sized + 'static {
    /// Every member, in declaration order.
    const ALL: &'static [Self];

    /// Canonical string for this member.
    fn literal(self) -> &'static str;

    /// Parse an exact (case-sensitive) literal.
    fn parse(input: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.literal() == input)
    }

    /// Render the permitted set, e.g. `'single', 'complete'`.
    fn permitted() -> String {
        Self::ALL
            .iter()
            .map(|value| format!("'{}'", value.literal()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Linkage method used to merge clusters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LinkageMethod {
    /// Nearest point algorithm.
    Single,
    /// Farthest point algorithm.
    Complete,
    /// UPGMA.
    #[default]
    Average,
    /// WPGMA.
    Weighted,
    /// UPGMC.
    Centroid,
    /// Incremental minimum variance.
    Ward,
}

impl LinkageMethod {
    /// Canonical config string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Complete => "complete",
            Self::Average => "average",
            Self::Weighted => "weighted",
            Self::Centroid => "centroid",
            Self::Ward => "ward",
        }
    }
}

impl Literal for LinkageMethod {
    const ALL: &'static [Self] = &[
        Self::Single,
        Self::Complete,
        Self::Average,
        Self::Weighted,
        Self::Centroid,
        Self::Ward,
    ];

    fn literal(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for LinkageMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Pairwise distance metric handed to the linkage routine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Bray-Curtis.
    Braycurtis,
    /// Canberra.
    Canberra,
    /// Chebyshev.
    Chebyshev,
    /// City block (Manhattan).
    Cityblock,
    /// Correlation.
    Correlation,
    /// Cosine.
    Cosine,
    /// Dice.
    Dice,
    /// Euclidean.
    #[default]
    Euclidean,
    /// Hamming.
    Hamming,
    /// Jaccard.
    Jaccard,
    /// Jensen-Shannon.
    Jensenshannon,
    /// Kulsinski.
    Kulsinski,
    /// Mahalanobis.
    Mahalanobis,
    /// Matching.
    Matching,
    /// Minkowski.
    Minkowski,
    /// Rogers-Tanimoto.
    Rogerstanimoto,
    /// Russell-Rao.
    Russellrao,
    /// Standardized Euclidean.
    Seuclidean,
    /// Sokal-Michener.
    Sokalmichener,
    /// Sokal-Sneath.
    Sokalsneath,
    /// Squared Euclidean.
    Sqeuclidean,
    /// Yule.
    Yule,
}

impl DistanceMetric {
    /// Canonical config string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Braycurtis => "braycurtis",
            Self::Canberra => "canberra",
            Self::Chebyshev => "chebyshev",
            Self::Cityblock => "cityblock",
            Self::Correlation => "correlation",
            Self::Cosine => "cosine",
            Self::Dice => "dice",
            Self::Euclidean => "euclidean",
            Self::Hamming => "hamming",
            Self::Jaccard => "jaccard",
            Self::Jensenshannon => "jensenshannon",
            Self::Kulsinski => "kulsinski",
            Self::Mahalanobis => "mahalanobis",
            Self::Matching => "matching",
            Self::Minkowski => "minkowski",
            Self::Rogerstanimoto => "rogerstanimoto",
            Self::Russellrao => "russellrao",
            Self::Seuclidean => "seuclidean",
            Self::Sokalmichener => "sokalmichener",
            Self::Sokalsneath => "sokalsneath",
            Self::Sqeuclidean => "sqeuclidean",
            Self::Yule => "yule",
        }
    }
}

impl Literal for DistanceMetric {
    const ALL: &'static [Self] = &[
        Self::Braycurtis,
        Self::Canberra,
        Self::Chebyshev,
        Self::Cityblock,
        Self::Correlation,
        Self::Cosine,
        Self::Dice,
        Self::Euclidean,
        Self::Hamming,
        Self::Jaccard,
        Self::Jensenshannon,
        Self::Kulsinski,
        Self::Mahalanobis,
        Self::Matching,
        Self::Minkowski,
        Self::Rogerstanimoto,
        Self::Russellrao,
        Self::Seuclidean,
        Self::Sokalmichener,
        Self::Sokalsneath,
        Self::Sqeuclidean,
        Self::Yule,
    ];

    fn literal(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Rule used to extract flat clusters from the hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FclusterCriterion {
    /// Inconsistency coefficient cutoff.
    #[default]
    Inconsistent,
    /// Cophenetic distance cutoff.
    Distance,
    /// Maximum number of clusters.
    Maxclust,
    /// Monotonic criterion cutoff.
    Monocrit,
    /// Maximum number of clusters on a monotonic criterion.
    MaxclustMonocrit,
}

impl FclusterCriterion {
    /// Canonical config string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inconsistent => "inconsistent",
            Self::Distance => "distance",
            Self::Maxclust => "maxclust",
            Self::Monocrit => "monocrit",
            Self::MaxclustMonocrit => "maxclust_monocrit",
        }
    }

    /// Returns true for criteria whose threshold counts clusters.
    #[must_use]
    pub const fn is_max_cluster(self) -> bool {
        matches!(self, Self::Maxclust | Self::MaxclustMonocrit)
    }
}

impl Literal for FclusterCriterion {
    const ALL: &'static [Self] = &[
        Self::Inconsistent,
        Self::Distance,
        Self::Maxclust,
        Self::Monocrit,
        Self::MaxclustMonocrit,
    ];

    fn literal(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for FclusterCriterion {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Discriminator of the hierarchical clustering family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusteringKind {
    /// Linkage plus full fcluster parameters.
    Hierarchical,
    /// Linkage plus depth only.
    LimitedHierarchical,
}

impl ClusteringKind {
    /// Canonical config string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::LimitedHierarchical => "limited_hierarchical",
        }
    }

    /// Workflow that owns this clustering variant.
    #[must_use]
    pub const fn workflow_kind(self) -> WorkflowKind {
        match self {
            Self::Hierarchical => WorkflowKind::SpearmanCorrelation,
            Self::LimitedHierarchical => WorkflowKind::AutoScale,
        }
    }
}

impl Literal for ClusteringKind {
    const ALL: &'static [Self] = &[Self::Hierarchical, Self::LimitedHierarchical];

    fn literal(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ClusteringKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Discriminator of the workflow family.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    /// Automatic scaling with limited clustering.
    #[default]
    AutoScale,
    /// Spearman correlation with full hierarchical clustering.
    SpearmanCorrelation,
}

impl WorkflowKind {
    /// Canonical config string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AutoScale => "auto_scale",
            Self::SpearmanCorrelation => "spearman_correlation",
        }
    }

    /// Clustering variant owned by this workflow.
    #[must_use]
    pub const fn clustering_kind(self) -> ClusteringKind {
        match self {
            Self::AutoScale => ClusteringKind::LimitedHierarchical,
            Self::SpearmanCorrelation => ClusteringKind::Hierarchical,
        }
    }
}

impl Literal for WorkflowKind {
    const ALL: &'static [Self] = &[Self::AutoScale, Self::SpearmanCorrelation];

    fn literal(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
