//! Workflow variants.
//!
//! The `type` tag selects the variant; each variant owns exactly one
//! clustering schema plus a PCA section.

use crate::issues::{IssueKind, IssueSink};
use crate::raw::{Section, render};
use crate::schema::{
    ClusterParameters, FromSection, HierarchicalConfig, LimitedHierarchicalConfig, PcaConfig,
    check_clustering_tag, nested, validate_from_section,
};
use misfit_domain::{Literal, WorkflowKind};
use misfit_shared::FieldPath;
use serde::Serialize;
use serde_json::Value;

/// Automatic scaling workflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AutoScaleWorkflow {
    clustering: LimitedHierarchicalConfig,
    pca: PcaConfig,
}

impl AutoScaleWorkflow {
    /// Limited hierarchical clustering parameters.
    #[must_use]
    pub const fn clustering(&self) -> &LimitedHierarchicalConfig {
        &self.clustering
    }
}

/// Spearman correlation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpearmanCorrelationWorkflow {
    clustering: HierarchicalConfig,
    pca: PcaConfig,
}

impl SpearmanCorrelationWorkflow {
    /// Full hierarchical clustering parameters.
    #[must_use]
    pub const fn clustering(&self) -> &HierarchicalConfig {
        &self.clustering
    }
}

/// Workflow section, discriminated by its `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowConfig {
    /// `auto_scale`
    AutoScale(AutoScaleWorkflow),
    /// `spearman_correlation`
    SpearmanCorrelation(SpearmanCorrelationWorkflow),
}

impl WorkflowConfig {
    /// Workflow discriminator.
    #[must_use]
    pub const fn kind(&self) -> WorkflowKind {
        match self {
            Self::AutoScale(_) => WorkflowKind::AutoScale,
            Self::SpearmanCorrelation(_) => WorkflowKind::SpearmanCorrelation,
        }
    }

    /// Clustering parameters owned by the variant.
    #[must_use]
    pub fn clustering(&self) -> &dyn ClusterParameters {
        match self {
            Self::AutoScale(workflow) => &workflow.clustering,
            Self::SpearmanCorrelation(workflow) => &workflow.clustering,
        }
    }

    /// PCA parameters.
    #[must_use]
    pub const fn pca(&self) -> &PcaConfig {
        match self {
            Self::AutoScale(workflow) => &workflow.pca,
            Self::SpearmanCorrelation(workflow) => &workflow.pca,
        }
    }

    /// Build the default workflow variant from an absent section.
    pub(crate) fn defaults(path: FieldPath, sink: &mut IssueSink) -> Option<Self> {
        let mut section = Section::empty(path);
        Self::build(WorkflowKind::default(), &mut section, sink)
    }

    fn build(kind: WorkflowKind, section: &mut Section<'_>, sink: &mut IssueSink) -> Option<Self> {
        let clustering_path = section.child("clustering");
        let clustering_raw = section.take("clustering");
        let owned = clustering_tag_matches(clustering_raw, kind, &clustering_path, sink);
        let pca_path = section.child("pca");

        match kind {
            WorkflowKind::AutoScale => {
                let clustering: Option<LimitedHierarchicalConfig> = if owned {
                    nested(clustering_raw, clustering_path, sink)
                } else {
                    None
                };
                let pca = nested(section.take("pca"), pca_path, sink);
                Some(Self::AutoScale(AutoScaleWorkflow {
                    clustering: clustering?,
                    pca: pca?,
                }))
            },
            WorkflowKind::SpearmanCorrelation => {
                let clustering: Option<HierarchicalConfig> = if owned {
                    nested(clustering_raw, clustering_path, sink)
                } else {
                    None
                };
                let pca = nested(section.take("pca"), pca_path, sink);
                Some(Self::SpearmanCorrelation(SpearmanCorrelationWorkflow {
                    clustering: clustering?,
                    pca: pca?,
                }))
            },
        }
    }
}

/// Check an explicit clustering `type` against the variant `owner` accepts.
fn clustering_tag_matches(
    raw: Option<&Value>,
    owner: WorkflowKind,
    path: &FieldPath,
    sink: &mut IssueSink,
) -> bool {
    let Some(tag) = raw.and_then(|clustering| clustering.get("type")) else {
        return true;
    };
    check_clustering_tag(tag, owner.clustering_kind(), path.key("type"), sink)
}

impl FromSection for WorkflowConfig {
    fn from_section(section: &mut Section<'_>, sink: &mut IssueSink) -> Option<Self> {
        let type_path = section.child("type");
        let tag = section.take("type");
        let Some(kind) = tag.and_then(Value::as_str).and_then(WorkflowKind::parse) else {
            let shown = tag.map_or_else(|| "None".to_string(), render);
            sink.push(
                type_path,
                IssueKind::UnknownVariant,
                format!("Unknown workflow {shown}"),
            );
            section.abandon();
            return None;
        };
        Self::build(kind, section, sink)
    }
}

validate_from_section!(WorkflowConfig);
