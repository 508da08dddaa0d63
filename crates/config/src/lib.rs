//! # misfit-config
//!
//! Schema validation and assembly of misfit-preprocessor configurations.
//! Raw, untyped input is walked once; every violation is collected with its
//! field path, and observation selectors are resolved against the caller's
//! universe. This crate depends on `domain` and `shared` only.

/// Config assembly entry point.
pub mod assemble;
/// Validation issues and the aggregate error.
pub mod issues;
/// JSON/TOML string front-ends and rendering.
pub mod load;
/// Configuration root.
pub mod misfit;
mod raw;
/// Clustering and PCA schema entities.
pub mod schema;
/// Workflow variants.
pub mod workflow;

pub use assemble::assemble_config;
pub use issues::{ConfigIssue, ConfigValidationError, IssueCategory, IssueKind};
pub use load::{parse_misfit_config_json, parse_misfit_config_toml, to_pretty_json};
pub use misfit::MisfitConfig;
pub use schema::{
    BaseFclusterConfig, ClusterParameters, DEFAULT_DEPTH, DEFAULT_MAX_CLUSTER_THRESHOLD,
    DEFAULT_PCA_THRESHOLD, DEFAULT_THRESHOLD, FclusterConfig, HierarchicalConfig,
    LimitedHierarchicalConfig, LinkageConfig, PcaConfig,
};
pub use workflow::{AutoScaleWorkflow, SpearmanCorrelationWorkflow, WorkflowConfig};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
