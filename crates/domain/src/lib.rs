//! # misfit-domain
//!
//! Domain primitives and value objects for the misfit preprocessor.
//!
//! - **Primitives** - `PositiveInt`, `StrictNumber`, `UnitInterval`
//! - **Clustering** - closed literal sets for linkage, metrics, criteria, and workflows
//! - **Observations** - selector patterns and resolution against known keys
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use misfit_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod clustering;
pub mod observations;
pub mod primitives;

pub use clustering::{
    ClusteringKind, DistanceMetric, FclusterCriterion, LinkageMethod, Literal, WorkflowKind,
};
pub use observations::{
    ObservationResolveError, ObservationSet, ObservationUniverse, SelectorPattern,
    UnmatchedSelector,
};
pub use primitives::{PositiveInt, PrimitiveError, StrictNumber, UNIT_INTERVAL_MAX, UnitInterval};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================
