//! # misfit-shared
//!
//! Shared result types, error handling, and validation contracts for the
//! misfit-preprocessor workspace.
//!
//! This crate provides foundational types that are used across all other crates:
//!
//! - Result and error envelope types
//! - Field paths for locating values in nested configuration trees
//! - The `Validate` contract and the `Validated<T>` proof wrapper
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Zero-cost abstractions** - Types should compile away to efficient code
//! 3. **Serde-compatible** - All public types support serialization

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod invariants;
pub mod result;
pub mod validation;

pub use errors::{ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use invariants::Validated;
pub use result::Result;
pub use validation::{FIELD_PATH_SEPARATOR, FieldPath, PathSegment, Validate};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
