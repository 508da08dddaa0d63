//! Result helpers for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;
