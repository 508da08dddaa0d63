//! Compile-time helpers for carrying validated invariants.

use serde::Serialize;

/// Proof wrapper indicating a value has been validated.
///
/// The only way to obtain one outside this crate is through a validating
/// constructor, so holders can rely on every invariant of `T`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Validated<T>(T);

impl<T> Validated<T> {
    /// Wrap a validated value.
    pub const fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
