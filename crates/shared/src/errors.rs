//! Error envelope types and helpers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata attached to errors for diagnostics.
pub type ErrorMetadata = BTreeMap<String, String>;

/// High-level classification of error origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Expected failures (invalid configuration, user input).
    Expected,
    /// Unexpected failures (serialization, external collaborators).
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => formatter.write_str("expected"),
            Self::Unexpected => formatter.write_str("unexpected"),
        }
    }
}

/// Stable error code with namespace and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Create a new error code with a namespace and code.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// Internal failure code.
    pub fn internal() -> Self {
        Self::new("core", "internal")
    }

    /// Returns the namespace portion.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the code identifier.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// Structured error envelope shared across crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error kind describing the origin category.
    pub kind: ErrorKind,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Additional diagnostic metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    /// Create an expected error.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Expected, code, message)
    }

    /// Create an unexpected error.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Unexpected, code, message)
    }

    fn with_kind(kind: ErrorKind, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a single metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}: {}", self.kind, self.code, self.message)
    }
}

impl std::error::Error for ErrorEnvelope {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn error_envelope_constructors() {
        let code = ErrorCode::new("config", "invalid_misfit_config");
        let expected = ErrorEnvelope::expected(code.clone(), "invalid");
        assert_eq!(expected.kind, ErrorKind::Expected);
        assert_eq!(expected.code, code);
        assert!(expected.metadata.is_empty());

        let unexpected = ErrorEnvelope::unexpected(ErrorCode::internal(), "serialize");
        assert_eq!(unexpected.kind, ErrorKind::Unexpected);
        assert_eq!(unexpected.code.namespace(), "core");
    }

    #[test]
    fn display_includes_code_and_message() {
        let error = ErrorEnvelope::expected(ErrorCode::new("config", "invalid_json"), "bad json");
        assert_eq!(error.to_string(), "expected config:invalid_json: bad json");
    }

    #[test]
    fn metadata_round_trips_through_json() -> Result<(), Box<dyn Error>> {
        let error = ErrorEnvelope::expected(ErrorCode::new("config", "invalid_toml"), "bad")
            .with_metadata("path", "workflow -> type");
        let json = serde_json::to_string(&error)?;
        let decoded: ErrorEnvelope = serde_json::from_str(&json)?;

        assert_eq!(decoded, error);
        assert_eq!(
            decoded.metadata.get("path").map(String::as_str),
            Some("workflow -> type")
        );
        Ok(())
    }
}
