//! Validation issues and their aggregate error.
//!
//! Every violation found during one validation pass becomes a [`ConfigIssue`];
//! the pass returns them together as a [`ConfigValidationError`].

use misfit_shared::{ErrorCode, ErrorEnvelope, FieldPath};
use serde::Serialize;
use std::fmt;

/// Broad family of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Shape, type, range, or membership violation.
    Schema,
    /// Cross-field or environment-dependent rule violation.
    BusinessRule,
}

/// Specific kind of validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Key not recognized by the section schema.
    UnknownField,
    /// Value has the wrong type (including `null`).
    InvalidType,
    /// Numeric value outside its permitted range.
    OutOfRange,
    /// String outside its closed literal set.
    NotOneOf,
    /// Max-cluster criterion combined with a float threshold.
    CriterionThresholdMismatch,
    /// Unknown (or missing) discriminator tag.
    UnknownVariant,
    /// Known discriminator tag not allowed in this position.
    UnsupportedVariant,
    /// Observation selector that matched nothing.
    UnmatchedObservation,
}

impl IssueKind {
    /// Category this kind belongs to.
    #[must_use]
    pub const fn category(self) -> IssueCategory {
        match self {
            Self::UnknownField | Self::InvalidType | Self::OutOfRange | Self::NotOneOf => {
                IssueCategory::Schema
            },
            Self::CriterionThresholdMismatch
            | Self::UnknownVariant
            | Self::UnsupportedVariant
            | Self::UnmatchedObservation => IssueCategory::BusinessRule,
        }
    }

    /// Stable snake-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownField => "unknown_field",
            Self::InvalidType => "invalid_type",
            Self::OutOfRange => "out_of_range",
            Self::NotOneOf => "not_one_of",
            Self::CriterionThresholdMismatch => "criterion_threshold_mismatch",
            Self::UnknownVariant => "unknown_variant",
            Self::UnsupportedVariant => "unsupported_variant",
            Self::UnmatchedObservation => "unmatched_observation",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One field-path-qualified violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    path: FieldPath,
    kind: IssueKind,
    category: IssueCategory,
    message: String,
}

impl ConfigIssue {
    /// Build an issue; the category follows from `kind`.
    #[must_use]
    pub fn new(path: FieldPath, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            category: kind.category(),
            message: message.into(),
        }
    }

    /// Location of the offending value.
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Kind of violation.
    #[must_use]
    pub const fn kind(&self) -> IssueKind {
        self.kind
    }

    /// Schema or business-rule family.
    #[must_use]
    pub const fn category(&self) -> IssueCategory {
        self.category
    }

    /// Human readable message, including the offending value.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "- {} (at {})", self.message, self.path)
    }
}

/// Aggregate of every issue found in one validation pass. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigValidationError {
    issues: Vec<ConfigIssue>,
}

impl ConfigValidationError {
    /// Borrow the issues in discovery order.
    #[must_use]
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// Number of issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true when no issue was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true when some issue has `kind` at exactly `path`.
    #[must_use]
    pub fn has_issue_at(&self, path: &FieldPath, kind: IssueKind) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.kind == kind && issue.path == *path)
    }

    /// Consume and return the issues.
    #[must_use]
    pub fn into_issues(self) -> Vec<ConfigIssue> {
        self.issues
    }

    fn error_code() -> ErrorCode {
        ErrorCode::new("config", "invalid_misfit_config")
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "invalid misfit config ({} issue{}):",
            self.issues.len(),
            if self.issues.len() == 1 { "" } else { "s" }
        )?;
        for issue in &self.issues {
            write!(formatter, "\n{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigValidationError {}

impl From<ConfigValidationError> for ErrorEnvelope {
    fn from(error: ConfigValidationError) -> Self {
        let paths = error
            .issues
            .iter()
            .map(|issue| issue.path.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::expected(ConfigValidationError::error_code(), error.to_string())
            .with_metadata("issue_count", error.issues.len().to_string())
            .with_metadata("paths", paths)
    }
}

/// Collects issues while a raw tree is walked.
#[derive(Debug, Default)]
pub(crate) struct IssueSink {
    issues: Vec<ConfigIssue>,
}

impl IssueSink {
    pub(crate) fn push(&mut self, path: FieldPath, kind: IssueKind, message: impl Into<String>) {
        self.issues.push(ConfigIssue::new(path, kind, message));
    }

    #[cfg(test)]
    pub(crate) fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Turn the collected state into a result.
    ///
    /// A value is only returned when no issue was recorded; a missing value
    /// with no issue is reported against the root.
    pub(crate) fn finish<T>(self, value: Option<T>) -> Result<T, ConfigValidationError> {
        match value {
            Some(value) if self.issues.is_empty() => Ok(value),
            Some(_) => Err(ConfigValidationError {
                issues: self.issues,
            }),
            None => {
                let mut issues = self.issues;
                if issues.is_empty() {
                    issues.push(ConfigIssue::new(
                        FieldPath::root(),
                        IssueKind::InvalidType,
                        "value could not be validated",
                    ));
                }
                Err(ConfigValidationError { issues })
            },
        }
    }
}
