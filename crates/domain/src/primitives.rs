//! Domain primitives with validated constructors.

use misfit_shared::{ErrorCode, ErrorEnvelope};
use serde::{Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU64;

/// Upper bound (inclusive) of a [`UnitInterval`].
pub const UNIT_INTERVAL_MAX: f64 = 1.0;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Value must be strictly greater than zero.
    NotPositive {
        /// Offending value, rendered as given.
        value: String,
    },
    /// Value exceeds an inclusive upper bound.
    AboveMaximum {
        /// Offending value, rendered as given.
        value: String,
        /// Inclusive maximum.
        max: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotPositive { .. } => ErrorCode::new("domain", "not_positive"),
            Self::AboveMaximum { .. } => ErrorCode::new("domain", "above_maximum"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive { value } => {
                write!(formatter, "value must be greater than 0, is {value}")
            },
            Self::AboveMaximum { value, max } => {
                write!(
                    formatter,
                    "value must be less than or equal to {max}, is {value}"
                )
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::NotPositive { value } => envelope.with_metadata("value", value),
            PrimitiveError::AboveMaximum { value, max } => envelope
                .with_metadata("value", value)
                .with_metadata("max", max),
        }
    }
}

/// Strictly positive integer (`> 0`), e.g. the fcluster depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PositiveInt(NonZeroU64);

impl PositiveInt {
    /// Build from a signed integer, rejecting zero and negatives.
    pub fn from_i64(value: i64) -> Result<Self, PrimitiveError> {
        u64::try_from(value)
            .ok()
            .and_then(NonZeroU64::new)
            .map(Self)
            .ok_or_else(|| PrimitiveError::NotPositive {
                value: value.to_string(),
            })
    }

    /// Build from an unsigned integer, rejecting zero.
    pub fn from_u64(value: u64) -> Result<Self, PrimitiveError> {
        NonZeroU64::new(value)
            .map(Self)
            .ok_or_else(|| PrimitiveError::NotPositive {
                value: value.to_string(),
            })
    }

    /// Return the wrapped value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for PositiveInt {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Number that keeps the integer/float distinction of its source.
///
/// Strings and booleans never become a `StrictNumber`; callers decide how to
/// treat each variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrictNumber {
    /// Integral source value.
    Integer(i64),
    /// Integral source value above `i64::MAX`.
    Unsigned(u64),
    /// Floating point source value (even when whole, e.g. `2.0`).
    Float(f64),
}

impl StrictNumber {
    /// Returns true for the integral variant.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Integer(_) | Self::Unsigned(_))
    }

    /// Widen to `f64`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "thresholds are compared, not round-tripped"
    )]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Unsigned(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// Returns true when the value is strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        match self {
            Self::Integer(value) => value > 0,
            Self::Unsigned(value) => value > 0,
            Self::Float(value) => value > 0.0,
        }
    }
}

impl fmt::Display for StrictNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(formatter, "{value}"),
            Self::Unsigned(value) => write!(formatter, "{value}"),
            // Debug keeps the trailing `.0` on whole floats.
            Self::Float(value) => write!(formatter, "{value:?}"),
        }
    }
}

impl Serialize for StrictNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Unsigned(value) => serializer.serialize_u64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
        }
    }
}

/// Float in the half-open interval `(0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct UnitInterval(f64);

impl UnitInterval {
    /// Build a unit-interval value.
    pub fn new(value: f64) -> Result<Self, PrimitiveError> {
        if value.is_nan() || value <= 0.0 {
            return Err(PrimitiveError::NotPositive {
                value: format!("{value:?}"),
            });
        }
        if value > UNIT_INTERVAL_MAX {
            return Err(PrimitiveError::AboveMaximum {
                value: format!("{value:?}"),
                max: format!("{UNIT_INTERVAL_MAX:?}"),
            });
        }
        Ok(Self(value))
    }

    /// Return the wrapped value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for UnitInterval {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:?}", self.0)
    }
}
