//! Field paths and the validation contract for configuration entities.

use serde::{Serialize, Serializer};
use std::fmt;

/// Separator used when rendering a [`FieldPath`].
pub const FIELD_PATH_SEPARATOR: &str = " -> ";

/// One step into a nested configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Mapping key.
    Key(Box<str>),
    /// Sequence position (0-indexed).
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => formatter.write_str(key),
            Self::Index(index) => write!(formatter, "{index}"),
        }
    }
}

/// Location of a value inside a nested configuration tree.
///
/// Rendered as `workflow -> clustering -> fcluster -> threshold`; the empty
/// path renders as `__root__`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The path of the tree root.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a path from mapping keys.
    #[must_use]
    pub fn from_keys(keys: &[&str]) -> Self {
        Self {
            segments: keys.iter().map(|key| PathSegment::Key((*key).into())).collect(),
        }
    }

    /// Return a new path extended by a mapping key.
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Return a new path extended by a sequence index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return formatter.write_str("__root__");
        }
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                formatter.write_str(FIELD_PATH_SEPARATOR)?;
            }
            write!(formatter, "{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Validate raw input into a typed, immutable value.
///
/// Implementations collect every violation they can find before returning,
/// so `Error` is usually an aggregate.
pub trait Validate: Sized {
    /// Raw input accepted by the validator.
    type Input: ?Sized;
    /// Error type returned by validation.
    type Error;

    /// Validate `input`, returning the typed value or every violation found.
    fn validate(input: &Self::Input) -> Result<Self, Self::Error>;
}
