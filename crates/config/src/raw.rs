//! Walker over the raw, untyped configuration tree.
//!
//! A [`Section`] wraps one mapping of the tree together with its
//! [`FieldPath`]. Fields are taken out one by one; whatever is left when the
//! section is closed is reported as an unknown field.

use crate::issues::{IssueKind, IssueSink};
use misfit_domain::{Literal, PositiveInt, StrictNumber, UnitInterval};
use misfit_shared::FieldPath;
use serde_json::{Map, Number, Value};
use std::collections::BTreeSet;

/// One mapping of the raw tree, tracking which keys were consumed.
#[derive(Debug)]
pub(crate) struct Section<'a> {
    path: FieldPath,
    entries: Option<&'a Map<String, Value>>,
    taken: BTreeSet<&'a str>,
}

impl<'a> Section<'a> {
    /// Open the mapping at `path`.
    ///
    /// An absent value opens an empty section (all defaults). Anything other
    /// than a mapping is reported and yields `None`.
    pub(crate) fn open(
        value: Option<&'a Value>,
        path: FieldPath,
        sink: &mut IssueSink,
    ) -> Option<Self> {
        match value {
            None => Some(Self::empty(path)),
            Some(Value::Object(entries)) => Some(Self::new(path, Some(entries))),
            Some(other) => {
                sink.push(
                    path,
                    IssueKind::InvalidType,
                    format!("value must be a mapping, got {}", describe(other)),
                );
                None
            },
        }
    }

    /// Section with no entries; every field takes its default.
    pub(crate) const fn empty(path: FieldPath) -> Self {
        Self::new(path, None)
    }

    const fn new(path: FieldPath, entries: Option<&'a Map<String, Value>>) -> Self {
        Self {
            path,
            entries,
            taken: BTreeSet::new(),
        }
    }

    /// Path of a child field.
    pub(crate) fn child(&self, key: &str) -> FieldPath {
        self.path.key(key)
    }

    /// Look at a field without consuming it.
    pub(crate) fn peek(&self, key: &str) -> Option<&'a Value> {
        self.entries.and_then(|entries| entries.get(key))
    }

    /// Consume a field.
    pub(crate) fn take(&mut self, key: &'a str) -> Option<&'a Value> {
        let value = self.peek(key);
        if value.is_some() {
            self.taken.insert(key);
        }
        value
    }

    /// Mark every remaining field as consumed.
    ///
    /// Used when the section schema could not be determined, so leftovers are
    /// not meaningful.
    pub(crate) fn abandon(&mut self) {
        let keys = self.entries.into_iter().flat_map(Map::keys);
        self.taken.extend(keys.map(String::as_str));
    }

    /// Report every field that was never consumed.
    pub(crate) fn close(self, sink: &mut IssueSink) {
        for key in self.entries.into_iter().flat_map(Map::keys) {
            if !self.taken.contains(key.as_str()) {
                sink.push(
                    self.path.key(key),
                    IssueKind::UnknownField,
                    "extra fields not permitted",
                );
            }
        }
    }
}

/// Render a raw value for messages; strings are shown unquoted.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

fn quoted(value: &Value) -> String {
    match value {
        Value::String(text) => format!("'{text}'"),
        other => describe(other),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => format!("boolean {value}"),
        Value::Number(_) => format!("number {value}"),
        Value::String(_) => format!("string {value}"),
        Value::Array(_) => "list".to_string(),
        Value::Object(_) => "mapping".to_string(),
    }
}

/// Classify a raw JSON number without coercing its kind.
pub(crate) fn strict_number_of(value: &Value) -> Option<StrictNumber> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(integer) = number.as_i64() {
        return Some(StrictNumber::Integer(integer));
    }
    if let Some(unsigned) = number.as_u64() {
        return Some(StrictNumber::Unsigned(unsigned));
    }
    number.as_f64().map(StrictNumber::Float)
}

/// Parse a closed literal; absent fields take `default`.
pub(crate) fn literal<L: Literal>(
    value: Option<&Value>,
    default: L,
    path: FieldPath,
    sink: &mut IssueSink,
) -> Option<L> {
    let Some(value) = value else {
        return Some(default);
    };
    let parsed = value.as_str().and_then(L::parse);
    if parsed.is_none() {
        sink.push(
            path,
            IssueKind::NotOneOf,
            format!(
                "unexpected value {}; permitted: {}",
                quoted(value),
                L::permitted()
            ),
        );
    }
    parsed
}

/// `2^64`, the first whole number above `u64::MAX`.
const U64_LIMIT: f64 = 1.844_674_407_370_955_2e19;

/// Integer literals too large for `u64` reach us as floats past this limit.
fn is_oversized_integer(number: &Number) -> bool {
    number.as_f64().is_some_and(|value| value.abs() >= U64_LIMIT)
}

/// Parse a strictly positive integer; absent fields take `default`.
pub(crate) fn positive_int(
    value: Option<&Value>,
    default: u64,
    path: FieldPath,
    sink: &mut IssueSink,
) -> Option<PositiveInt> {
    let parsed = match value {
        None => PositiveInt::from_u64(default),
        Some(Value::Number(number)) if !number.is_f64() => {
            match (number.as_i64(), number.as_u64()) {
                (Some(integer), _) => PositiveInt::from_i64(integer),
                (None, Some(unsigned)) => PositiveInt::from_u64(unsigned),
                (None, None) => PositiveInt::from_u64(0),
            }
        },
        Some(Value::Number(number)) if is_oversized_integer(number) => {
            sink.push(
                path,
                IssueKind::OutOfRange,
                format!("value {number} does not fit an unsigned 64-bit integer"),
            );
            return None;
        },
        Some(other) => {
            sink.push(
                path,
                IssueKind::InvalidType,
                format!("value is not a valid integer, got {}", describe(other)),
            );
            return None;
        },
    };
    match parsed {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            sink.push(path, IssueKind::OutOfRange, error.to_string());
            None
        },
    }
}

/// Parse a list of strings, keeping each item's position.
///
/// Absent and `null` values are an empty list. Non-string items are reported
/// and skipped; a non-list value is reported and yields `None`.
pub(crate) fn string_list<'v>(
    value: Option<&'v Value>,
    path: &FieldPath,
    sink: &mut IssueSink,
) -> Option<Vec<(usize, &'v str)>> {
    match value {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .enumerate()
                .filter_map(|(position, item)| {
                    let text = item.as_str();
                    if text.is_none() {
                        sink.push(
                            path.index(position),
                            IssueKind::InvalidType,
                            format!("value is not a valid string, got {}", describe(item)),
                        );
                    }
                    text.map(|text| (position, text))
                })
                .collect(),
        ),
        Some(other) => {
            sink.push(
                path.clone(),
                IssueKind::InvalidType,
                format!("value must be a list of strings, got {}", describe(other)),
            );
            None
        },
    }
}

/// Parse an int-or-float value without coercion from other types.
pub(crate) fn strict_number(
    value: &Value,
    path: FieldPath,
    sink: &mut IssueSink,
) -> Option<StrictNumber> {
    let parsed = strict_number_of(value);
    if parsed.is_none() {
        sink.push(
            path,
            IssueKind::InvalidType,
            format!("value is not a valid number, got {}", describe(value)),
        );
    }
    parsed
}

/// Parse a float in `(0, 1.0]`; integers are widened, absent fields take
/// `default`.
pub(crate) fn unit_interval(
    value: Option<&Value>,
    default: f64,
    path: FieldPath,
    sink: &mut IssueSink,
) -> Option<UnitInterval> {
    let raw = match value {
        None => default,
        Some(value) => {
            let Some(number) = strict_number_of(value) else {
                sink.push(
                    path,
                    IssueKind::InvalidType,
                    format!("value is not a valid float, got {}", describe(value)),
                );
                return None;
            };
            number.as_f64()
        },
    };
    match UnitInterval::new(raw) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            sink.push(path, IssueKind::OutOfRange, error.to_string());
            None
        },
    }
}
