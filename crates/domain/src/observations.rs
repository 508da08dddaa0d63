//! Observation selectors and their resolution against the known universe.

use glob::Pattern;
use misfit_shared::{ErrorCode, ErrorEnvelope};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

const WILDCARD: char = '*';

/// A single user-supplied observation selector.
///
/// A selector without `*` matches one key exactly. Each `*` matches any run of
/// characters (including none); the pattern is anchored at both ends. Every
/// other character, `?` and `[` included, is literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorPattern {
    raw: Box<str>,
    glob: Option<Pattern>,
}

impl SelectorPattern {
    /// Wrap a raw selector string.
    #[must_use]
    pub fn new(raw: impl Into<Box<str>>) -> Self {
        let raw = raw.into();
        let glob = compile_glob(&raw);
        Self { raw, glob }
    }

    /// Borrow the selector as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true when the selector contains a wildcard.
    #[must_use]
    pub fn is_glob(&self) -> bool {
        self.raw.contains(WILDCARD)
    }

    /// Returns true when `key` is selected by this pattern.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.glob
            .as_ref()
            .map_or_else(|| *self.raw == *key, |glob| glob.matches(key))
    }
}

impl fmt::Display for SelectorPattern {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.raw)
    }
}

impl From<&str> for SelectorPattern {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Translate a selector into a glob where only `*` is special.
///
/// Runs of `*` collapse into one; `glob` rejects `**` outside a whole path
/// component.
fn compile_glob(raw: &str) -> Option<Pattern> {
    if !raw.contains(WILDCARD) {
        return None;
    }
    let mut glob = String::with_capacity(raw.len());
    for (position, literal) in raw.split(WILDCARD).enumerate() {
        if position > 0 && !glob.ends_with(WILDCARD) {
            glob.push(WILDCARD);
        }
        glob.push_str(&Pattern::escape(literal));
    }
    Pattern::new(&glob).ok()
}

/// A selector that matched nothing in the universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedSelector {
    /// Position of the selector in the input list.
    pub position: usize,
    /// Selector as written.
    pub pattern: SelectorPattern,
}

impl fmt::Display for UnmatchedSelector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Found no match for observation {}", self.pattern)
    }
}

/// Resolution failure listing every selector that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationResolveError {
    unmatched: Vec<UnmatchedSelector>,
}

impl ObservationResolveError {
    /// Borrow the unmatched selectors in input order.
    #[must_use]
    pub fn unmatched(&self) -> &[UnmatchedSelector] {
        &self.unmatched
    }

    fn error_code() -> ErrorCode {
        ErrorCode::new("domain", "unmatched_observation")
    }
}

impl fmt::Display for ObservationResolveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, unmatched) in self.unmatched.iter().enumerate() {
            if position > 0 {
                formatter.write_str("; ")?;
            }
            write!(formatter, "{unmatched}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ObservationResolveError {}

impl From<ObservationResolveError> for ErrorEnvelope {
    fn from(error: ObservationResolveError) -> Self {
        let patterns = error
            .unmatched
            .iter()
            .map(|unmatched| unmatched.pattern.as_str())
            .collect::<Vec<_>>()
            .join(",");
        Self::expected(ObservationResolveError::error_code(), error.to_string())
            .with_metadata("patterns", patterns)
    }
}

/// Sorted, de-duplicated set of resolved observation keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ObservationSet(BTreeSet<Box<str>>);

impl ObservationSet {
    /// Number of selected keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true when `key` is selected.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    /// Iterate keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(AsRef::as_ref)
    }

    /// Collect the keys into an owned, sorted vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.keys().map(str::to_owned).collect()
    }
}

/// The set of observation keys known to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservationUniverse {
    keys: BTreeSet<Box<str>>,
}

impl ObservationUniverse {
    /// Number of known keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true when no keys are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolve selectors into the union of their matches.
    ///
    /// An empty selector list selects the whole universe. Every selector that
    /// matches nothing is reported, not just the first one.
    pub fn resolve(
        &self,
        selectors: &[SelectorPattern],
    ) -> Result<ObservationSet, ObservationResolveError> {
        if selectors.is_empty() {
            return Ok(ObservationSet(self.keys.clone()));
        }

        let mut selected = BTreeSet::new();
        let mut unmatched = Vec::new();
        for (position, selector) in selectors.iter().enumerate() {
            let mut hit = false;
            for key in self.keys.iter().filter(|key| selector.matches(key)) {
                hit = true;
                selected.insert(key.clone());
            }
            if !hit {
                unmatched.push(UnmatchedSelector {
                    position,
                    pattern: selector.clone(),
                });
            }
        }

        if unmatched.is_empty() {
            Ok(ObservationSet(selected))
        } else {
            Err(ObservationResolveError { unmatched })
        }
    }
}

impl<K: Into<Box<str>>> FromIterator<K> for ObservationUniverse {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn universe() -> ObservationUniverse {
        ["a_1", "a_2", "a_3", "b_1", "b_2", "b_3", "c_1", "c_2", "c_3"]
            .into_iter()
            .collect()
    }

    fn selectors(raw: &[&str]) -> Vec<SelectorPattern> {
        raw.iter().copied().map(SelectorPattern::from).collect()
    }

    #[test]
    fn literal_selector_matches_exactly() {
        let pattern = SelectorPattern::from("a_1");
        assert!(!pattern.is_glob());
        assert!(pattern.matches("a_1"));
        assert!(!pattern.matches("a_10"));
        assert!(!pattern.matches("xa_1"));
    }

    #[test]
    fn glob_is_anchored() {
        let pattern = SelectorPattern::from("a*");
        assert!(pattern.matches("a"));
        assert!(pattern.matches("a_3"));
        assert!(!pattern.matches("ba"));

        let suffix = SelectorPattern::from("*_2");
        assert!(suffix.matches("b_2"));
        assert!(!suffix.matches("b_21"));
    }

    #[test]
    fn glob_handles_inner_and_repeated_wildcards() {
        assert!(SelectorPattern::from("a*_*3").matches("a_3"));
        assert!(SelectorPattern::from("a*_*3").matches("abc_xy3"));
        assert!(!SelectorPattern::from("a*_*3").matches("abc3"));
        assert!(SelectorPattern::from("**").matches(""));
        assert!(SelectorPattern::from("*").matches("anything"));
        assert!(!SelectorPattern::from("ab*ba").matches("aba"));
        assert!(!SelectorPattern::from("a*a").matches("a"));
        assert!(SelectorPattern::from("*ab*ab").matches("xabab"));
        assert!(SelectorPattern::from("a**b").matches("a_b"));
    }

    #[test]
    fn glob_metacharacters_other_than_star_are_literal() {
        let question = SelectorPattern::from("a?*");
        assert!(question.matches("a?_1"));
        assert!(!question.matches("ab_1"));

        let class = SelectorPattern::from("[ab]*");
        assert!(class.matches("[ab]_1"));
        assert!(!class.matches("a_1"));

        assert!(SelectorPattern::from("*]").matches("x]"));
        assert!(SelectorPattern::from("a/*").matches("a/b/c"));
    }

    #[test]
    fn empty_selectors_select_universe() -> Result<(), ObservationResolveError> {
        let resolved = universe().resolve(&[])?;
        assert_eq!(resolved.len(), 9);
        Ok(())
    }

    #[test]
    fn overlapping_selectors_are_deduplicated() -> Result<(), ObservationResolveError> {
        let resolved = universe().resolve(&selectors(&["a*", "a_1", "*_1"]))?;
        assert_eq!(resolved.to_vec(), vec!["a_1", "a_2", "a_3", "b_1", "c_1"]);
        Ok(())
    }

    #[test]
    fn every_unmatched_selector_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let Err(error) = universe().resolve(&selectors(&["secret_obs", "a_1", "*5"])) else {
            return Err("expected unmatched selectors".into());
        };
        let positions: Vec<_> = error.unmatched().iter().map(|u| u.position).collect();
        assert_eq!(positions, vec![0, 2]);
        assert_eq!(
            error.to_string(),
            "Found no match for observation secret_obs; Found no match for observation *5"
        );
        Ok(())
    }

    #[test]
    fn resolve_error_maps_to_envelope() -> Result<(), Box<dyn std::error::Error>> {
        let Err(error) = universe().resolve(&selectors(&["x*", "y"])) else {
            return Err("expected unmatched selectors".into());
        };
        let envelope = ErrorEnvelope::from(error);
        assert_eq!(envelope.code.code(), "unmatched_observation");
        assert_eq!(
            envelope.metadata.get("patterns").map(String::as_str),
            Some("x*,y")
        );
        Ok(())
    }

    proptest! {
        #[test]
        fn literal_keys_select_themselves(index in 0_usize..9) {
            let universe = universe();
            let keys: Vec<String> = universe.resolve(&[]).map(|set| set.to_vec()).unwrap_or_default();
            let key = keys.get(index).cloned().unwrap_or_default();
            let resolved = universe.resolve(&[SelectorPattern::new(key.as_str())]);
            prop_assert_eq!(resolved.map(|set| set.to_vec()).ok(), Some(vec![key]));
        }

        #[test]
        fn star_prefix_and_suffix_match_any_key(key in "[a-z_0-9]{0,12}") {
            prop_assert!(SelectorPattern::from("*").matches(&key));
            let wrapped = format!("x{key}y");
            prop_assert!(SelectorPattern::from("x*y").matches(&wrapped));
        }
    }
}
