//! Misfit configuration root: workflow plus resolved observations.

use crate::issues::{IssueKind, IssueSink};
use crate::raw::{Section, string_list};
use crate::schema::nested;
use crate::workflow::WorkflowConfig;
use misfit_domain::{ObservationSet, ObservationUniverse, SelectorPattern};
use misfit_shared::FieldPath;
use serde::Serialize;
use serde_json::Value;

/// Fully assembled misfit-preprocessor configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MisfitConfig {
    workflow: WorkflowConfig,
    observations: ObservationSet,
}

impl MisfitConfig {
    /// Workflow parameters.
    #[must_use]
    pub const fn workflow(&self) -> &WorkflowConfig {
        &self.workflow
    }

    /// Concrete observation keys, sorted and de-duplicated.
    #[must_use]
    pub const fn observations(&self) -> &ObservationSet {
        &self.observations
    }

    /// Walk the raw root, reporting every issue into `sink`.
    ///
    /// A `null` root is treated as an empty mapping.
    pub(crate) fn from_raw(
        raw: &Value,
        universe: &ObservationUniverse,
        sink: &mut IssueSink,
    ) -> Option<Self> {
        let root = if raw.is_null() { None } else { Some(raw) };
        let mut section = Section::open(root, FieldPath::root(), sink)?;

        let workflow_path = section.child("workflow");
        let workflow = match section.take("workflow") {
            None => WorkflowConfig::defaults(workflow_path, sink),
            Some(raw) => nested(Some(raw), workflow_path, sink),
        };

        let observations_path = section.child("observations");
        let observations = string_list(section.take("observations"), &observations_path, sink)
            .and_then(|selectors| resolve(&selectors, universe, &observations_path, sink));

        section.close(sink);
        Some(Self {
            workflow: workflow?,
            observations: observations?,
        })
    }
}

fn resolve(
    selectors: &[(usize, &str)],
    universe: &ObservationUniverse,
    path: &FieldPath,
    sink: &mut IssueSink,
) -> Option<ObservationSet> {
    let patterns: Vec<SelectorPattern> = selectors
        .iter()
        .map(|(_, raw)| SelectorPattern::from(*raw))
        .collect();
    match universe.resolve(&patterns) {
        Ok(set) => Some(set),
        Err(error) => {
            for unmatched in error.unmatched() {
                let position = selectors
                    .get(unmatched.position)
                    .map_or(unmatched.position, |(position, _)| *position);
                tracing::trace!(
                    pattern = unmatched.pattern.as_str(),
                    position,
                    "observation selector matched nothing"
                );
                sink.push(
                    path.index(position),
                    IssueKind::UnmatchedObservation,
                    unmatched.to_string(),
                );
            }
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn universe() -> ObservationUniverse {
        ["a1", "a2", "a3", "aa1", "aa2", "aa3"].into_iter().collect()
    }

    fn build(raw: &Value) -> Result<MisfitConfig, crate::ConfigValidationError> {
        let mut sink = IssueSink::default();
        let config = MisfitConfig::from_raw(raw, &universe(), &mut sink);
        sink.finish(config)
    }

    #[test]
    fn null_and_empty_roots_take_every_default() -> Result<(), crate::ConfigValidationError> {
        for raw in [Value::Null, json!({})] {
            let config = build(&raw)?;
            assert_eq!(config.observations().len(), 6);
            assert_eq!(config.workflow().kind().to_string(), "auto_scale");
        }
        Ok(())
    }

    #[test]
    fn unmatched_positions_follow_the_raw_list() -> Result<(), Box<dyn std::error::Error>> {
        let Err(error) = build(&json!({"observations": [7, "*1", "*5"]})) else {
            return Err("invalid observations accepted".into());
        };
        let paths: Vec<String> = error
            .issues()
            .iter()
            .map(|issue| format!("{}: {}", issue.path(), issue.kind()))
            .collect();
        assert_eq!(
            paths,
            vec![
                "observations -> 0: invalid_type",
                "observations -> 2: unmatched_observation"
            ]
        );
        Ok(())
    }

    #[test]
    fn root_must_be_a_mapping() {
        assert!(build(&json!(["a1"])).is_err());
        assert!(build(&json!({"observations": "a1"})).is_err());
    }
}
