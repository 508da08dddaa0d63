//! Config assembly: validate a raw tree against the schema and resolve its
//! observation selectors in a single pass.

use crate::issues::{ConfigValidationError, IssueSink};
use crate::misfit::MisfitConfig;
use misfit_domain::ObservationUniverse;
use misfit_shared::Validated;
use serde_json::Value;

/// Validate `raw` and resolve its observations against `universe`.
///
/// Every schema and business-rule violation is collected; on failure the
/// error carries all of them and no partial configuration is returned.
pub fn assemble_config(
    raw: &Value,
    universe: &ObservationUniverse,
) -> Result<Validated<MisfitConfig>, ConfigValidationError> {
    let mut sink = IssueSink::default();
    let config = MisfitConfig::from_raw(raw, universe, &mut sink);

    match sink.finish(config) {
        Ok(config) => {
            tracing::debug!(
                workflow = %config.workflow().kind(),
                observations = config.observations().len(),
                universe = universe.len(),
                "misfit config assembled"
            );
            Ok(Validated::new(config))
        },
        Err(error) => {
            tracing::debug!(issues = error.len(), "misfit config rejected");
            Err(error)
        },
    }
}
