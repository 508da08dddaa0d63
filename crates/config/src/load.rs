//! String front-ends for the config assembler.
//!
//! Callers load the text themselves; these helpers parse JSON or TOML into a
//! raw tree, assemble it, and surface every failure as an `ErrorEnvelope`.

use crate::assemble::assemble_config;
use crate::misfit::MisfitConfig;
use misfit_domain::ObservationUniverse;
use misfit_shared::{ErrorCode, ErrorEnvelope, Result, Validated};
use serde_json::Value;

/// Parse a misfit config from a JSON string and assemble it.
pub fn parse_misfit_config_json(
    input: &str,
    universe: &ObservationUniverse,
) -> Result<Validated<MisfitConfig>> {
    let raw: Value = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
        .with_metadata("line", error.line().to_string())
    })?;

    assemble_config(&raw, universe).map_err(Into::into)
}

/// Parse a misfit config from a TOML string and assemble it.
pub fn parse_misfit_config_toml(
    input: &str,
    universe: &ObservationUniverse,
) -> Result<Validated<MisfitConfig>> {
    let raw: Value = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    assemble_config(&raw, universe).map_err(Into::into)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &MisfitConfig) -> Result<String> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
        )
    })?;
    output.push('\n');
    Ok(output)
}
