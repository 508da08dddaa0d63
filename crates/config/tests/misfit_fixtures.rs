//! Integration tests for assembling misfit configs from fixture files.

use misfit_config::{
    IssueKind, parse_misfit_config_json, parse_misfit_config_toml, to_pretty_json,
};
use misfit_domain::{ObservationUniverse, WorkflowKind};
use misfit_shared::ErrorCode;
use serde_json::json;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn read_fixture(relative: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(fixtures_dir().join(relative))?)
}

fn universe() -> ObservationUniverse {
    [
        "FOPR",
        "WOPR_OP1_108",
        "WOPR_OP1_144",
        "WOPR_OP1_190",
        "WWCT_OP1_108",
    ]
    .into_iter()
    .collect()
}

#[test]
fn parses_spearman_fixture() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("spearman.valid.json")?;
    let config = parse_misfit_config_json(&contents, &universe())?;

    assert_eq!(config.workflow().kind(), WorkflowKind::SpearmanCorrelation);
    assert_eq!(
        serde_json::Value::Object(config.workflow().clustering().cluster_args()),
        json!({
            "method": "complete",
            "metric": "jensenshannon",
            "depth": 3,
            "criterion": "maxclust_monocrit",
            "threshold": 4
        })
    );
    assert!((config.workflow().pca().threshold() - 0.98).abs() < f64::EPSILON);
    assert_eq!(
        config.observations().to_vec(),
        vec!["FOPR", "WOPR_OP1_108", "WOPR_OP1_144", "WOPR_OP1_190"]
    );
    Ok(())
}

#[test]
fn default_toml_fixture_matches_empty_config() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("auto_scale.default.toml")?;
    let from_fixture = parse_misfit_config_toml(&contents, &universe())?;
    let from_empty = parse_misfit_config_json("{}", &universe())?;

    assert_eq!(from_fixture, from_empty);
    assert_eq!(from_fixture.observations().len(), 5);
    assert_eq!(to_pretty_json(&from_fixture)?, to_pretty_json(&from_empty)?);
    Ok(())
}

#[test]
fn invalid_fixture_reports_every_issue() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("misfit.invalid.json")?;
    let error = parse_misfit_config_json(&contents, &universe())
        .err()
        .ok_or_else(|| std::io::Error::other("expected invalid fixture error"))?;

    assert_eq!(error.code, ErrorCode::new("config", "invalid_misfit_config"));
    assert_eq!(
        error.metadata.get("issue_count").map(String::as_str),
        Some("6")
    );
    for expected in [
        "- Found no match for observation secret_obs (at observations -> 0)",
        "- Found no match for observation *5 (at observations -> 2)",
        "(at workflow -> clustering -> linkage -> metric)",
        "(at workflow -> clustering -> fcluster -> depth)",
        "- extra fields not permitted (at workflow -> clustering -> fcluster -> threshold)",
        "(at workflow -> pca -> threshold)",
    ] {
        assert!(
            error.message.contains(expected),
            "missing `{expected}` in:\n{}",
            error.message
        );
    }
    Ok(())
}

#[test]
fn invalid_fixture_issue_kinds() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("misfit.invalid.json")?;
    let raw: serde_json::Value = serde_json::from_str(&contents)?;
    let error = misfit_config::assemble_config(&raw, &universe())
        .err()
        .ok_or_else(|| std::io::Error::other("expected invalid fixture error"))?;

    let kinds: Vec<IssueKind> = error.issues().iter().map(|issue| issue.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            IssueKind::NotOneOf,
            IssueKind::InvalidType,
            IssueKind::UnknownField,
            IssueKind::OutOfRange,
            IssueKind::UnmatchedObservation,
            IssueKind::UnmatchedObservation,
        ]
    );
    Ok(())
}
