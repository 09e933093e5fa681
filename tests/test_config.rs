use std::io::Write;

use ironflow_results::config::ResultsConfig;
use ironflow_results::{ResultKind, ResultOps, StateResult};
use tempfile::NamedTempFile;

const YAML: &str = r#"
secrets_prefix: "MYAPP_SECRET_"
results:
  extract:
    type: S3Result
    bucket: artifacts
    filepath: "runs/${ctx.run_id}/extract.json"
    credentials_secret: aws-creds
  summary:
    type: PrefectResult
    value: '{"rows": 3}'
  settings:
    type: SafeResult
    value:
      retries: 2
      tags: [nightly]
  skipped:
    type: NoResultType
"#;

#[test]
fn load_and_decode_results() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(YAML.as_bytes()).unwrap();

    let cfg = ResultsConfig::load(Some(f.path())).unwrap();
    assert_eq!(cfg.secrets_prefix.as_deref(), Some("MYAPP_SECRET_"));

    let results = cfg.decode_results().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(results["extract"].kind(), ResultKind::S3);
    assert_eq!(results["summary"].location(), r#"{"rows": 3}"#);
    assert_eq!(
        results["settings"].value(),
        Some(&serde_json::json!({"retries": 2, "tags": ["nightly"]}))
    );
    assert!(matches!(results["skipped"], StateResult::NoResult(_)));

    let StateResult::S3(extract) = &results["extract"] else {
        panic!("expected S3 result");
    };
    assert_eq!(extract.credentials_secret(), Some("aws-creds"));
}

#[test]
fn secret_resolver_uses_prefix() {
    let cfg = ResultsConfig::parse(YAML).unwrap();
    assert_eq!(
        cfg.secret_resolver().var_name("aws-creds"),
        "MYAPP_SECRET_AWS_CREDS"
    );

    let defaults = ResultsConfig::default();
    assert_eq!(
        defaults.secret_resolver().var_name("aws-creds"),
        "IRONFLOW_SECRET_AWS_CREDS"
    );
}

#[test]
fn invalid_entry_names_the_task() {
    let cfg = ResultsConfig::parse(
        r#"
results:
  broken:
    type: BogusType
"#,
    )
    .unwrap();

    let err = cfg.decode_results().unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Invalid result for task 'broken'"));
    assert!(message.contains("unknown result type: BogusType"));
}

#[test]
fn non_json_safe_value_is_rejected() {
    let cfg = ResultsConfig::parse(
        r#"
results:
  odd:
    type: SafeResult
    value: {1: one}
"#,
    )
    .unwrap();
    assert!(cfg.decode_results().is_err());
}

#[test]
fn empty_config_has_no_results() {
    let cfg = ResultsConfig::parse("{}").unwrap();
    assert!(cfg.results.is_empty());
    assert!(cfg.decode_results().unwrap().is_empty());
}

#[test]
fn missing_explicit_path_returns_error() {
    let result = ResultsConfig::load(Some(std::path::Path::new(
        "/nonexistent/ironflow-results.yaml",
    )));
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Config file not found")
    );
}

#[test]
fn invalid_yaml_returns_error() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"results: [unclosed").unwrap();

    let err = ResultsConfig::load(Some(f.path())).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}
