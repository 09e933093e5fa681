//! Tests for remote results bound to object stores and secret resolvers.

use std::sync::Arc;

use ironflow_results::storage::{
    Backend, Credentials, FsObjectStore, Locator, MemoryObjectStore, ObjectStore,
    StaticSecretResolver,
};
use ironflow_results::{GcsResult, ResultError, ResultOps, S3Result, StateResult, registry};
use serde_json::json;

fn no_secrets() -> Arc<StaticSecretResolver> {
    Arc::new(StaticSecretResolver::new())
}

// ===== MemoryObjectStore =====

#[test]
fn memory_write_then_read() {
    let store = Arc::new(MemoryObjectStore::new());
    let result = S3Result::new("bucket", "runs/1.json").bind(store.clone(), no_secrets());

    let written = result.write(json!({"rows": 3})).unwrap();
    assert_eq!(written.value(), Some(&json!({"rows": 3})));
    assert_eq!(written.location(), "runs/1.json");
    assert!(result.value().is_none());
    assert_eq!(store.len().unwrap(), 1);

    let read = result.read("runs/1.json").unwrap();
    assert_eq!(read.value(), Some(&json!({"rows": 3})));
}

#[test]
fn memory_exists() {
    let store = Arc::new(MemoryObjectStore::new());
    let result = GcsResult::new("bucket", "a.json").bind(store, no_secrets());

    assert!(!result.exists("a.json"));
    result.write(json!(1)).unwrap();
    assert!(result.exists("a.json"));
    assert!(!result.exists("b.json"));
}

#[test]
fn backends_do_not_share_keys() {
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
    let s3 = S3Result::new("bucket", "k").bind(store.clone(), no_secrets());
    let gcs = GcsResult::new("bucket", "k").bind(store, no_secrets());

    s3.write(json!("s3")).unwrap();
    assert!(!gcs.exists("k"));
}

#[test]
fn read_missing_object_fails() {
    let result = S3Result::new("bucket", "k").bind(Arc::new(MemoryObjectStore::new()), no_secrets());
    assert!(matches!(result.read("missing"), Err(ResultError::Storage(_))));
}

#[test]
fn read_malformed_payload_fails_but_exists() {
    let store = Arc::new(MemoryObjectStore::new());
    let locator = Locator {
        backend: Backend::S3,
        bucket: "bucket".to_string(),
        filepath: "bad.json".to_string(),
    };
    store.put(&locator, b"not json", None).unwrap();

    let result = S3Result::new("bucket", "bad.json").bind(store, no_secrets());
    assert!(result.exists("bad.json"));
    assert!(matches!(
        result.read("bad.json"),
        Err(ResultError::MalformedPayload(_))
    ));
}

// ===== Credentials =====

#[test]
fn credentials_resolved_at_io_time() {
    let store = Arc::new(
        MemoryObjectStore::new().with_required_credentials(Credentials::new("s3cr3t")),
    );
    let secrets = Arc::new(StaticSecretResolver::new().with_secret("AWS_CREDENTIALS", "s3cr3t"));

    let result = S3Result::new("bucket", "k.json")
        .with_credentials_secret("AWS_CREDENTIALS")
        .bind(store.clone(), secrets);
    result.write(json!([1, 2])).unwrap();
    assert_eq!(result.read("k.json").unwrap().value(), Some(&json!([1, 2])));

    let anonymous = S3Result::new("bucket", "k.json").bind(store, no_secrets());
    assert!(matches!(anonymous.read("k.json"), Err(ResultError::Storage(_))));
    assert!(!anonymous.exists("k.json"));
}

#[test]
fn unknown_secret_fails_io_not_decode() {
    let wire = json!({
        "type": "GCSResult",
        "bucket": "bucket",
        "filepath": "k.json",
        "credentials_secret": "MISSING",
    });
    let decoded = registry().decode(&wire).unwrap();
    let bound = decoded.bind(Arc::new(MemoryObjectStore::new()), no_secrets());

    assert!(matches!(
        bound.write(json!(1)),
        Err(ResultError::Secret { ref name }) if name == "MISSING"
    ));
    assert!(!bound.exists("k.json"));
}

#[test]
fn bound_result_encodes_without_binding() {
    let result = StateResult::from(S3Result::new("bucket", "k.json"))
        .bind(Arc::new(MemoryObjectStore::new()), no_secrets());
    let wire = registry().encode(&result).unwrap();
    assert_eq!(
        registry().decode(&wire).unwrap(),
        StateResult::from(S3Result::new("bucket", "k.json"))
    );
}

// ===== FsObjectStore =====

#[test]
fn fs_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsObjectStore::new(dir.path()));
    let result = GcsResult::new("artifacts", "runs/7/out.json").bind(store, no_secrets());

    let written = result.write(json!({"ok": true})).unwrap();
    assert!(dir.path().join("gcs/artifacts/runs/7/out.json").is_file());
    assert!(result.exists(written.location()));

    let read = result.read("runs/7/out.json").unwrap();
    assert_eq!(read.value(), Some(&json!({"ok": true})));
}

#[test]
fn fs_store_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsObjectStore::new(dir.path()));
    let result = S3Result::new("b", "k.json").bind(store, no_secrets());

    result.write(json!(1)).unwrap();
    result.write(json!(2)).unwrap();
    assert_eq!(result.read("k.json").unwrap().value(), Some(&json!(2)));
}

#[test]
fn fs_store_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsObjectStore::new(dir.path()));
    let result = S3Result::new("b", "k.json").bind(store, no_secrets());

    std::thread::scope(|scope| {
        for i in 0..8 {
            let result = &result;
            scope.spawn(move || result.write(json!(i)).unwrap());
        }
    });

    let entries: Vec<String> = std::fs::read_dir(dir.path().join("s3/b"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, ["k.json"]);
    assert!(result.read("k.json").unwrap().value().unwrap().is_u64());
}

#[test]
fn fs_store_rejects_escaping_paths() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsObjectStore::new(dir.path());
    let locator = Locator {
        backend: Backend::S3,
        bucket: "b".to_string(),
        filepath: "../../etc/passwd".to_string(),
    };
    assert!(matches!(
        store.put(&locator, b"x", None),
        Err(ResultError::Storage(_))
    ));
    assert!(store.exists(&locator, None).is_err());
}

#[test]
fn fs_store_missing_object() {
    let dir = tempfile::tempdir().unwrap();
    let result = S3Result::new("b", "k.json").bind(Arc::new(FsObjectStore::new(dir.path())), no_secrets());
    assert!(!result.exists("k.json"));
    assert!(matches!(result.read("k.json"), Err(ResultError::Io(_))));
}
