use std::fs;

use tempfile::tempdir;

use crate::cache::gate::CacheGate;
use crate::storage::local::LocalStorageProvider;

#[test]
fn test_missing_artifact_rebuilds() {
    let dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalStorageProvider::default();
    let artifact = dir.path().join("container.json");

    assert!(CacheGate::new(false).should_rebuild(&storage, &artifact));
    assert!(CacheGate::new(true).should_rebuild(&storage, &artifact));
}

#[test]
fn test_existing_artifact_reused_unless_debug() {
    let dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalStorageProvider::default();
    let artifact = dir.path().join("container.json");
    fs::write(&artifact, "{}").expect("write artifact");

    assert!(!CacheGate::new(false).should_rebuild(&storage, &artifact));
    assert!(CacheGate::new(true).should_rebuild(&storage, &artifact));
}
