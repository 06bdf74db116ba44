use std::path::PathBuf;
use tempfile::tempdir;

use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::local::LocalStorageProvider;
use crate::storage::provider::StorageProvider;

// Helper function to create PathBuf from str for tests
fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[test]
fn test_write_and_read_relative_to_base() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    let key_path = p("container.json");
    provider.write_bytes(&key_path, b"{\"services\":{}}")?;

    assert_eq!(provider.read_to_string(&key_path)?, "{\"services\":{}}");
    assert!(provider.is_file(&key_path));
    assert!(temp_dir.path().join("container.json").is_file());
    Ok(())
}

#[test]
fn test_write_creates_missing_parents() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::default();

    // Absolute path, default provider: the kernel's usage pattern
    let target = temp_dir.path().join("var").join("cache").join("dev").join("container.json");
    provider.write_string(&target, "payload")?;

    assert!(provider.is_dir(&temp_dir.path().join("var/cache/dev")));
    assert_eq!(provider.read_to_string(&target)?, "payload");
    Ok(())
}

#[test]
fn test_write_replaces_existing_file() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("artifact"), "first")?;
    provider.write_string(&p("artifact"), "second")?;

    assert_eq!(provider.read_to_string(&p("artifact"))?, "second");
    // No temp files left behind next to the target
    assert_eq!(provider.read_dir(&p(""))?, vec![p("artifact")]);
    Ok(())
}

#[test]
fn test_read_dir_sorted_relative() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.create_dir_all(&p("packages"))?;
    provider.write_string(&p("packages/b.yaml"), "b: 1")?;
    provider.write_string(&p("packages/a.yaml"), "a: 1")?;

    let entries = provider.read_dir(&p("packages"))?;
    assert_eq!(entries, vec![p("packages/a.yaml"), p("packages/b.yaml")]);
    Ok(())
}

#[test]
fn test_remove_dir_all() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    provider.write_string(&p("cache/dev/container.json"), "{}")?;
    assert!(provider.is_file(&p("cache/dev/container.json")));

    provider.remove_dir_all(&p("cache"))?;
    assert!(!provider.is_dir(&p("cache")));
    assert!(!temp_dir.path().join("cache").exists());
    Ok(())
}

#[test]
fn test_read_missing_file_reports_path() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let provider = LocalStorageProvider::new(temp_dir.path().to_path_buf());

    let err = provider.read_to_string(&p("missing.yaml")).unwrap_err();
    match err {
        Error::StorageSystem(StorageSystemError::Io { path, operation, .. }) => {
            assert_eq!(operation, "read_to_string");
            assert!(path.ends_with("missing.yaml"));
        }
        other => panic!("Expected StorageSystemError::Io, got {:?}", other),
    }
}
