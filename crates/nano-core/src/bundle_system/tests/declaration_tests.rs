use std::fs;

use tempfile::tempdir;

use crate::bundle_system::declaration::BundleDeclarations;
use crate::bundle_system::error::BundleSystemError;
use crate::kernel::error::{Error, Result};
use crate::storage::local::LocalStorageProvider;

#[test]
fn test_environment_key_wins_over_all() {
    let mut declarations = BundleDeclarations::new();
    declarations
        .declare("framework", "all", true)
        .declare("profiler", "dev", true)
        .declare("profiler", "all", false)
        .declare("debug", "all", true)
        .declare("debug", "prod", false);

    assert_eq!(declarations.active_identifiers("dev"), vec!["framework", "profiler", "debug"]);
    assert_eq!(declarations.active_identifiers("prod"), vec!["framework"]);
    assert_eq!(declarations.active_identifiers("test"), vec!["framework", "debug"]);
}

#[test]
fn test_undeclared_bundle_is_inactive() {
    let declarations = BundleDeclarations::new();
    assert!(!declarations.is_active("framework", "dev"));
    assert!(declarations.is_empty());
}

#[test]
fn test_missing_file_means_no_bundles() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalStorageProvider::default();

    assert!(BundleDeclarations::locate(&storage, dir.path()).is_none());
    assert!(BundleDeclarations::load(&storage, dir.path())?.is_empty());
    Ok(())
}

#[test]
fn test_load_json_declaration_keeps_order() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    fs::write(
        dir.path().join("bundles.json"),
        r#"{ "zeta": { "all": true }, "alpha": { "dev": true }, "mid": { "all": true } }"#,
    )
    .expect("write bundles.json");
    let storage = LocalStorageProvider::default();

    let declarations = BundleDeclarations::load(&storage, dir.path())?;
    assert_eq!(declarations.identifiers().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    assert_eq!(declarations.active_identifiers("prod"), vec!["zeta", "mid"]);
    Ok(())
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_preferred_over_json() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    fs::write(dir.path().join("bundles.json"), r#"{ "from_json": { "all": true } }"#)
        .expect("write json");
    fs::write(dir.path().join("bundles.yaml"), "from_yaml: { all: true }\n").expect("write yaml");
    let storage = LocalStorageProvider::default();

    let declarations = BundleDeclarations::load(&storage, dir.path())?;
    assert_eq!(declarations.identifiers().collect::<Vec<_>>(), vec!["from_yaml"]);
    Ok(())
}

#[test]
fn test_non_boolean_activation_rejected() {
    let dir = tempdir().expect("Failed to create temp directory");
    fs::write(dir.path().join("bundles.json"), r#"{ "framework": { "all": "yes" } }"#)
        .expect("write json");
    let storage = LocalStorageProvider::default();

    let err = BundleDeclarations::load(&storage, dir.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::BundleSystem(BundleSystemError::InvalidDeclaration { .. })
    ));
}
