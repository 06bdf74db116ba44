use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;

use crate::config::error::ConfigSystemError;
use crate::config::loader::ConfigLoader;
use crate::container::builder::ContainerBuilder;
use crate::kernel::error::{Error, Result};
use crate::storage::local::LocalStorageProvider;

fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write config file");
}

#[test]
fn test_glob_imports_in_sorted_order() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    write(dir.path(), "packages/b.json", r#"{ "parameters": { "who": "b", "b": true } }"#);
    write(dir.path(), "packages/a.json", r#"{ "parameters": { "who": "a", "a": true } }"#);
    write(dir.path(), "packages/dev/c.json", r#"{ "parameters": { "who": "nested" } }"#);
    write(dir.path(), "packages/notes.txt", "not config");
    let storage = LocalStorageProvider::default();

    let mut builder = ContainerBuilder::new();
    ConfigLoader::new(&storage).import(&mut builder, dir.path(), "packages/*.json", false)?;

    // Later files win; `*` does not cross directories
    assert_eq!(builder.parameter("who"), Some(&json!("b")));
    assert!(builder.has_parameter("a"));
    assert_eq!(builder.resources().len(), 2);
    Ok(())
}

#[test]
fn test_glob_without_matches_is_not_an_error() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalStorageProvider::default();
    let mut builder = ContainerBuilder::new();

    ConfigLoader::new(&storage).import(&mut builder, dir.path(), "packages/prod/*.json", true)?;
    assert!(builder.parameters().is_empty());
    Ok(())
}

#[test]
fn test_missing_resources() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalStorageProvider::default();
    let mut builder = ContainerBuilder::new();
    let mut loader = ConfigLoader::new(&storage);

    loader.import(&mut builder, dir.path(), "services_dev.json", false)?;
    let err = loader.import(&mut builder, dir.path(), "services.json", true).unwrap_err();
    match err {
        Error::ConfigSystem(ConfigSystemError::RequiredResourceMissing { resource, path }) => {
            assert_eq!(resource, "services.json");
            assert_eq!(path, dir.path().join("services.json"));
        }
        other => panic!("Expected RequiredResourceMissing, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_invalid_glob_pattern() {
    let dir = tempdir().expect("Failed to create temp directory");
    let storage = LocalStorageProvider::default();
    let mut builder = ContainerBuilder::new();

    let err = ConfigLoader::new(&storage)
        .import(&mut builder, dir.path(), "packages/[a-.json", false)
        .unwrap_err();
    assert!(matches!(err, Error::ConfigSystem(ConfigSystemError::InvalidPattern { .. })));
}

#[test]
fn test_services_parameters_and_extension_blocks() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    write(
        dir.path(),
        "services.json",
        r#"{
            "framework": { "secret": "s3cr3t" },
            "parameters": { "mailer.transport": "smtp" },
            "services": {
                "app::Clock": null,
                "mailer": {
                    "class": "app::Mailer",
                    "public": true,
                    "arguments": ["%mailer.transport%", "@app::Clock"]
                },
                "app.mailer": "@mailer",
                "default.mailer": { "alias": "mailer" }
            }
        }"#,
    );
    let storage = LocalStorageProvider::default();
    let mut builder = ContainerBuilder::new();

    ConfigLoader::new(&storage).import(&mut builder, dir.path(), "services.json", true)?;

    assert_eq!(builder.parameter("mailer.transport"), Some(&json!("smtp")));
    assert!(builder.has_definition("app::Clock"));
    assert_eq!(builder.definition("mailer").map(|d| d.public), Some(true));
    assert_eq!(builder.aliases().get("app.mailer").map(String::as_str), Some("mailer"));
    assert_eq!(builder.aliases().get("default.mailer").map(String::as_str), Some("mailer"));
    assert_eq!(builder.extension_config("framework"), &[json!({ "secret": "s3cr3t" })]);
    Ok(())
}

#[test]
fn test_unknown_definition_field_rejected() {
    let dir = tempdir().expect("Failed to create temp directory");
    write(
        dir.path(),
        "services.json",
        r#"{ "services": { "mailer": { "klass": "app::Mailer" } } }"#,
    );
    let storage = LocalStorageProvider::default();
    let mut builder = ContainerBuilder::new();

    let err = ConfigLoader::new(&storage)
        .import(&mut builder, dir.path(), "services.json", true)
        .unwrap_err();
    match err {
        Error::ConfigSystem(ConfigSystemError::InvalidStructure { message, .. }) => {
            assert!(message.contains("mailer"), "message was: {}", message);
        }
        other => panic!("Expected InvalidStructure, got {:?}", other),
    }
}

#[test]
fn test_nested_imports_relative_to_file() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    write(
        dir.path(),
        "services.json",
        r#"{ "imports": [
                 "services/mail.json",
                 { "resource": "services/missing.json", "ignore_errors": true }
             ],
             "parameters": { "order": "outer" } }"#,
    );
    write(
        dir.path(),
        "services/mail.json",
        r#"{ "imports": ["../shared/*.json"], "parameters": { "order": "inner", "mail": true } }"#,
    );
    write(dir.path(), "shared/common.json", r#"{ "parameters": { "common": 1 } }"#);
    let storage = LocalStorageProvider::default();
    let mut builder = ContainerBuilder::new();

    ConfigLoader::new(&storage).import(&mut builder, dir.path(), "services.json", true)?;

    // Imports are applied before the importing file's own keys
    assert_eq!(builder.parameter("order"), Some(&json!("outer")));
    assert_eq!(builder.parameter("mail"), Some(&json!(true)));
    assert_eq!(builder.parameter("common"), Some(&json!(1)));
    Ok(())
}

#[test]
fn test_circular_import_detected() {
    let dir = tempdir().expect("Failed to create temp directory");
    write(dir.path(), "a.json", r#"{ "imports": ["b.json"] }"#);
    write(dir.path(), "b.json", r#"{ "imports": ["./a.json"] }"#);
    let storage = LocalStorageProvider::default();
    let mut builder = ContainerBuilder::new();

    let err = ConfigLoader::new(&storage)
        .import(&mut builder, dir.path(), "a.json", true)
        .unwrap_err();
    match err {
        Error::ConfigSystem(ConfigSystemError::CircularImport { chain }) => {
            assert_eq!(chain.len(), 3);
            assert_eq!(chain.first(), chain.last());
        }
        other => panic!("Expected CircularImport, got {:?}", other),
    }
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_services_file() -> Result<()> {
    let dir = tempdir().expect("Failed to create temp directory");
    write(
        dir.path(),
        "services.yaml",
        concat!(
            "parameters:\n",
            "  app.name: demo\n",
            "services:\n",
            "  app::Greeter:\n",
            "    public: true\n",
            "    arguments: ['%app.name%']\n",
            "  greeter: '@app::Greeter'\n",
        ),
    );
    let storage = LocalStorageProvider::default();
    let mut builder = ContainerBuilder::new();

    ConfigLoader::new(&storage).import(&mut builder, dir.path(), "services.yaml", true)?;

    assert_eq!(builder.parameter("app.name"), Some(&json!("demo")));
    assert_eq!(
        builder.definition("greeter").map(|d| d.arguments.clone()),
        Some(vec![json!("%app.name%")])
    );
    Ok(())
}
