use std::path::Path;

use serde_json::json;

use crate::config::data::ConfigData;
use crate::config::error::ConfigSystemError;
use crate::config::format::ConfigFormat;
use crate::kernel::error::{Error, Result};

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("a/b.json")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("a/b.JSON")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("a/b.ini")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("a/b")), None);
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("services.yml")), Some(ConfigFormat::Yaml));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("services.toml")), Some(ConfigFormat::Toml));
}

#[test]
fn test_parse_keeps_key_order() -> Result<()> {
    let data = ConfigData::parse(
        r#"{ "zeta": 1, "parameters": { "a": "b" }, "alpha": true }"#,
        ConfigFormat::Json,
        Path::new("config.json"),
    )?;
    let keys: Vec<&str> = data.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["zeta", "parameters", "alpha"]);
    assert_eq!(data.get::<u32>("zeta"), Some(1));
    assert_eq!(data.get_or("missing", 7u32), 7);
    Ok(())
}

#[test]
fn test_empty_document_is_empty_config() -> Result<()> {
    let data = ConfigData::parse("  \n", ConfigFormat::Json, Path::new("empty.json"))?;
    assert!(data.is_empty());
    Ok(())
}

#[test]
fn test_non_map_document_rejected() {
    let err = ConfigData::parse("[1, 2]", ConfigFormat::Json, Path::new("list.json")).unwrap_err();
    assert!(matches!(err, Error::ConfigSystem(ConfigSystemError::InvalidStructure { .. })));
}

#[test]
fn test_syntax_error_names_file() {
    let err =
        ConfigData::parse("{ nope", ConfigFormat::Json, Path::new("broken.json")).unwrap_err();
    match err {
        Error::ConfigSystem(ConfigSystemError::Parse { path, format, .. }) => {
            assert_eq!(path, Path::new("broken.json"));
            assert_eq!(format, "JSON");
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_set_and_take() -> Result<()> {
    let mut data = ConfigData::new();
    data.set("framework", json!({ "secret": "s3cr3t" }))?;
    assert!(data.contains_key("framework"));
    assert_eq!(data.take("framework"), Some(json!({ "secret": "s3cr3t" })));
    assert!(data.is_empty());
    Ok(())
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_null_document_is_empty() -> Result<()> {
    let data = ConfigData::parse("~\n", ConfigFormat::Yaml, Path::new("services.yaml"))?;
    assert!(data.is_empty());
    Ok(())
}

#[cfg(feature = "toml-config")]
#[test]
fn test_toml_tables() -> Result<()> {
    let data = ConfigData::parse(
        "[parameters]\nlocale = \"en\"\n\n[services.\"app::Clock\"]\npublic = true\n",
        ConfigFormat::Toml,
        Path::new("services.toml"),
    )?;
    assert_eq!(data.get_raw("parameters"), Some(&json!({ "locale": "en" })));
    assert_eq!(data.get_raw("services"), Some(&json!({ "app::Clock": { "public": true } })));
    Ok(())
}
