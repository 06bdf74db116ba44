use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::error::ConfigSystemError;
use crate::config::format::ConfigFormat;
use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::provider::StorageProvider;

/// Top-level keys of a configuration file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigData {
    values: IndexMap<String, Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document. An empty document (or a YAML `null`) is an empty
    /// configuration; anything other than a map is rejected.
    pub fn parse(data: &str, format: ConfigFormat, path: &Path) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: Value = format.deserialize(data).map_err(|e| ConfigSystemError::Parse {
            path: path.to_path_buf(),
            format: format.to_string(),
            message: match e {
                StorageSystemError::DeserializationError { source, .. } => source.to_string(),
                other => other.to_string(),
            },
        })?;
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => Err(ConfigSystemError::InvalidStructure {
                path: path.to_path_buf(),
                message: format!("expected a map at the top level, found {}", value_kind(&other)),
            }
            .into()),
        }
    }

    /// Read and parse `path`, picking the format from its extension.
    pub fn load(storage: &dyn StorageProvider, path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::from(StorageSystemError::UnsupportedConfigFormat(path.display().to_string()))
        })?;
        let data = storage.read_to_string(path)?;
        Self::parse(&data, format, path)
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| StorageSystemError::SerializationError {
            format: "JSON".to_string(),
            source: Box::new(e),
        })?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Remove a key, returning its value
    pub fn take(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl IntoIterator for ConfigData {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
