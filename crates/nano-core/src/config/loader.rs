use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use serde_json::Value;

use crate::config::data::{value_kind, ConfigData};
use crate::config::error::ConfigSystemError;
use crate::config::format::ConfigFormat;
use crate::config::importer::is_glob;
use crate::container::builder::ContainerBuilder;
use crate::container::definition::Definition;
use crate::kernel::error::{Error, Result};
use crate::storage::provider::StorageProvider;
use crate::utils::fs::find_files;

const IMPORTS_KEY: &str = "imports";
const PARAMETERS_KEY: &str = "parameters";
const SERVICES_KEY: &str = "services";

/// Applies configuration files to a [`ContainerBuilder`].
///
/// Inside a file, `imports` are loaded first (relative to the file), then
/// `parameters`, then `services`. Every other top-level key is queued as a
/// configuration block for the extension with that alias.
pub struct ConfigLoader<'a> {
    storage: &'a dyn StorageProvider,
    loading: Vec<PathBuf>,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(storage: &'a dyn StorageProvider) -> Self {
        Self {
            storage,
            loading: Vec::new(),
        }
    }

    /// Import `resource` relative to `base_dir`. Globs may match nothing.
    pub fn import(
        &mut self,
        builder: &mut ContainerBuilder,
        base_dir: &Path,
        resource: &str,
        required: bool,
    ) -> Result<()> {
        if is_glob(resource) {
            for path in self.expand_glob(base_dir, resource)? {
                self.load_file(builder, &path)?;
            }
            return Ok(());
        }

        let path = normalize(&base_dir.join(resource));
        if !self.storage.is_file(&path) {
            if required {
                return Err(ConfigSystemError::RequiredResourceMissing {
                    resource: resource.to_string(),
                    path,
                }
                .into());
            }
            log::debug!("Skipping optional configuration '{}': not found", path.display());
            return Ok(());
        }
        self.load_file(builder, &path)
    }

    /// Apply a single configuration file.
    pub fn load_file(&mut self, builder: &mut ContainerBuilder, path: &Path) -> Result<()> {
        let path = normalize(path);
        if self.loading.contains(&path) {
            let mut chain = self.loading.clone();
            chain.push(path);
            return Err(ConfigSystemError::CircularImport { chain }.into());
        }

        self.loading.push(path.clone());
        let result = self.apply_file(builder, &path);
        self.loading.pop();
        result
    }

    fn expand_glob(&self, base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ConfigSystemError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?
            .compile_matcher();

        let root = base_dir.join(glob_root(pattern));
        if !self.storage.is_dir(&root) {
            return Ok(Vec::new());
        }

        let matches = find_files(self.storage, &root, &|candidate: &Path| {
            candidate
                .strip_prefix(base_dir)
                .map(|relative| matcher.is_match(relative))
                .unwrap_or(false)
        })?;

        Ok(matches
            .into_iter()
            .filter(|path| {
                let supported = ConfigFormat::from_path(path).is_some();
                if !supported {
                    log::warn!("Ignoring '{}': no enabled configuration format", path.display());
                }
                supported
            })
            .collect())
    }

    fn apply_file(&mut self, builder: &mut ContainerBuilder, path: &Path) -> Result<()> {
        log::debug!("Loading configuration file '{}'", path.display());
        let mut data = ConfigData::load(self.storage, path)?;
        builder.add_resource(format!("file:{}", path.display()));

        if let Some(imports) = data.take(IMPORTS_KEY) {
            let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            for (resource, required) in parse_imports(path, imports)? {
                self.import(builder, &base_dir, &resource, required)?;
            }
        }
        if let Some(parameters) = data.take(PARAMETERS_KEY) {
            apply_parameters(builder, path, parameters)?;
        }
        if let Some(services) = data.take(SERVICES_KEY) {
            apply_services(builder, path, services)?;
        }
        for (alias, config) in data {
            builder.load_from_extension(alias, config)?;
        }
        Ok(())
    }
}

fn invalid(path: &Path, message: impl Into<String>) -> Error {
    ConfigSystemError::InvalidStructure {
        path: path.to_path_buf(),
        message: message.into(),
    }
    .into()
}

/// `imports` entries are either a resource string (required unless it is a
/// glob) or `{ resource, ignore_errors }`.
fn parse_imports(path: &Path, imports: Value) -> Result<Vec<(String, bool)>> {
    let entries = match imports {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        other => {
            let found = value_kind(&other);
            return Err(invalid(path, format!("'imports' must be a list, found {}", found)));
        }
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            Value::String(resource) => Ok((resource, true)),
            Value::Object(map) => {
                let resource = map
                    .get("resource")
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid(path, "import entries need a 'resource' string"))?;
                let ignore_errors = map
                    .get("ignore_errors")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                Ok((resource.to_string(), !ignore_errors))
            }
            other => Err(invalid(path, format!("invalid import entry: {}", value_kind(&other)))),
        })
        .collect()
}

fn apply_parameters(builder: &mut ContainerBuilder, path: &Path, parameters: Value) -> Result<()> {
    match parameters {
        Value::Null => Ok(()),
        Value::Object(map) => {
            for (name, value) in map {
                builder.set_parameter(name, value)?;
            }
            Ok(())
        }
        other => {
            let found = value_kind(&other);
            Err(invalid(path, format!("'parameters' must be a map, found {}", found)))
        }
    }
}

fn apply_services(builder: &mut ContainerBuilder, path: &Path, services: Value) -> Result<()> {
    let services = match services {
        Value::Null => return Ok(()),
        Value::Object(map) => map,
        other => {
            let found = value_kind(&other);
            return Err(invalid(path, format!("'services' must be a map, found {}", found)));
        }
    };

    for (id, entry) in services {
        match &entry {
            Value::Null => {
                builder.set_definition(id, Definition::default())?;
            }
            Value::String(s) => match s.strip_prefix('@') {
                Some(target) if !target.is_empty() => builder.set_alias(id, target)?,
                _ => {
                    return Err(invalid(
                        path,
                        format!("service '{}': a string entry must be an '@service' alias", id),
                    ));
                }
            },
            Value::Object(map) if map.contains_key("alias") => {
                let target = map
                    .get("alias")
                    .and_then(Value::as_str)
                    .filter(|_| map.len() == 1)
                    .ok_or_else(|| {
                        let message = format!(
                            "service '{}': an alias entry only takes an 'alias' string",
                            id
                        );
                        invalid(path, message)
                    })?;
                builder.set_alias(id, target)?;
            }
            Value::Object(_) => {
                let definition: Definition = serde_json::from_value(entry.clone())
                    .map_err(|e| invalid(path, format!("service '{}': {}", id, e)))?;
                builder.set_definition(id, definition)?;
            }
            other => {
                return Err(invalid(
                    path,
                    format!("service '{}': expected a map, found {}", id, value_kind(other)),
                ));
            }
        }
    }
    Ok(())
}

/// Leading path components of `pattern` that contain no glob syntax.
fn glob_root(pattern: &str) -> PathBuf {
    pattern
        .split('/')
        .take_while(|component| !is_glob(component))
        .collect()
}

/// Lexically resolve `.` and `..` so the same file is always the same path.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
