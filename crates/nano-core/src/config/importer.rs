//! Import declarations and the configurator handed to
//! [`KernelHooks::configure_container`](crate::kernel::hooks::KernelHooks::configure_container).
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::loader::ConfigLoader;
use crate::container::builder::ContainerBuilder;
use crate::kernel::error::Result;
use crate::storage::provider::StorageProvider;

/// One configuration resource to import, relative to the config directory.
///
/// Glob patterns (`*`, `?`, `[...]`, `{a,b}`) match zero or more files and are
/// never an error when nothing matches. A plain path is an error when missing
/// only if `required` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub resource: String,
    pub required: bool,
}

impl ImportDeclaration {
    pub fn required(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            required: true,
        }
    }

    pub fn optional(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            required: false,
        }
    }

    pub fn is_glob(&self) -> bool {
        is_glob(&self.resource)
    }
}

impl fmt::Display for ImportDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{} (optional)", self.resource)
        }
    }
}

pub(crate) fn is_glob(resource: &str) -> bool {
    resource.contains(['*', '?', '[', '{'])
}

/// The default import list for `environment`.
///
/// Package configuration comes first so that service definitions can rely on
/// the parameters it sets. `services.yaml` wins over `services.toml` when both
/// exist.
pub fn default_imports(
    storage: &dyn StorageProvider,
    config_dir: &Path,
    environment: &str,
) -> Vec<ImportDeclaration> {
    let mut imports = vec![
        ImportDeclaration::optional("packages/*.yaml"),
        ImportDeclaration::optional(format!("packages/{}/*.yaml", environment)),
        ImportDeclaration::optional(format!("packages/{}/*.toml", environment)),
    ];
    if storage.is_file(&config_dir.join("services.yaml")) {
        imports.push(ImportDeclaration::required("services.yaml"));
        imports.push(ImportDeclaration::optional(format!("services_{}.yaml", environment)));
    } else {
        imports.push(ImportDeclaration::optional("services.toml"));
    }
    imports
}

/// Ordered import list plus parameters set directly from code.
#[derive(Debug, Clone)]
pub struct ContainerConfigurator {
    config_dir: PathBuf,
    environment: String,
    imports: Vec<ImportDeclaration>,
    parameters: IndexMap<String, Value>,
}

impl ContainerConfigurator {
    pub fn new(config_dir: impl Into<PathBuf>, environment: impl Into<String>) -> Self {
        Self {
            config_dir: config_dir.into(),
            environment: environment.into(),
            imports: Vec::new(),
            parameters: IndexMap::new(),
        }
    }

    /// Configurator pre-filled with [`default_imports`].
    pub fn with_default_imports(
        storage: &dyn StorageProvider,
        config_dir: impl Into<PathBuf>,
        environment: impl Into<String>,
    ) -> Self {
        let mut configurator = Self::new(config_dir, environment);
        configurator.imports =
            default_imports(storage, &configurator.config_dir, &configurator.environment);
        configurator
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn imports(&self) -> &[ImportDeclaration] {
        &self.imports
    }

    /// Append a required import.
    pub fn import(&mut self, resource: impl Into<String>) -> &mut Self {
        self.imports.push(ImportDeclaration::required(resource));
        self
    }

    /// Append an import that is skipped when missing.
    pub fn import_optional(&mut self, resource: impl Into<String>) -> &mut Self {
        self.imports.push(ImportDeclaration::optional(resource));
        self
    }

    /// Drop every import declared so far, defaults included.
    pub fn clear_imports(&mut self) -> &mut Self {
        self.imports.clear();
        self
    }

    /// Set a parameter; applied after all imports, so it overrides them.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }

    /// Load every import into `builder`, in order, then apply the parameters.
    pub fn apply(
        &self,
        builder: &mut ContainerBuilder,
        storage: &dyn StorageProvider,
    ) -> Result<()> {
        let mut loader = ConfigLoader::new(storage);
        for import in &self.imports {
            log::debug!("Importing configuration '{}'", import);
            loader.import(builder, &self.config_dir, &import.resource, import.required)?;
        }
        for (name, value) in &self.parameters {
            builder.set_parameter(name.clone(), value.clone())?;
        }
        Ok(())
    }
}
