use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::bundle_system::error::BundleSystemError;
use crate::config::format::ConfigFormat;
use crate::kernel::constants::{ALL_ENVIRONMENTS, BUNDLES_FILE_STEM};
use crate::kernel::error::Result;
use crate::storage::provider::StorageProvider;

/// Which bundles are active in which environment.
///
/// Declared as `identifier -> { environment | "all" -> bool }`, e.g.
///
/// ```yaml
/// logging: { all: true }
/// service_mock: { dev: true, test: true }
/// ```
///
/// An exact environment key wins over `all`; a bundle with neither is inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BundleDeclarations {
    entries: IndexMap<String, IndexMap<String, bool>>,
}

impl BundleDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: IndexMap<String, IndexMap<String, bool>>) -> Self {
        Self { entries }
    }

    /// Declare `identifier` as active (or not) for `environment`.
    pub fn declare(
        &mut self,
        identifier: impl Into<String>,
        environment: impl Into<String>,
        active: bool,
    ) -> &mut Self {
        self.entries
            .entry(identifier.into())
            .or_default()
            .insert(environment.into(), active);
        self
    }

    /// First `bundles.<ext>` found in `config_dir`, trying the enabled formats
    /// in preference order.
    pub fn locate(storage: &dyn StorageProvider, config_dir: &Path) -> Option<PathBuf> {
        ConfigFormat::enabled()
            .into_iter()
            .map(|format| config_dir.join(format!("{}.{}", BUNDLES_FILE_STEM, format.extension())))
            .find(|path| storage.is_file(path))
    }

    /// Load the declaration from `config_dir`; no file means no bundles.
    pub fn load(storage: &dyn StorageProvider, config_dir: &Path) -> Result<Self> {
        let Some(path) = Self::locate(storage, config_dir) else {
            log::debug!("No bundle declaration in '{}'", config_dir.display());
            return Ok(Self::new());
        };
        Self::load_file(storage, &path)
    }

    pub fn load_file(storage: &dyn StorageProvider, path: &Path) -> Result<Self> {
        let invalid = |message: String| BundleSystemError::InvalidDeclaration {
            path: path.to_path_buf(),
            message,
        };
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| invalid("unsupported file format".to_string()))?;
        let data = storage.read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::new());
        }
        let entries: Option<IndexMap<String, IndexMap<String, bool>>> =
            format.deserialize(&data).map_err(|e| invalid(e.to_string()))?;
        log::debug!("Loaded bundle declaration from '{}'", path.display());
        Ok(Self::from_entries(entries.unwrap_or_default()))
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Activation of `identifier` in `environment`.
    pub fn is_active(&self, identifier: &str, environment: &str) -> bool {
        self.entries
            .get(identifier)
            .and_then(|envs| envs.get(environment).or_else(|| envs.get(ALL_ENVIRONMENTS)))
            .copied()
            .unwrap_or(false)
    }

    /// Identifiers active in `environment`, in declaration order.
    pub fn active_identifiers(&self, environment: &str) -> Vec<&str> {
        self.identifiers()
            .filter(|identifier| self.is_active(identifier, environment))
            .collect()
    }
}
