use std::path::Path;

use semver::{Comparator, Op, Version, VersionReq};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::error::CacheError;
use crate::container::builder::ContainerBuilder;
use crate::container::compiled::CompiledContainer;
use crate::kernel::constants::KERNEL_VERSION;
use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::provider::StorageProvider;

/// Layout version of [`ContainerArtifact`]; bumped on incompatible changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// The compiled container as persisted in the environment cache directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerArtifact {
    pub format_version: u32,
    pub kernel_version: Version,
    pub environment: String,
    pub debug: bool,
    /// Build resources (configuration files, bundles) the container came from
    #[serde(default)]
    pub resources: Vec<String>,
    pub container: CompiledContainer,
}

impl ContainerArtifact {
    /// Snapshot a compiled builder.
    pub fn from_builder(
        builder: &ContainerBuilder,
        environment: &str,
        debug: bool,
    ) -> Result<Self> {
        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            kernel_version: current_kernel_version()?,
            environment: environment.to_string(),
            debug,
            resources: builder.resources().to_vec(),
            container: CompiledContainer::from_builder(builder)?,
        })
    }
}

fn current_kernel_version() -> Result<Version> {
    Version::parse(KERNEL_VERSION)
        .map_err(|e| Error::Other(format!("Invalid kernel version '{}': {}", KERNEL_VERSION, e)))
}

/// The running kernel must satisfy `^<artifact kernel version>`.
pub(crate) fn is_compatible(artifact: &Version, current: &Version) -> bool {
    let req = VersionReq {
        comparators: vec![Comparator {
            op: Op::Caret,
            major: artifact.major,
            minor: Some(artifact.minor),
            patch: Some(artifact.patch),
            pre: artifact.pre.clone(),
        }],
    };
    req.matches(current)
}

/// Writes and reads [`ContainerArtifact`]s through a [`StorageProvider`].
pub struct ContainerDumper<'a> {
    storage: &'a dyn StorageProvider,
}

impl<'a> ContainerDumper<'a> {
    pub fn new(storage: &'a dyn StorageProvider) -> Self {
        Self { storage }
    }

    /// Serialize the compiled `builder` to `path`, creating parent directories.
    pub fn dump(
        &self,
        path: &Path,
        builder: &ContainerBuilder,
        environment: &str,
        debug: bool,
    ) -> Result<()> {
        let artifact = ContainerArtifact::from_builder(builder, environment, debug)?;
        self.write(path, &artifact)
    }

    pub fn write(&self, path: &Path, artifact: &ContainerArtifact) -> Result<()> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| {
            StorageSystemError::SerializationError {
                format: "JSON".to_string(),
                source: Box::new(e),
            }
        })?;
        if let Some(parent) = path.parent() {
            self.storage.create_dir_all(parent)?;
        }
        self.storage.write_string(path, &json)?;
        log::info!(
            "Dumped container to '{}' ({} service(s))",
            path.display(),
            artifact.container.services.len()
        );
        Ok(())
    }

    /// Read the artifact at `path`, rejecting other layouts and kernel versions.
    pub fn load(&self, path: &Path) -> Result<ContainerArtifact> {
        let data = self.storage.read_to_string(path)?;
        let corrupt = |message: String| CacheError::CorruptArtifact {
            path: path.to_path_buf(),
            message,
        };
        let incompatible = |reason: String| CacheError::IncompatibleArtifact {
            path: path.to_path_buf(),
            reason,
        };

        // Header first, so a layout change is reported as such and not as corruption
        let raw: Value = serde_json::from_str(&data).map_err(|e| corrupt(e.to_string()))?;
        let format_version = raw
            .get("format_version")
            .and_then(Value::as_u64)
            .ok_or_else(|| corrupt("missing format_version".to_string()))?;
        if format_version != u64::from(ARTIFACT_FORMAT_VERSION) {
            return Err(incompatible(format!(
                "format version {} found, {} expected",
                format_version, ARTIFACT_FORMAT_VERSION
            ))
            .into());
        }
        let artifact_version = raw
            .get("kernel_version")
            .and_then(Value::as_str)
            .and_then(|v| Version::parse(v).ok())
            .ok_or_else(|| corrupt("missing or invalid kernel_version".to_string()))?;
        let current = current_kernel_version()?;
        if !is_compatible(&artifact_version, &current) {
            return Err(incompatible(format!(
                "built by kernel {}, running kernel {}",
                artifact_version, current
            ))
            .into());
        }

        let artifact: ContainerArtifact =
            serde_json::from_value(raw).map_err(|e| corrupt(e.to_string()))?;
        log::debug!(
            "Loaded container from '{}' (environment '{}', debug={})",
            path.display(),
            artifact.environment,
            artifact.debug
        );
        Ok(artifact)
    }
}
