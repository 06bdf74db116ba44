use std::path::PathBuf;

use crate::bundle_system::registry::BundleFactories;
use crate::config::importer::ContainerConfigurator;
use crate::container::builder::ContainerBuilder;
use crate::kernel::constants::PROJECT_MARKER_FILE;
use crate::kernel::error::{Error, Result};

/// Application-specific customization of a [`Kernel`](crate::kernel::Kernel).
///
/// Every method has a default, so an application only overrides what it needs.
pub trait KernelHooks {
    /// Fixed project directory; `None` enables auto-detection from
    /// [`kernel_location`](Self::kernel_location).
    fn project_dir(&self) -> Option<PathBuf> {
        None
    }

    /// Directory the project root search starts from. Defaults to the
    /// directory of the running executable.
    fn kernel_location(&self) -> Result<PathBuf> {
        let exe = std::env::current_exe().map_err(|e| Error::ProjectDirResolution {
            path: PathBuf::new(),
            reason: format!("cannot locate the running executable: {}", e),
        })?;
        exe.parent().map(PathBuf::from).ok_or_else(|| Error::ProjectDirResolution {
            reason: "the executable has no parent directory".to_string(),
            path: exe,
        })
    }

    /// File whose presence marks the project root.
    fn project_marker(&self) -> &str {
        PROJECT_MARKER_FILE
    }

    /// Factories for every bundle identifier the declaration may name.
    fn bundle_factories(&self) -> BundleFactories {
        BundleFactories::new()
    }

    /// Adjust the import list or set parameters before configuration is loaded.
    fn configure_container(&self, _configurator: &mut ContainerConfigurator) -> Result<()> {
        Ok(())
    }

    /// Last chance to change the builder, after every bundle's `build` hook.
    fn build(&self, _container: &mut ContainerBuilder) -> Result<()> {
        Ok(())
    }
}

/// Hooks that keep every default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl KernelHooks for DefaultHooks {}
