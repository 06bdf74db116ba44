use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::bundle_system::declaration::BundleDeclarations;
use crate::bundle_system::error::BundleSystemError;
use crate::bundle_system::registry::BundleRegistry;
use crate::bundle_system::traits::Bundle;
use crate::cache::artifact::ContainerDumper;
use crate::cache::error::CacheError;
use crate::cache::gate::CacheGate;
use crate::config::importer::ContainerConfigurator;
use crate::container::builder::ContainerBuilder;
use crate::container::pass::MergeExtensionConfigurationPass;
use crate::container::runtime::Container;
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::kernel::hooks::{DefaultHooks, KernelHooks};
use crate::storage::local::LocalStorageProvider;
use crate::storage::provider::StorageProvider;
use crate::utils::fs::find_ancestor_with_file;

/// The micro-kernel: activates bundles, builds or loads the container and
/// boots the bundles against it.
///
/// A kernel is bound to one environment and debug flag for its whole life.
/// In debug mode the container is rebuilt on every boot; otherwise the
/// artifact in `var/cache/<env>/` is reused as long as it exists.
pub struct Kernel<H: KernelHooks = DefaultHooks> {
    environment: String,
    debug: bool,
    booted: bool,
    hooks: H,
    storage: Arc<dyn StorageProvider>,
    project_dir: OnceCell<PathBuf>,
    bundles: BundleRegistry,
    container: Option<Arc<Container>>,
}

impl Kernel<DefaultHooks> {
    /// Create a kernel with the default hooks. Never fails; nothing is
    /// resolved or read until first use.
    pub fn new(environment: impl Into<String>, debug: bool) -> Self {
        Self::with_hooks(environment, debug, DefaultHooks)
    }
}

impl<H: KernelHooks> Kernel<H> {
    pub fn with_hooks(environment: impl Into<String>, debug: bool, hooks: H) -> Self {
        Self {
            environment: environment.into(),
            debug,
            booted: false,
            hooks,
            storage: Arc::new(LocalStorageProvider::default()),
            project_dir: OnceCell::new(),
            bundles: BundleRegistry::new(),
            container: None,
        }
    }

    /// Replace the storage provider used for every filesystem access.
    pub fn with_storage(mut self, storage: Arc<dyn StorageProvider>) -> Self {
        self.storage = storage;
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    // --- Directories ---

    /// Project root, resolved once and memoized.
    ///
    /// Taken from [`KernelHooks::project_dir`] when set; otherwise the nearest
    /// ancestor of the kernel location holding the project marker file, or
    /// the kernel location itself when no ancestor has one.
    pub fn project_dir(&self) -> Result<PathBuf> {
        self.project_dir
            .get_or_try_init(|| self.resolve_project_dir())
            .cloned()
    }

    fn resolve_project_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = self.hooks.project_dir() {
            log::debug!("Using configured project dir '{}'", dir.display());
            return Ok(dir);
        }

        let start = self.hooks.kernel_location()?;
        let marker = self.hooks.project_marker();
        match find_ancestor_with_file(self.storage.as_ref(), &start, marker) {
            Some(dir) => {
                log::debug!("Detected project dir '{}' via '{}'", dir.display(), marker);
                Ok(dir)
            }
            None => {
                log::warn!(
                    "No '{}' found above '{}', using it as the project dir",
                    marker,
                    start.display()
                );
                Ok(start)
            }
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        Ok(self.project_dir()?.join(constants::CONFIG_DIR_NAME))
    }

    /// Environment-scoped cache directory, `var/cache/<env>`.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        Ok(self
            .project_dir()?
            .join(constants::CACHE_DIR_NAME)
            .join(&self.environment))
    }

    /// Same as [`cache_dir`](Self::cache_dir).
    pub fn build_dir(&self) -> Result<PathBuf> {
        self.cache_dir()
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.project_dir()?.join(constants::LOG_DIR_NAME))
    }

    /// Location of the compiled container artifact.
    pub fn container_path(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join(constants::CONTAINER_DUMP_FILE))
    }

    // --- Lifecycle ---

    /// Boot the kernel. Calling it again once booted does nothing.
    ///
    /// On failure the kernel stays not booted and holds no container.
    pub fn boot(&mut self) -> Result<()> {
        if self.booted {
            return Ok(());
        }
        log::info!(
            "Booting {} v{} (environment '{}', debug={})",
            constants::APP_NAME,
            constants::KERNEL_VERSION,
            self.environment,
            self.debug
        );

        let cache_dir = self.cache_dir()?;
        self.storage.create_dir_all(&cache_dir)?;

        let mut bundles = self.initialize_bundles()?;

        let artifact_path = cache_dir.join(constants::CONTAINER_DUMP_FILE);
        if CacheGate::new(self.debug).should_rebuild(self.storage.as_ref(), &artifact_path) {
            self.build_container(&bundles, &artifact_path)?;
        } else {
            log::info!("Reusing cached container '{}'", artifact_path.display());
        }

        let container = Arc::new(self.load_container(&artifact_path)?);
        let mut started = 0;
        let mut failure: Option<Error> = None;
        for (name, bundle) in bundles.iter_mut() {
            bundle.set_container(Arc::clone(&container));
            if let Err(e) = bundle.boot() {
                failure = Some(BundleSystemError::hook_failed(name, "boot", e).into());
                break;
            }
            started += 1;
        }
        if let Some(e) = failure {
            log::error!("Boot failed, shutting down {} booted bundle(s)", started);
            if let Some(shutdown_error) = shutdown_bundles(&mut bundles, started) {
                log::error!("Rollback after failed boot incomplete: {}", shutdown_error);
            }
            return Err(e);
        }

        self.bundles = bundles;
        self.container = Some(container);
        self.booted = true;
        log::info!("Kernel booted with {} bundle(s)", self.bundles.len());
        Ok(())
    }

    /// Shut bundles down in reverse order and drop the container.
    ///
    /// Every bundle gets its shutdown hook even if an earlier one fails; the
    /// first failure is returned. The kernel can be booted again afterwards.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.booted {
            return Ok(());
        }

        let count = self.bundles.len();
        let first_error = shutdown_bundles(&mut self.bundles, count);

        self.bundles = BundleRegistry::new();
        self.container = None;
        self.booted = false;
        log::info!("Kernel shut down");

        match first_error {
            Some(e) => Err(Error::lifecycle(
                KernelLifecyclePhase::Shutdown,
                "one or more bundles failed to shut down",
                e,
            )),
            None => Ok(()),
        }
    }

    /// The booted container, booting first if needed.
    pub fn container(&mut self) -> Result<Arc<Container>> {
        self.boot()?;
        self.container
            .clone()
            .ok_or_else(|| Error::Other("Kernel booted without a container".to_string()))
    }

    /// Active bundles; empty until booted.
    pub fn bundles(&self) -> &BundleRegistry {
        &self.bundles
    }

    pub fn bundle(&self, name: &str) -> Option<&dyn Bundle> {
        self.bundles.get(name)
    }

    /// Remove the environment cache directory. Returns whether it existed.
    pub fn clear_cache(&self) -> Result<bool> {
        let cache_dir = self.cache_dir()?;
        if !self.storage.is_dir(&cache_dir) {
            return Ok(false);
        }
        self.storage.remove_dir_all(&cache_dir)?;
        log::info!("Cleared cache directory '{}'", cache_dir.display());
        Ok(true)
    }

    // --- Internals ---

    fn initialize_bundles(&self) -> Result<BundleRegistry> {
        let declarations = BundleDeclarations::load(self.storage.as_ref(), &self.config_dir()?)?;
        let factories = self.hooks.bundle_factories();
        BundleRegistry::from_declarations(&declarations, &factories, &self.environment)
    }

    /// Parameters every container starts with. Paths are escaped so a `%` in
    /// a directory name is never read as a placeholder.
    fn kernel_parameters(&self) -> Result<Vec<(&'static str, Value)>> {
        let escape = |path: PathBuf| Value::String(path.display().to_string().replace('%', "%%"));
        Ok(vec![
            (constants::PARAM_PROJECT_DIR, escape(self.project_dir()?)),
            (constants::PARAM_CACHE_DIR, escape(self.cache_dir()?)),
            (constants::PARAM_LOG_DIR, escape(self.log_dir()?)),
            (constants::PARAM_ENVIRONMENT, Value::String(self.environment.clone())),
            (constants::PARAM_DEBUG, Value::Bool(self.debug)),
        ])
    }

    fn build_container(&self, bundles: &BundleRegistry, artifact_path: &Path) -> Result<()> {
        log::info!("Building container for environment '{}'", self.environment);
        let storage = self.storage.as_ref();
        let mut builder = ContainerBuilder::new();

        for (name, value) in self.kernel_parameters()? {
            builder.set_parameter(name, value)?;
        }

        #[cfg(feature = "serverless")]
        builder
            .register_for_autoconfiguration(constants::SERVERLESS_HANDLER_INTERFACE)?
            .set_public(true);

        let mut configurator = ContainerConfigurator::with_default_imports(
            storage,
            self.config_dir()?,
            self.environment.as_str(),
        );
        self.hooks.configure_container(&mut configurator).map_err(|e| {
            Error::lifecycle(KernelLifecyclePhase::Build, "configure_container hook failed", e)
        })?;
        configurator.apply(&mut builder, storage)?;

        for (name, bundle) in bundles.iter() {
            if let Some(extension) = bundle.container_extension() {
                log::debug!("Bundle '{}' provides extension '{}'", name, extension.alias());
                builder.register_extension(extension)?;
            }
            if self.debug {
                builder.add_resource(format!("bundle:{}", name));
            }
        }
        for (name, bundle) in bundles.iter() {
            bundle
                .build(&mut builder)
                .map_err(|e| BundleSystemError::hook_failed(name, "build", e))?;
        }
        self.hooks.build(&mut builder).map_err(|e| {
            Error::lifecycle(KernelLifecyclePhase::Build, "kernel build hook failed", e)
        })?;

        let aliases = builder.extension_aliases();
        if !aliases.is_empty() {
            builder
                .pass_config_mut()
                .set_merge_pass(Box::new(MergeExtensionConfigurationPass::new(aliases)));
        }

        builder.compile()?;
        ContainerDumper::new(storage).dump(artifact_path, &builder, &self.environment, self.debug)
    }

    fn load_container(&self, artifact_path: &Path) -> Result<Container> {
        let artifact = ContainerDumper::new(self.storage.as_ref()).load(artifact_path)?;
        if artifact.environment != self.environment {
            return Err(CacheError::IncompatibleArtifact {
                path: artifact_path.to_path_buf(),
                reason: format!(
                    "built for environment '{}', not '{}'",
                    artifact.environment, self.environment
                ),
            }
            .into());
        }
        Ok(Container::from(artifact.container))
    }
}

/// Call `shutdown` on the first `count` bundles, last one first. Every one of
/// them gets its hook; the first failure is returned.
fn shutdown_bundles(bundles: &mut BundleRegistry, count: usize) -> Option<Error> {
    let skip = bundles.len().saturating_sub(count);
    let mut first_error: Option<Error> = None;
    for (name, bundle) in bundles.iter_mut_rev().skip(skip) {
        if let Err(e) = bundle.shutdown() {
            log::error!("Bundle '{}' failed to shut down: {}", name, e);
            if first_error.is_none() {
                first_error = Some(BundleSystemError::hook_failed(name, "shutdown", e).into());
            }
        }
    }
    first_error
}
