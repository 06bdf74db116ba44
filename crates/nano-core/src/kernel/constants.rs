/// Application name
pub const APP_NAME: &str = "nano-kernel";

/// Kernel version, recorded in every cache artifact
pub const KERNEL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File whose presence marks the project root
pub const PROJECT_MARKER_FILE: &str = "Cargo.toml";

/// Configuration directory, relative to the project root
pub const CONFIG_DIR_NAME: &str = "config";

/// Cache root, relative to the project root; one subdirectory per environment
pub const CACHE_DIR_NAME: &str = "var/cache";

/// Log directory, relative to the project root
pub const LOG_DIR_NAME: &str = "var/log";

/// Compiled container artifact inside the environment cache directory
pub const CONTAINER_DUMP_FILE: &str = "container.json";

/// Bundle activation declaration (extension picked from the supported formats)
pub const BUNDLES_FILE_STEM: &str = "bundles";

/// Activation key that applies to every environment
pub const ALL_ENVIRONMENTS: &str = "all";

/// Interface name that serverless handler services implement
pub const SERVERLESS_HANDLER_INTERFACE: &str = "serverless.handler";

/// Parameter names seeded into every container
pub const PARAM_PROJECT_DIR: &str = "kernel.project_dir";
pub const PARAM_CACHE_DIR: &str = "kernel.cache_dir";
pub const PARAM_LOG_DIR: &str = "kernel.log_dir";
pub const PARAM_ENVIRONMENT: &str = "kernel.environment";
pub const PARAM_DEBUG: &str = "kernel.debug";
