pub mod bundle_system;
pub mod cache;
pub mod config;
pub mod container;
pub mod kernel;
pub mod storage;
pub mod utils;

// Re-export key public types/traits for the binary and bundles
pub use bundle_system::{Bundle, BundleFactories};
pub use config::{ContainerConfigurator, ImportDeclaration};
pub use container::{CompilerPass, Container, ContainerBuilder, Definition, Extension, PassType};
pub use kernel::error::{Error as KernelError, Result};
pub use kernel::{DefaultHooks, Kernel, KernelHooks};
pub use storage::StorageProvider;
