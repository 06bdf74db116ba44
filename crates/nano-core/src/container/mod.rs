//! # Nano Core Container
//!
//! The dependency-injection container the kernel builds and serves.
//!
//! - [`ContainerBuilder`] collects parameters, service definitions,
//!   extensions and compiler passes, then compiles and freezes.
//! - [`CompiledContainer`] is the serializable snapshot written to the cache.
//! - [`Container`] is what bundles and callers see after boot.
//! - [`Extension`] and [`CompilerPass`] are the seams bundles plug into.
pub mod builder;
pub mod compiled;
pub mod definition;
pub mod error;
pub mod extension;
pub mod parameters;
pub mod pass;
pub mod runtime;

pub use builder::ContainerBuilder;
pub use compiled::CompiledContainer;
pub use definition::{AutoconfigureRule, Definition, Reference};
pub use error::ContainerError;
pub use extension::Extension;
pub use pass::{CompilerPass, MergeExtensionConfigurationPass, PassConfig, PassType};
pub use runtime::Container;

#[cfg(test)]
mod tests;
