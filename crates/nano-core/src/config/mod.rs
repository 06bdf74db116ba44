//! # Nano Core Config System
//!
//! Reads configuration sources and applies them to a
//! [`ContainerBuilder`](crate::container::ContainerBuilder).
//!
//! - [`format`]: supported file formats, gated by the `yaml-config` and
//!   `toml-config` features.
//! - [`data`]: [`ConfigData`], one parsed file.
//! - [`importer`]: [`ImportDeclaration`] and the [`ContainerConfigurator`]
//!   holding the ordered import list for an environment.
//! - [`loader`]: [`ConfigLoader`], which resolves globs and nested `imports`
//!   and turns file contents into parameters, services and extension configs.
pub mod data;
pub mod error;
pub mod format;
pub mod importer;
pub mod loader;

pub use data::ConfigData;
pub use error::ConfigSystemError;
pub use format::ConfigFormat;
pub use importer::{default_imports, ContainerConfigurator, ImportDeclaration};
pub use loader::ConfigLoader;

#[cfg(test)]
mod tests;
