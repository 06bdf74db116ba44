//! # Nano Core Bundle System
//!
//! Bundles are how functionality is plugged into the kernel. Which bundles are
//! active is declared per environment in `config/bundles.{yaml,toml,json}`;
//! each declared identifier is turned into a bundle through a factory
//! registered in [`BundleFactories`].
//!
//! - [`traits`]: the [`Bundle`] trait and its lifecycle hooks.
//! - [`declaration`]: [`BundleDeclarations`], the parsed activation file.
//! - [`registry`]: [`BundleFactories`] and the active [`BundleRegistry`].
//! - [`error`]: [`BundleSystemError`].
pub mod declaration;
pub mod error;
pub mod registry;
pub mod traits;

pub use declaration::BundleDeclarations;
pub use error::BundleSystemError;
pub use registry::{BundleFactories, BundleFactory, BundleRegistry};
pub use traits::Bundle;

#[cfg(test)]
mod tests;
