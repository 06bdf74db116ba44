//! # Nano Core Kernel
//!
//! The [`Kernel`] facade and everything it is configured with.
//!
//! - [`bootstrap`]: [`Kernel`], which resolves the project directories,
//!   activates bundles, builds or loads the container and runs bundle hooks.
//! - [`hooks`]: [`KernelHooks`], the application's customization points.
//! - [`constants`]: directory names, file names and kernel parameter names.
//! - [`error`]: [`Error`] and the crate-wide [`Result`].
pub mod bootstrap;
pub mod constants;
pub mod error;
pub mod hooks;

pub use bootstrap::Kernel;
pub use error::{Error, KernelLifecyclePhase, Result};
pub use hooks::{DefaultHooks, KernelHooks};

#[cfg(test)]
mod tests;
