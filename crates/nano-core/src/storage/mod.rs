//! # Nano Core Storage
//!
//! Thin filesystem abstraction used by the kernel for everything that touches
//! disk: the environment cache directory, configuration sources and the
//! compiled container artifact.
pub mod error;
pub mod local;
pub mod provider;

pub use error::StorageSystemError;
pub use local::LocalStorageProvider;
pub use provider::StorageProvider;

#[cfg(test)]
mod tests;
