//! # Nano Core Cache
//!
//! Persistence of the compiled container under `var/cache/<env>/`.
//!
//! [`CacheGate`] decides between building and loading; [`ContainerDumper`]
//! writes and reads the [`ContainerArtifact`].
pub mod artifact;
pub mod error;
pub mod gate;

pub use artifact::{ContainerArtifact, ContainerDumper, ARTIFACT_FORMAT_VERSION};
pub use error::CacheError;
pub use gate::CacheGate;

#[cfg(test)]
mod tests;
