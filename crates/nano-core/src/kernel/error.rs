//! # Nano Core Kernel Errors
//!
//! Defines [`Error`], the error type returned by every public kernel operation.
//!
//! Each subsystem keeps its own typed error ([`BundleSystemError`],
//! [`ContainerError`], [`ConfigSystemError`], [`CacheError`],
//! [`StorageSystemError`]) and converts into [`Error`] via `From`, so `?`
//! propagates them unchanged. None of these are retried: a failed boot leaves
//! the kernel not booted.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::bundle_system::error::BundleSystemError;
use crate::cache::error::CacheError;
use crate::config::error::ConfigSystemError;
use crate::container::error::ContainerError;
use crate::storage::error::StorageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Bundle declaration or bundle hook failure
    #[error("Bundle system error: {0}")]
    BundleSystem(#[from] BundleSystemError),

    /// Container building or compilation failure
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Configuration import failure
    #[error("Config system error: {0}")]
    ConfigSystem(#[from] ConfigSystemError),

    /// Cache artifact could not be used
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Filesystem failure
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// The project directory could not be auto-detected.
    #[error("Cannot auto-detect project dir from '{}': {reason}", path.display())]
    ProjectDirResolution { path: PathBuf, reason: String },

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Build")]
    Build,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wrap an I/O error with the operation and path that produced it.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }

    /// Wrap an error raised while running a lifecycle phase.
    pub fn lifecycle(
        phase: KernelLifecyclePhase,
        message: impl Into<String>,
        source: Error,
    ) -> Self {
        Error::KernelLifecycleError {
            phase,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
