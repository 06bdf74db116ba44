//! # Nano Core Config System Errors
//!
//! Defines [`ConfigSystemError`], raised while resolving import declarations
//! and applying configuration files to a container builder.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigSystemError {
    #[error("Invalid import pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Required configuration resource '{resource}' not found at '{}'", path.display())]
    RequiredResourceMissing { resource: String, path: PathBuf },

    #[error("Failed to parse '{}' as {format}: {message}", path.display())]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Invalid configuration in '{}': {message}", path.display())]
    InvalidStructure { path: PathBuf, message: String },

    #[error("Circular import detected: {}", display_chain(chain))]
    CircularImport { chain: Vec<PathBuf> },
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
