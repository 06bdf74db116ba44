//! # Nano Core Cache Errors
//!
//! Defines [`CacheError`]. A cache artifact that cannot be used is reported,
//! never silently rebuilt: clearing the environment cache directory is an
//! explicit operator action.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(
        "Cached container '{}' is incompatible ({reason}); clear '{}' and boot again",
        path.display(),
        cache_dir_of(path)
    )]
    IncompatibleArtifact { path: PathBuf, reason: String },

    #[error("Cached container '{}' is corrupt: {message}", path.display())]
    CorruptArtifact { path: PathBuf, message: String },
}

fn cache_dir_of(path: &std::path::Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
