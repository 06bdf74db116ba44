//! # Nano Core Bundle System Errors
//!
//! Defines [`BundleSystemError`], covering the bundle activation declaration,
//! bundle instantiation and failures raised from bundle lifecycle hooks.
use std::path::PathBuf;

use crate::container::error::list_or_none;
use crate::kernel::error::Error;

#[derive(Debug, thiserror::Error)]
pub enum BundleSystemError {
    #[error(
        "Trying to register two bundles with the same name \"{name}\" \
         (from '{first}' and '{second}')"
    )]
    DuplicateBundleName {
        name: String,
        first: String,
        second: String,
    },

    #[error(
        "Bundle '{identifier}' is declared but no factory is registered for it (known: {})",
        list_or_none(known)
    )]
    UnknownBundle {
        identifier: String,
        known: Vec<String>,
    },

    #[error("Invalid bundle declaration in '{}': {message}", path.display())]
    InvalidDeclaration { path: PathBuf, message: String },

    #[error("Bundle '{bundle}' failed during {hook}: {source}")]
    HookFailed {
        bundle: String,
        hook: String,
        #[source]
        source: Box<Error>,
    },
}

impl BundleSystemError {
    pub fn hook_failed(bundle: impl Into<String>, hook: impl Into<String>, source: Error) -> Self {
        BundleSystemError::HookFailed {
            bundle: bundle.into(),
            hook: hook.into(),
            source: Box::new(source),
        }
    }
}
