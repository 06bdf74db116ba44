//! # Nano Core Container Errors
//!
//! Defines [`ContainerError`], raised while registering services, merging
//! extension configuration or compiling the container.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Parameter '{name}' does not exist{}", referenced_by_suffix(referenced_by))]
    ParameterNotFound {
        name: String,
        referenced_by: Option<String>,
    },

    #[error(
        "Circular reference detected for parameter '{}' (path: {})",
        chain.last().map(String::as_str).unwrap_or("<unknown>"),
        chain.join(" -> ")
    )]
    CircularParameterReference { chain: Vec<String> },

    #[error("Parameter '{name}' resolves to a non-scalar value and cannot be embedded in a string")]
    NonScalarParameter { name: String },

    #[error("Service '{id}' does not exist{}", referenced_by_suffix(referenced_by))]
    ServiceNotFound {
        id: String,
        referenced_by: Option<String>,
    },

    #[error("Invalid definition for service '{id}': {message}")]
    InvalidDefinition { id: String, message: String },

    #[error("An extension with alias '{alias}' is already registered")]
    DuplicateExtension { alias: String },

    #[error(
        "There is no extension able to load the configuration for '{alias}' (available: {})",
        list_or_none(available)
    )]
    UnknownExtensionConfig {
        alias: String,
        available: Vec<String>,
    },

    #[error("Extension '{alias}' failed to load its configuration: {message}")]
    ExtensionLoad { alias: String, message: String },

    #[error("Compiler pass '{pass}' failed: {message}")]
    CompilerPass { pass: String, message: String },

    #[error("Cannot {operation} on a compiled container")]
    Frozen { operation: String },

    #[error("Container has not been compiled yet")]
    NotCompiled,
}

fn referenced_by_suffix(referenced_by: &Option<String>) -> String {
    referenced_by
        .as_ref()
        .map(|r| format!(" (referenced by '{}')", r))
        .unwrap_or_default()
}

pub(crate) fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
