use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::container::builder::ContainerBuilder;
use crate::container::definition::Definition;
use crate::container::error::ContainerError;

/// Frozen, serializable snapshot of a compiled builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledContainer {
    pub parameters: IndexMap<String, Value>,
    pub services: IndexMap<String, Definition>,
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
}

impl CompiledContainer {
    /// Snapshot a builder. Fails unless the builder has been compiled.
    pub fn from_builder(builder: &ContainerBuilder) -> Result<Self, ContainerError> {
        if !builder.is_compiled() {
            return Err(ContainerError::NotCompiled);
        }
        Ok(Self {
            parameters: builder.parameters().clone(),
            services: builder.definitions().clone(),
            aliases: builder.aliases().clone(),
        })
    }
}
