use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::container::compiled::CompiledContainer;
use crate::container::definition::Definition;

type Instance = Arc<dyn Any + Send + Sync>;

/// The container served by a booted kernel.
///
/// Definitions and parameters are read-only. Bundles may attach live instances
/// under any id with [`set`](Self::set) during their boot hook.
pub struct Container {
    parameters: IndexMap<String, Value>,
    services: IndexMap<String, Definition>,
    aliases: IndexMap<String, String>,
    instances: RwLock<HashMap<String, Instance>>,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("parameters", &self.parameters)
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl From<CompiledContainer> for Container {
    fn from(compiled: CompiledContainer) -> Self {
        Self {
            parameters: compiled.parameters,
            services: compiled.services,
            aliases: compiled.aliases,
            instances: RwLock::new(HashMap::new()),
        }
    }
}

impl Container {
    fn resolve_id<'a>(&'a self, id: &'a str) -> &'a str {
        let mut current = id;
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    /// Whether a service is defined, aliased or was set at runtime.
    pub fn has(&self, id: &str) -> bool {
        let id = self.resolve_id(id);
        self.services.contains_key(id)
            || self
                .instances
                .read()
                .map(|instances| instances.contains_key(id))
                .unwrap_or(false)
    }

    pub fn definition(&self, id: &str) -> Option<&Definition> {
        self.services.get(self.resolve_id(id))
    }

    pub fn service_ids(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    pub fn public_service_ids(&self) -> Vec<&str> {
        self.services
            .iter()
            .filter(|(_, d)| d.public)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Typed parameter lookup; `None` when missing or of another shape.
    pub fn parameter_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.parameters
            .get(name)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }

    /// Attach a live instance under `id`.
    pub fn set<T: Any + Send + Sync>(&self, id: impl Into<String>, instance: Arc<T>) {
        let mut instances = self.instances.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        instances.insert(id.into(), instance);
    }

    /// Fetch a live instance previously attached with [`set`](Self::set).
    pub fn get<T: Any + Send + Sync>(&self, id: &str) -> Option<Arc<T>> {
        let id = self.resolve_id(id);
        let instances = self.instances.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        instances.get(id).cloned().and_then(|instance| Arc::downcast::<T>(instance).ok())
    }

    /// Snapshot of the compiled part, without runtime instances.
    pub fn to_compiled(&self) -> CompiledContainer {
        CompiledContainer {
            parameters: self.parameters.clone(),
            services: self.services.clone(),
            aliases: self.aliases.clone(),
        }
    }
}
