use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::container::definition::{AutoconfigureRule, Definition};
use crate::container::error::ContainerError;
use crate::container::extension::Extension;
use crate::container::pass::{CompilerPass, PassConfig, PassType};
use crate::kernel::error::{Error, Result};

/// Mutable container under construction.
///
/// Everything is kept in insertion order: parameters, definitions, extensions
/// and their config blocks. Once [`compile`](Self::compile) succeeds the
/// builder is frozen and every mutator returns [`ContainerError::Frozen`].
pub struct ContainerBuilder {
    parameters: IndexMap<String, Value>,
    definitions: IndexMap<String, Definition>,
    aliases: IndexMap<String, String>,
    extensions: IndexMap<String, Box<dyn Extension>>,
    extension_configs: IndexMap<String, Vec<Value>>,
    autoconfiguration: IndexMap<String, AutoconfigureRule>,
    pass_config: PassConfig,
    resources: Vec<String>,
    compiled: bool,
}

/// Configuration set on the builder itself, which wins over extension output.
pub(crate) struct OwnConfiguration {
    parameters: IndexMap<String, Value>,
    definitions: IndexMap<String, Definition>,
    aliases: IndexMap<String, String>,
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("parameters", &self.parameters.keys().collect::<Vec<_>>())
            .field("definitions", &self.definitions.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .field("extensions", &self.extensions.keys().collect::<Vec<_>>())
            .field("pass_config", &self.pass_config)
            .field("compiled", &self.compiled)
            .finish()
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            parameters: IndexMap::new(),
            definitions: IndexMap::new(),
            aliases: IndexMap::new(),
            extensions: IndexMap::new(),
            extension_configs: IndexMap::new(),
            autoconfiguration: IndexMap::new(),
            pass_config: PassConfig::new(),
            resources: Vec::new(),
            compiled: false,
        }
    }

    fn ensure_mutable(&self, operation: &str) -> Result<()> {
        if self.compiled {
            return Err(ContainerError::Frozen {
                operation: operation.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    // --- Parameters ---

    pub fn set_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.ensure_mutable("set a parameter")?;
        self.parameters.insert(name.into(), value.into());
        Ok(())
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }

    pub(crate) fn replace_parameters(&mut self, parameters: IndexMap<String, Value>) {
        self.parameters = parameters;
    }

    // --- Services ---

    /// Register a service with an explicit class and return its definition.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        class: impl Into<String>,
    ) -> Result<&mut Definition> {
        self.set_definition(id, Definition::new(class))
    }

    pub fn set_definition(
        &mut self,
        id: impl Into<String>,
        definition: Definition,
    ) -> Result<&mut Definition> {
        self.ensure_mutable("set a service definition")?;
        let id = id.into();
        if id.is_empty() {
            return Err(ContainerError::InvalidDefinition {
                id,
                message: "service id cannot be empty".to_string(),
            }
            .into());
        }
        self.aliases.shift_remove(&id);
        self.definitions.insert(id.clone(), definition);
        self.definitions.get_mut(&id).ok_or_else(|| {
            ContainerError::ServiceNotFound {
                id,
                referenced_by: None,
            }
            .into()
        })
    }

    pub fn set_alias(&mut self, alias: impl Into<String>, target: impl Into<String>) -> Result<()> {
        self.ensure_mutable("set an alias")?;
        let alias = alias.into();
        let target = target.into();
        if alias == target {
            return Err(ContainerError::InvalidDefinition {
                id: alias,
                message: "an alias cannot reference itself".to_string(),
            }
            .into());
        }
        self.definitions.shift_remove(&alias);
        self.aliases.insert(alias, target);
        Ok(())
    }

    pub fn has_definition(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Whether `id` is a definition or an alias.
    pub fn has(&self, id: &str) -> bool {
        self.definitions.contains_key(id) || self.aliases.contains_key(id)
    }

    pub fn definition(&self, id: &str) -> Option<&Definition> {
        self.definitions.get(self.resolve_alias(id))
    }

    pub fn definition_mut(&mut self, id: &str) -> Option<&mut Definition> {
        let id = self.resolve_alias(id).to_string();
        self.definitions.get_mut(&id)
    }

    pub fn definitions(&self) -> &IndexMap<String, Definition> {
        &self.definitions
    }

    pub fn definitions_mut(&mut self) -> &mut IndexMap<String, Definition> {
        &mut self.definitions
    }

    pub(crate) fn replace_definition(&mut self, id: String, definition: Definition) {
        self.definitions.insert(id, definition);
    }

    pub fn remove_definition(&mut self, id: &str) -> Option<Definition> {
        self.definitions.shift_remove(id)
    }

    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    /// Follow alias chains to the final id. Unknown ids resolve to themselves.
    pub fn resolve_alias<'a>(&'a self, id: &'a str) -> &'a str {
        let mut current = id;
        // Bounded walk: a cycle of aliases simply stops resolving
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(target) => current = target,
                None => return current,
            }
        }
        current
    }

    /// Services tagged with `tag`, in registration order.
    pub fn find_tagged_service_ids(&self, tag: &str) -> Vec<String> {
        self.definitions
            .iter()
            .filter(|(_, d)| d.has_tag(tag))
            .map(|(id, _)| id.clone())
            .collect()
    }

    // --- Extensions ---

    pub fn register_extension(&mut self, extension: Box<dyn Extension>) -> Result<()> {
        self.ensure_mutable("register an extension")?;
        let alias = extension.alias().to_string();
        if self.extensions.contains_key(&alias) {
            return Err(ContainerError::DuplicateExtension { alias }.into());
        }
        self.extensions.insert(alias, extension);
        Ok(())
    }

    pub fn has_extension(&self, alias: &str) -> bool {
        self.extensions.contains_key(alias)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &dyn Extension> {
        self.extensions.values().map(|e| e.as_ref())
    }

    /// Aliases of all registered extensions, in registration order.
    pub fn extension_aliases(&self) -> Vec<String> {
        self.extensions.keys().cloned().collect()
    }

    /// Queue a configuration block for the extension with `alias`.
    pub fn load_from_extension(&mut self, alias: impl Into<String>, config: Value) -> Result<()> {
        self.ensure_mutable("load extension configuration")?;
        self.extension_configs.entry(alias.into()).or_default().push(config);
        Ok(())
    }

    pub fn extension_config(&self, alias: &str) -> &[Value] {
        self.extension_configs.get(alias).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn extension_config_aliases(&self) -> Vec<String> {
        self.extension_configs.keys().cloned().collect()
    }

    pub(crate) fn take_extensions(&mut self) -> IndexMap<String, Box<dyn Extension>> {
        std::mem::take(&mut self.extensions)
    }

    pub(crate) fn restore_extensions(&mut self, extensions: IndexMap<String, Box<dyn Extension>>) {
        self.extensions = extensions;
    }

    /// Empty builder carrying a copy of the current parameters, handed to
    /// [`Extension::load`].
    pub(crate) fn scratch_for_extension(&self) -> ContainerBuilder {
        let mut scratch = ContainerBuilder::new();
        scratch.parameters = self.parameters.clone();
        scratch.pass_config = PassConfig::empty();
        scratch
    }

    /// Fold everything a scratch builder collected into this one.
    pub(crate) fn merge(&mut self, other: ContainerBuilder) {
        self.parameters.extend(other.parameters);
        for (id, definition) in other.definitions {
            self.aliases.shift_remove(&id);
            self.definitions.insert(id, definition);
        }
        for (alias, target) in other.aliases {
            self.definitions.shift_remove(&alias);
            self.aliases.insert(alias, target);
        }
        self.autoconfiguration.extend(other.autoconfiguration);
        self.resources.extend(other.resources);
        self.pass_config.absorb(other.pass_config);
    }

    /// Parameters, definitions and aliases as they are before extensions load.
    pub(crate) fn own_configuration(&self) -> OwnConfiguration {
        OwnConfiguration {
            parameters: self.parameters.clone(),
            definitions: self.definitions.clone(),
            aliases: self.aliases.clone(),
        }
    }

    /// Put back what [`own_configuration`](Self::own_configuration) captured,
    /// replacing anything an extension registered under the same name.
    pub(crate) fn restore_own_configuration(&mut self, own: OwnConfiguration) {
        self.parameters.extend(own.parameters);
        for (id, definition) in own.definitions {
            self.aliases.shift_remove(&id);
            self.definitions.insert(id, definition);
        }
        for (alias, target) in own.aliases {
            self.definitions.shift_remove(&alias);
            self.aliases.insert(alias, target);
        }
    }

    // --- Autoconfiguration, passes, resources ---

    /// Rule applied to every autoconfigured service implementing `interface`.
    pub fn register_for_autoconfiguration(
        &mut self,
        interface: impl Into<String>,
    ) -> Result<&mut AutoconfigureRule> {
        self.ensure_mutable("register an autoconfiguration rule")?;
        Ok(self.autoconfiguration.entry(interface.into()).or_default())
    }

    pub fn autoconfiguration(&self) -> &IndexMap<String, AutoconfigureRule> {
        &self.autoconfiguration
    }

    pub fn add_compiler_pass(
        &mut self,
        pass: Box<dyn CompilerPass>,
        pass_type: PassType,
    ) -> Result<()> {
        self.ensure_mutable("add a compiler pass")?;
        self.pass_config.add_pass(pass, pass_type);
        Ok(())
    }

    pub fn pass_config(&self) -> &PassConfig {
        &self.pass_config
    }

    pub fn pass_config_mut(&mut self) -> &mut PassConfig {
        &mut self.pass_config
    }

    /// Record a build-time resource the compiled container depends on.
    pub fn add_resource(&mut self, resource: impl Into<String>) {
        let resource = resource.into();
        if !self.resources.contains(&resource) {
            self.resources.push(resource);
        }
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    // --- Compilation ---

    /// Run the merge pass, then every compiler pass in order, and freeze.
    pub fn compile(&mut self) -> Result<()> {
        self.ensure_mutable("compile")?;

        let mut config = std::mem::replace(&mut self.pass_config, PassConfig::empty());
        if let Some(merge_pass) = config.take_merge_pass() {
            log::debug!("Running merge pass '{}'", merge_pass.name());
            merge_pass.process(self)?;
        }
        // Passes registered by extensions during the merge
        let added = std::mem::replace(&mut self.pass_config, PassConfig::empty());
        config.absorb(added);

        for pass in config.into_ordered() {
            log::debug!("Running compiler pass '{}'", pass.name());
            pass.process(self).map_err(|e| match e {
                Error::Container(_) => e,
                other => ContainerError::CompilerPass {
                    pass: pass.name().to_string(),
                    message: other.to_string(),
                }
                .into(),
            })?;
        }

        self.compiled = true;
        log::info!(
            "Container compiled: {} service(s), {} parameter(s)",
            self.definitions.len(),
            self.parameters.len()
        );
        Ok(())
    }
}
