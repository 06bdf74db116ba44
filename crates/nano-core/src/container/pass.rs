//! Compiler passes and their ordering.
//!
//! [`ContainerBuilder::compile`](crate::container::ContainerBuilder::compile)
//! runs the merge pass first, then every pass grouped by [`PassType`] in
//! declaration order of the variants, and by registration order inside a group.
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;

use serde_json::{Map, Value};

use crate::container::builder::ContainerBuilder;
use crate::container::definition::Reference;
use crate::container::error::ContainerError;
use crate::container::parameters::ParameterResolver;
use crate::kernel::error::Result;

/// A transformation or validation step applied while compiling.
pub trait CompilerPass: Send + Sync {
    fn name(&self) -> &str;
    fn process(&self, container: &mut ContainerBuilder) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassType {
    BeforeOptimization,
    Optimization,
    BeforeRemoving,
    Removing,
    AfterRemoving,
}

/// The merge pass plus the ordered compiler passes of a builder.
pub struct PassConfig {
    merge_pass: Option<Box<dyn CompilerPass>>,
    passes: BTreeMap<PassType, Vec<Box<dyn CompilerPass>>>,
}

impl fmt::Debug for PassConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassConfig")
            .field("merge_pass", &self.merge_pass.as_ref().map(|p| p.name().to_string()))
            .field("passes", &self.pass_names())
            .finish()
    }
}

impl Default for PassConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PassConfig {
    /// Pass configuration with the built-in passes installed.
    pub fn new() -> Self {
        let mut config = Self::empty();
        config.merge_pass = Some(Box::new(MergeExtensionConfigurationPass::new(Vec::new())));
        config.add_pass(Box::new(AutoconfigurePass), PassType::BeforeOptimization);
        config.add_pass(Box::new(ResolveParameterPlaceholdersPass), PassType::Optimization);
        config.add_pass(Box::new(RemoveUnusedPrivateServicesPass), PassType::Removing);
        config.add_pass(Box::new(CheckReferencesPass), PassType::AfterRemoving);
        config
    }

    /// Pass configuration without any pass.
    pub fn empty() -> Self {
        Self {
            merge_pass: None,
            passes: BTreeMap::new(),
        }
    }

    pub fn set_merge_pass(&mut self, pass: Box<dyn CompilerPass>) {
        self.merge_pass = Some(pass);
    }

    pub fn merge_pass(&self) -> Option<&dyn CompilerPass> {
        self.merge_pass.as_deref()
    }

    pub(crate) fn take_merge_pass(&mut self) -> Option<Box<dyn CompilerPass>> {
        self.merge_pass.take()
    }

    pub fn add_pass(&mut self, pass: Box<dyn CompilerPass>, pass_type: PassType) {
        self.passes.entry(pass_type).or_default().push(pass);
    }

    /// Names of all ordered passes, merge pass excluded.
    pub fn pass_names(&self) -> Vec<String> {
        self.passes
            .values()
            .flat_map(|group| group.iter().map(|p| p.name().to_string()))
            .collect()
    }

    /// Append the ordered passes of `other`; its merge pass is dropped.
    pub(crate) fn absorb(&mut self, other: PassConfig) {
        for (pass_type, group) in other.passes {
            self.passes.entry(pass_type).or_default().extend(group);
        }
    }

    pub(crate) fn into_ordered(self) -> Vec<Box<dyn CompilerPass>> {
        self.passes.into_values().flatten().collect()
    }
}

/// Hands every extension its collected configuration blocks.
///
/// Aliases listed in `forced` are loaded with a single empty block when no
/// configuration was supplied, so their defaults are never skipped silently.
/// Parameters, services and aliases already on the builder (application
/// configuration) take precedence over what extensions register.
pub struct MergeExtensionConfigurationPass {
    forced: Vec<String>,
}

impl MergeExtensionConfigurationPass {
    pub fn new(forced: Vec<String>) -> Self {
        Self { forced }
    }
}

impl CompilerPass for MergeExtensionConfigurationPass {
    fn name(&self) -> &str {
        "merge_extension_configuration"
    }

    fn process(&self, container: &mut ContainerBuilder) -> Result<()> {
        let available = container.extension_aliases();
        if let Some(alias) = container
            .extension_config_aliases()
            .into_iter()
            .find(|alias| !available.contains(alias))
        {
            return Err(ContainerError::UnknownExtensionConfig { alias, available }.into());
        }

        let own = container.own_configuration();
        let extensions = container.take_extensions();
        let mut outcome: Result<()> = Ok(());
        for (alias, extension) in &extensions {
            let mut configs = container.extension_config(alias).to_vec();
            if configs.is_empty() {
                if !self.forced.contains(alias) {
                    continue;
                }
                configs.push(Value::Object(Map::new()));
            }

            log::debug!("Loading extension '{}' with {} config block(s)", alias, configs.len());
            let mut scratch = container.scratch_for_extension();
            if let Err(e) = extension.load(&configs, &mut scratch) {
                outcome = Err(ContainerError::ExtensionLoad {
                    alias: alias.clone(),
                    message: e.to_string(),
                }
                .into());
                break;
            }
            container.merge(scratch);
        }
        container.restore_extensions(extensions);
        outcome?;
        container.restore_own_configuration(own);
        Ok(())
    }
}

/// Applies autoconfiguration rules to services that opted in.
pub struct AutoconfigurePass;

impl CompilerPass for AutoconfigurePass {
    fn name(&self) -> &str {
        "autoconfigure"
    }

    fn process(&self, container: &mut ContainerBuilder) -> Result<()> {
        let rules = container.autoconfiguration().clone();
        if rules.is_empty() {
            return Ok(());
        }
        for (id, definition) in container.definitions_mut() {
            if !definition.autoconfigure {
                continue;
            }
            let interfaces = definition.implements.clone();
            for interface in &interfaces {
                if let Some(rule) = rules.get(interface) {
                    log::trace!("Autoconfiguring '{}' as '{}'", id, interface);
                    rule.apply(definition);
                }
            }
        }
        Ok(())
    }
}

/// Replaces `%name%` placeholders in parameters and service definitions.
pub struct ResolveParameterPlaceholdersPass;

impl CompilerPass for ResolveParameterPlaceholdersPass {
    fn name(&self) -> &str {
        "resolve_parameter_placeholders"
    }

    fn process(&self, container: &mut ContainerBuilder) -> Result<()> {
        let resolved = ParameterResolver::new(container.parameters()).resolve_all()?;
        let mut resolver = ParameterResolver::for_resolved(&resolved);
        let mut updates = Vec::new();
        for (id, definition) in container.definitions() {
            let mut definition = definition.clone();
            if let Some(class) = &definition.class {
                match resolver.resolve_value(&Value::String(class.clone()), id)? {
                    Value::String(class) => definition.class = Some(class),
                    _ => {
                        return Err(ContainerError::InvalidDefinition {
                            id: id.clone(),
                            message: "class must resolve to a string".to_string(),
                        }
                        .into());
                    }
                }
            }
            definition.arguments = definition
                .arguments
                .iter()
                .map(|argument| resolver.resolve_value(argument, id))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            updates.push((id.clone(), definition));
        }

        container.replace_parameters(resolved);
        for (id, definition) in updates {
            container.replace_definition(id, definition);
        }
        Ok(())
    }
}

/// Drops private services that no public service or alias can reach.
pub struct RemoveUnusedPrivateServicesPass;

impl CompilerPass for RemoveUnusedPrivateServicesPass {
    fn name(&self) -> &str {
        "remove_unused_private_services"
    }

    fn process(&self, container: &mut ContainerBuilder) -> Result<()> {
        let mut reachable: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = container
            .definitions()
            .iter()
            .filter(|(_, d)| d.public)
            .map(|(id, _)| id.clone())
            .chain(container.aliases().values().cloned())
            .collect();

        while let Some(id) = queue.pop_front() {
            let id = container.resolve_alias(&id).to_string();
            if !reachable.insert(id.clone()) {
                continue;
            }
            if let Some(definition) = container.definition(&id) {
                queue.extend(definition.references().iter().map(|r| r.id().to_string()));
            }
        }

        let unused: Vec<String> = container
            .definitions()
            .keys()
            .filter(|id| !reachable.contains(*id))
            .cloned()
            .collect();
        for id in unused {
            log::debug!("Removing unused private service '{}'", id);
            container.remove_definition(&id);
        }
        Ok(())
    }
}

/// Fails compilation when a required reference or alias target is missing.
pub struct CheckReferencesPass;

impl CompilerPass for CheckReferencesPass {
    fn name(&self) -> &str {
        "check_references"
    }

    fn process(&self, container: &mut ContainerBuilder) -> Result<()> {
        for (alias, target) in container.aliases() {
            if !container.has(target) {
                return Err(ContainerError::ServiceNotFound {
                    id: target.clone(),
                    referenced_by: Some(alias.clone()),
                }
                .into());
            }
        }
        for (id, definition) in container.definitions() {
            for reference in definition.references() {
                if let Reference::Required(target) = reference {
                    if !container.has(&target) {
                        return Err(ContainerError::ServiceNotFound {
                            id: target,
                            referenced_by: Some(id.clone()),
                        }
                        .into());
                    }
                }
            }
        }
        Ok(())
    }
}
