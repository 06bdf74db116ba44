use std::fmt;

use indexmap::IndexMap;

use crate::bundle_system::declaration::BundleDeclarations;
use crate::bundle_system::error::BundleSystemError;
use crate::bundle_system::traits::Bundle;
use crate::kernel::error::Result;

/// Constructor for a bundle, registered under a declaration identifier
pub type BundleFactory = Box<dyn Fn() -> Box<dyn Bundle> + Send + Sync>;

/// Maps declaration identifiers to bundle constructors.
#[derive(Default)]
pub struct BundleFactories {
    factories: IndexMap<String, BundleFactory>,
}

impl fmt::Debug for BundleFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl BundleFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `identifier`, replacing any previous one.
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Bundle> + Send + Sync + 'static,
    {
        self.factories.insert(identifier.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    fn create(&self, identifier: &str) -> Result<Box<dyn Bundle>> {
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| BundleSystemError::UnknownBundle {
                identifier: identifier.to_string(),
                known: self.identifiers(),
            })?;
        Ok(factory())
    }
}

/// The active bundle set of a kernel, keyed by bundle name in activation order.
#[derive(Default)]
pub struct BundleRegistry {
    bundles: IndexMap<String, Box<dyn Bundle>>,
    identifiers: IndexMap<String, String>,
}

impl fmt::Debug for BundleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleRegistry")
            .field("bundles", &self.identifiers)
            .finish()
    }
}

impl BundleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate every bundle active in `environment`, in declaration order.
    pub fn from_declarations(
        declarations: &BundleDeclarations,
        factories: &BundleFactories,
        environment: &str,
    ) -> Result<Self> {
        let mut registry = Self::new();
        for identifier in declarations.active_identifiers(environment) {
            let bundle = factories.create(identifier)?;
            registry.register(identifier, bundle)?;
        }
        log::info!(
            "Activated {} bundle(s) for environment '{}': [{}]",
            registry.len(),
            environment,
            registry.names().collect::<Vec<_>>().join(", ")
        );
        Ok(registry)
    }

    /// Add a bundle created from `identifier`; its name must be unique.
    pub fn register(
        &mut self,
        identifier: impl Into<String>,
        bundle: Box<dyn Bundle>,
    ) -> Result<()> {
        let identifier = identifier.into();
        let name = bundle.name().to_string();
        if let Some(first) = self.identifiers.get(&name) {
            return Err(BundleSystemError::DuplicateBundleName {
                name,
                first: first.clone(),
                second: identifier,
            }
            .into());
        }
        log::debug!("Registered bundle '{}' from '{}'", name, identifier);
        self.identifiers.insert(name.clone(), identifier);
        self.bundles.insert(name, bundle);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Bundle> {
        self.bundles.get(name).map(|b| b.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    /// Declaration identifier the bundle named `name` was created from
    pub fn identifier_of(&self, name: &str) -> Option<&str> {
        self.identifiers.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Bundle)> {
        self.bundles.iter().map(|(name, b)| (name.as_str(), b.as_ref()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Box<dyn Bundle>)> {
        self.bundles.iter_mut().map(|(name, b)| (name.as_str(), b))
    }

    /// Mutable iteration in reverse activation order
    pub fn iter_mut_rev(&mut self) -> impl Iterator<Item = (&str, &mut Box<dyn Bundle>)> {
        self.bundles.iter_mut().rev().map(|(name, b)| (name.as_str(), b))
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
