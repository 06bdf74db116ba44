//! Bundle that lets tests swap out services of a booted container.
//!
//! Services listed under the `service_mock` extension are made public and
//! tagged `service_mock.mockable`, so they survive private service removal and
//! can be replaced at runtime with [`swap`]:
//!
//! ```yaml
//! service_mock:
//!   services: ['app::Mailer', 'app::PaymentGateway']
//! ```
use std::any::Any;
use std::sync::Arc;

use log::{debug, warn};
use nano_core::container::{CompilerPass, Container, ContainerBuilder, Extension, PassType};
use nano_core::{Bundle, BundleFactories, KernelError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Identifier to use in `config/bundles.*`
pub const IDENTIFIER: &str = "service_mock";
/// Extension alias for configuration blocks
pub const ALIAS: &str = "service_mock";
pub const SERVICES_PARAMETER: &str = "service_mock.services";
pub const MOCKABLE_TAG: &str = "service_mock.mockable";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ServiceMockConfig {
    services: Vec<String>,
}

/// Collects the mockable service ids from every configuration block.
pub struct ServiceMockExtension;

impl Extension for ServiceMockExtension {
    fn alias(&self) -> &str {
        ALIAS
    }

    fn load(&self, configs: &[Value], container: &mut ContainerBuilder) -> Result<()> {
        let mut services: Vec<String> = Vec::new();
        for config in configs.iter().filter(|c| !c.is_null()) {
            let config: ServiceMockConfig = serde_json::from_value(config.clone())
                .map_err(|e| {
                    KernelError::Other(format!("Invalid '{}' configuration: {}", ALIAS, e))
                })?;
            for id in config.services {
                if !services.contains(&id) {
                    services.push(id);
                }
            }
        }

        debug!("{} service(s) configured as mockable", services.len());
        container.set_parameter(SERVICES_PARAMETER, services)?;
        container
            .add_compiler_pass(Box::new(ExposeMockableServicesPass), PassType::BeforeRemoving)?;
        Ok(())
    }
}

/// Makes every configured service public and tags it.
pub struct ExposeMockableServicesPass;

impl CompilerPass for ExposeMockableServicesPass {
    fn name(&self) -> &str {
        "service_mock.expose_mockable_services"
    }

    fn process(&self, container: &mut ContainerBuilder) -> Result<()> {
        let ids: Vec<String> = container
            .parameter(SERVICES_PARAMETER)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        for id in ids {
            match container.definition_mut(&id) {
                Some(definition) => {
                    definition.set_public(true).add_tag(MOCKABLE_TAG);
                }
                None => warn!("Service '{}' is configured as mockable but does not exist", id),
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ServiceMockBundle {
    container: Option<Arc<Container>>,
}

impl Bundle for ServiceMockBundle {
    fn name(&self) -> &str {
        "ServiceMockBundle"
    }

    fn container_extension(&self) -> Option<Box<dyn Extension>> {
        Some(Box::new(ServiceMockExtension))
    }

    fn set_container(&mut self, container: Arc<Container>) {
        self.container = Some(container);
    }

    fn boot(&mut self) -> Result<()> {
        if let Some(container) = &self.container {
            debug!("Mockable services: {:?}", mockable_services(container));
        }
        Ok(())
    }
}

/// Register the bundle factory under [`IDENTIFIER`].
pub fn register(factories: &mut BundleFactories) {
    factories.register(IDENTIFIER, || Box::new(ServiceMockBundle::default()) as Box<dyn Bundle>);
}

/// Ids configured as mockable in a booted container.
pub fn mockable_services(container: &Container) -> Vec<String> {
    container.parameter_as(SERVICES_PARAMETER).unwrap_or_default()
}

/// Replace the instance of a mockable service.
pub fn swap<T: Any + Send + Sync>(container: &Container, id: &str, instance: Arc<T>) -> Result<()> {
    if !mockable_services(container).iter().any(|s| s == id) {
        return Err(KernelError::Other(format!(
            "Service '{}' is not mockable; add it to '{}.services'",
            id, ALIAS
        )));
    }
    container.set(id, instance);
    Ok(())
}
