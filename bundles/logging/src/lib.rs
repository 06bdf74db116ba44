//! Bundle that installs the application's `tracing` subscriber.
//!
//! ```yaml
//! logging:
//!   level: debug     # any EnvFilter directive, RUST_LOG wins when set
//!   format: json     # plain | json
//! ```
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use nano_core::container::{Container, ContainerBuilder, Extension};
use nano_core::{Bundle, BundleFactories, KernelError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Identifier to use in `config/bundles.*`
pub const IDENTIFIER: &str = "logging";
pub const ALIAS: &str = "logging";
pub const LEVEL_PARAMETER: &str = "logging.level";
pub const FORMAT_PARAMETER: &str = "logging.format";

const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Plain => write!(f, "plain"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// One `logging` block; unset fields keep the value of earlier blocks.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LoggingBlock {
    level: Option<String>,
    format: Option<LogFormat>,
}

/// Effective logging settings after merging every block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingSettings {
    /// Merge configuration blocks in order; later blocks win field by field.
    pub fn from_configs(configs: &[Value]) -> Result<Self> {
        let mut settings = Self::default();
        for config in configs.iter().filter(|c| !c.is_null()) {
            let block: LoggingBlock = serde_json::from_value(config.clone())
                .map_err(|e| {
                    KernelError::Other(format!("Invalid '{}' configuration: {}", ALIAS, e))
                })?;
            if let Some(level) = block.level {
                settings.level = level;
            }
            if let Some(format) = block.format {
                settings.format = format;
            }
        }
        Ok(settings)
    }

    /// Settings as stored in a booted container; defaults for anything missing.
    pub fn from_container(container: &Container) -> Self {
        let defaults = Self::default();
        Self {
            level: container.parameter_as(LEVEL_PARAMETER).unwrap_or(defaults.level),
            format: container.parameter_as(FORMAT_PARAMETER).unwrap_or(defaults.format),
        }
    }

    /// `RUST_LOG` when set, the configured level otherwise.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return Ok(EnvFilter::from_default_env());
        }
        EnvFilter::try_new(&self.level)
            .map_err(|e| KernelError::Other(format!("Invalid log level '{}': {}", self.level, e)))
    }
}

pub struct LoggingExtension;

impl Extension for LoggingExtension {
    fn alias(&self) -> &str {
        ALIAS
    }

    fn load(&self, configs: &[Value], container: &mut ContainerBuilder) -> Result<()> {
        let settings = LoggingSettings::from_configs(configs)?;
        // Fail at build time rather than at boot
        settings.env_filter()?;
        container.set_parameter(LEVEL_PARAMETER, settings.level)?;
        container.set_parameter(FORMAT_PARAMETER, settings.format.to_string())?;
        Ok(())
    }
}

#[derive(Default)]
pub struct LoggingBundle {
    container: Option<Arc<Container>>,
}

impl Bundle for LoggingBundle {
    fn name(&self) -> &str {
        "LoggingBundle"
    }

    fn container_extension(&self) -> Option<Box<dyn Extension>> {
        Some(Box::new(LoggingExtension))
    }

    fn set_container(&mut self, container: Arc<Container>) {
        self.container = Some(container);
    }

    fn boot(&mut self) -> Result<()> {
        let settings = self
            .container
            .as_deref()
            .map(LoggingSettings::from_container)
            .unwrap_or_default();
        install_subscriber(&settings)?;
        tracing::info!(filter = %settings.level, format = %settings.format, "Logging initialized");
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        debug!("Logging bundle shut down");
        self.container = None;
        Ok(())
    }
}

/// Install the global subscriber, writing to stderr. An already installed
/// subscriber is kept.
pub fn install_subscriber(settings: &LoggingSettings) -> Result<()> {
    let filter = settings.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match settings.format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = installed {
        warn!("Keeping the existing log subscriber: {}", e);
    }
    Ok(())
}

/// Register the bundle factory under [`IDENTIFIER`].
pub fn register(factories: &mut BundleFactories) {
    factories.register(IDENTIFIER, || Box::new(LoggingBundle::default()) as Box<dyn Bundle>);
}
