use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use nano_core::kernel::error::Error;
use nano_core::{BundleFactories, KernelHooks, Result};

const DEFAULT_ENVIRONMENT: &str = "dev";

/// Nano: boot and inspect a nano-kernel project
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Environment name
    #[arg(long, global = true, env = "APP_ENV", default_value = DEFAULT_ENVIRONMENT)]
    pub env: String,

    /// Rebuild the container on every boot [default: on for "dev"]
    #[arg(
        long,
        global = true,
        env = "APP_DEBUG",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        overrides_with = "no_debug"
    )]
    pub debug: Option<bool>,

    /// Reuse the cached container
    #[arg(long, global = true, overrides_with = "debug")]
    pub no_debug: bool,

    /// Project root; detected from the current directory when omitted
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Log kernel activity to stderr before the logging bundle takes over
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Boot the kernel and list the active bundles
    Boot,
    /// Print the kernel directories
    Dirs,
    /// List public services and parameters of the booted container
    Container,
    /// Remove the cache directory of the environment
    CacheClear,
}

impl CliArgs {
    /// `--no-debug`, then `--debug`/`APP_DEBUG`, then on only for `dev`.
    pub fn debug_mode(&self) -> bool {
        if self.no_debug {
            return false;
        }
        self.debug.unwrap_or(self.env == DEFAULT_ENVIRONMENT)
    }
}

/// Kernel hooks for the command line: an explicit project dir or detection
/// from the working directory, plus the bundled factories.
#[derive(Debug, Clone, Default)]
pub struct CliHooks {
    pub project_dir: Option<PathBuf>,
}

impl KernelHooks for CliHooks {
    fn project_dir(&self) -> Option<PathBuf> {
        self.project_dir.clone()
    }

    fn kernel_location(&self) -> Result<PathBuf> {
        std::env::current_dir().map_err(|e| Error::ProjectDirResolution {
            path: PathBuf::from("."),
            reason: format!("cannot read the working directory: {}", e),
        })
    }

    fn bundle_factories(&self) -> BundleFactories {
        let mut factories = BundleFactories::new();
        logging_bundle::register(&mut factories);
        service_mock_bundle::register(&mut factories);
        factories
    }
}
