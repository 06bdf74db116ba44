mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::{error, warn};
use nano_core::{Kernel, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, CliHooks, Commands};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.verbose {
        // The logging bundle keeps this subscriber when it boots
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        if let Err(e) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
        {
            warn!("Keeping the existing log subscriber: {}", e);
        }
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let debug = args.debug_mode();
    let hooks = CliHooks {
        project_dir: args.project_dir.clone(),
    };
    let mut kernel = Kernel::with_hooks(args.env.as_str(), debug, hooks);

    match args.command {
        Commands::Boot => {
            kernel.boot()?;
            println!(
                "Kernel booted (environment '{}', debug={})",
                kernel.environment(),
                kernel.is_debug()
            );
            if kernel.bundles().is_empty() {
                println!("  No bundles active.");
            }
            for name in kernel.bundles().names() {
                let identifier = kernel.bundles().identifier_of(name).unwrap_or("?");
                println!("  - {} ({})", name, identifier);
            }
            kernel.shutdown()?;
        }
        Commands::Dirs => {
            println!("project_dir: {}", kernel.project_dir()?.display());
            println!("config_dir:  {}", kernel.config_dir()?.display());
            println!("cache_dir:   {}", kernel.cache_dir()?.display());
            println!("build_dir:   {}", kernel.build_dir()?.display());
            println!("log_dir:     {}", kernel.log_dir()?.display());
        }
        Commands::Container => {
            let container = kernel.container()?;
            println!("Public services:");
            let ids = container.public_service_ids();
            if ids.is_empty() {
                println!("  (none)");
            }
            for id in ids {
                let class = container.definition(id).map(|d| d.class_or(id)).unwrap_or(id);
                println!("  - {} [{}]", id, class);
            }
            println!("Parameters:");
            for (name, value) in container.parameters() {
                println!("  {} = {}", name, value);
            }
            drop(container);
            kernel.shutdown()?;
        }
        Commands::CacheClear => {
            let cache_dir = kernel.cache_dir()?;
            if kernel.clear_cache()? {
                println!(
                    "Cleared cache for environment '{}': {}",
                    kernel.environment(),
                    cache_dir.display()
                );
            } else {
                println!("Nothing to clear at {}", cache_dir.display());
            }
        }
    }
    Ok(())
}
