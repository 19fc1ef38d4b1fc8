//! memorizer - cache inspection CLI
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use memorizer::cli::{Cli, Commands};
use memorizer::config::{Config, ConfigManager};
use memorizer::error::{MemoError, MemoResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> MemoResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| MemoError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let mut config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(cli.verbose, &config);
    if let Some(ref path) = local_config_path {
        debug!("Found local config: {}", path.display());
    }

    if let Some(state) = cli.state {
        debug!("State file overridden: {}", state.display());
        config.store.path = state;
    }

    // Dispatch to command
    match cli.command {
        Commands::Stats => memorizer::cli::commands::stats(&config).await,
        Commands::List(args) => memorizer::cli::commands::list(args, &config).await,
        Commands::Show(args) => memorizer::cli::commands::show(args, &config).await,
        Commands::Verify => memorizer::cli::commands::verify(&config).await,
        Commands::Config(args) => {
            memorizer::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("memorizer=warn"),
        1 => EnvFilter::new("memorizer=info"),
        _ => EnvFilter::new("memorizer=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
