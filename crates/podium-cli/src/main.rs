use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use podium_cli::commands::{init, run};
use podium_cli::{Cli, Commands, Config};

/// Load configuration from the default locations plus an optional file.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Run {
            speaker_min,
            discussant_min,
            export_dir,
        }) => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(minutes) = speaker_min {
                config.thresholds.speaker_minutes = *minutes;
            }
            if let Some(minutes) = discussant_min {
                config.thresholds.discussant_minutes = *minutes;
            }
            if let Some(dir) = export_dir {
                config.export_dir.clone_from(dir);
            }
            run::run(&config)?;
        }
        Some(Commands::Init) => {
            init::run()?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
