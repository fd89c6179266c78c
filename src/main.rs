// ganesha-exports - Transactional export management for NFS-Ganesha
// Copyright (c) 2025 ganesha-exports Contributors
// Licensed under the MIT License

use clap::Parser;
use ganesha_exports::cli::{Cli, Commands, EXIT_FATAL};
use ganesha_exports::config::{load_config, LoggingConfig};
use ganesha_exports::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the configuration file when it can be read;
    // validate-config reports configuration problems itself
    let file_logging = load_config(&cli.config)
        .map(|config| (config.application.log_level, config.logging))
        .ok();
    let (config_level, logging_config) =
        file_logging.unwrap_or_else(|| ("info".to_string(), LoggingConfig::default()));
    let log_level = cli.log_level.clone().unwrap_or(config_level);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "ganesha-exports - Transactional export management for NFS-Ganesha"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors, so flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Publish(args) => args.execute(&cli.config).await,
        Commands::Retract(args) => args.execute(&cli.config).await,
        Commands::AllowAccess(args) => args.execute(&cli.config).await,
        Commands::DenyAccess(args) => args.execute(&cli.config).await,
        Commands::RebuildIndex(args) => args.execute(&cli.config).await,
        Commands::List(args) => args.execute(&cli.config).await,
        Commands::Show(args) => args.execute(&cli.config).await,
        Commands::Render(args) => args.execute().await,
        Commands::Reload(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
    }
}
