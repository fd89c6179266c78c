//! Reload command implementation

use crate::adapters::ReloadOutcome;
use crate::cli::context::GatewayContext;
use crate::cli::{EXIT_FAILURE, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;

/// Arguments for the reload command
#[derive(Args, Debug)]
pub struct ReloadArgs {}

impl ReloadArgs {
    /// Execute the reload command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let context = match GatewayContext::load(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        match context.reloader().reload().await {
            Ok(ReloadOutcome::Reloaded) => {
                println!("✅ Configuration reloaded");
                Ok(EXIT_SUCCESS)
            }
            Ok(ReloadOutcome::Restarted) => {
                println!(
                    "⚠️  Reload request failed, service {} restarted instead",
                    context.config.ganesha.service_name
                );
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to reload service {}", context.config.ganesha.service_name);
                println!("   Error: {e}");
                Ok(EXIT_FAILURE)
            }
        }
    }
}
