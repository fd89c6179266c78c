//! Retract command implementation

use crate::cli::context::{export_name, GatewayContext};
use crate::cli::{EXIT_FAILURE, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;

/// Arguments for the retract command
#[derive(Args, Debug)]
pub struct RetractArgs {
    /// Export name to remove
    pub name: String,
}

impl RetractArgs {
    /// Execute the retract command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(export_name = %self.name, "Starting retract command");

        let context = match GatewayContext::load(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let name = export_name(&self.name)?;
        match context.manager.retract(&name).await {
            Ok(()) => {
                println!("✅ Export {name} retracted");
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to retract export {name}");
                println!("   Error: {e}");
                Ok(EXIT_FAILURE)
            }
        }
    }
}
