//! Publish command implementation
//!
//! This module implements the `publish` command, which publishes an export
//! definition read from a local file.

use crate::cli::context::{export_name, GatewayContext};
use crate::cli::{EXIT_FAILURE, EXIT_FATAL, EXIT_SUCCESS};
use crate::core::codec;
use crate::domain::ExportError;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Export name; the file is stored as `<name>.conf`
    pub name: String,

    /// Local file holding the export in Ganesha or JSON syntax
    pub file: PathBuf,
}

impl PublishArgs {
    /// Execute the publish command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(export_name = %self.name, file = %self.file.display(), "Starting publish command");

        let context = match GatewayContext::load(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let name = export_name(&self.name)?;
        let text = std::fs::read_to_string(&self.file)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", self.file.display()))?;
        let document = match codec::parse(&text) {
            Ok(d) => d,
            Err(e) => {
                println!("❌ {} is not a valid export definition", self.file.display());
                println!("   Error: {e}");
                return Ok(EXIT_FAILURE);
            }
        };

        context.prepare().await?;

        match context.manager.publish(&name, document).await {
            Ok(published) => {
                println!(
                    "✅ Published export {} (Export_Id {})",
                    published.name, published.export_id
                );
                println!("   File: {}", published.path.display());
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to publish export {name}");
                println!("   Error: {e}");
                if matches!(e, ExportError::AlreadyExists(_)) {
                    println!("   Retract it first to replace its definition");
                }
                Ok(EXIT_FAILURE)
            }
        }
    }
}
