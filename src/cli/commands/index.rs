//! Rebuild-index command implementation

use crate::cli::context::GatewayContext;
use crate::cli::{EXIT_FAILURE, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;

/// Arguments for the rebuild-index command
#[derive(Args, Debug)]
pub struct RebuildIndexArgs {}

impl RebuildIndexArgs {
    /// Execute the rebuild-index command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let context = match GatewayContext::load(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        context.prepare().await?;
        match context.store.rebuild_index().await {
            Ok(()) => {
                println!("✅ Index rebuilt: {}", context.store.index_path().display());
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to rebuild index");
                println!("   Error: {e}");
                Ok(EXIT_FAILURE)
            }
        }
    }
}
