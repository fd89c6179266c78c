//! List command implementation
//!
//! This module implements the `list` command for displaying the exports
//! stored on the gateway.

use crate::cli::context::GatewayContext;
use crate::cli::{EXIT_FAILURE, EXIT_FATAL, EXIT_SUCCESS};
use crate::core::codec::lookup;
use clap::Args;
use serde_json::Value;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only print export names
    #[arg(short, long)]
    pub quiet: bool,
}

fn display_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let context = match GatewayContext::load(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let names = match context.store.list_export_names().await {
            Ok(n) => n,
            Err(e) => {
                println!("❌ Failed to list exports in {}", context.store.export_dir().display());
                println!("   Error: {e}");
                return Ok(EXIT_FAILURE);
            }
        };

        if self.quiet {
            for name in &names {
                println!("{name}");
            }
            return Ok(EXIT_SUCCESS);
        }

        if names.is_empty() {
            println!("No exports found in {}.", context.store.export_dir().display());
            return Ok(EXIT_SUCCESS);
        }

        println!("Found {} export(s):", names.len());
        println!();
        println!("{:<30} {:<10} {:<35} {:<35}", "Name", "Export_Id", "Path", "Pseudo");
        println!("{}", "-".repeat(110));

        for name in &names {
            match context.store.read_export_file(name).await {
                Ok(document) => println!(
                    "{:<30} {:<10} {:<35} {:<35}",
                    name.as_str(),
                    display_field(lookup(&document, &["EXPORT", "Export_Id"])),
                    display_field(lookup(&document, &["EXPORT", "Path"])),
                    display_field(lookup(&document, &["EXPORT", "Pseudo"])),
                ),
                Err(e) => {
                    tracing::warn!(export_name = %name, error = %e, "Unreadable export file");
                    println!("{:<30} ⚠️  {e}", name.as_str());
                }
            }
        }
        println!();
        Ok(EXIT_SUCCESS)
    }
}
