//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file and the export template it points at.

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::load_config;
use crate::core::template::load_export_template;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(EXIT_FAILURE);
            }
        };

        let template = match load_export_template(config.ganesha.template_dir()).await {
            Ok(t) => {
                println!("✅ Export template loaded");
                t
            }
            Err(e) => {
                println!("❌ Export template is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_FAILURE);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Ganesha Config: {}", config.ganesha.config_path);
        println!("  Export Id Database: {}", config.ganesha.db_path);
        println!(
            "  Template Directory: {}",
            config
                .ganesha
                .template_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        );
        println!("  Template Blocks: {:?}", template.keys().collect::<Vec<_>>());
        println!("  Service: {}", config.ganesha.service_name);
        println!("  FSAL: {}", config.ganesha.fsal_name);
        match &config.remote {
            Some(remote) => println!("  Gateway: {}@{}:{}", remote.login, remote.host, remote.port),
            None => println!("  Gateway: local"),
        }
        if !config.ganesha.root_helper.is_empty() {
            println!("  Root Helper: {}", config.ganesha.root_helper.join(" "));
        }
        println!();
        Ok(EXIT_SUCCESS)
    }
}
