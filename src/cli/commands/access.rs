//! Access commands implementation
//!
//! This module implements the `allow-access` and `deny-access` commands,
//! which grant or revoke one access rule on a share by publishing or
//! retracting the export `<share>_<access-id>`.

use crate::cli::context::GatewayContext;
use crate::cli::{EXIT_FAILURE, EXIT_FATAL, EXIT_SUCCESS};
use crate::domain::AccessRule;
use crate::domain::access::IP_ACCESS;
use clap::Args;

/// Arguments for the allow-access command
#[derive(Args, Debug)]
pub struct AllowAccessArgs {
    /// Share name
    pub share: String,

    /// Access rule id
    pub access_id: String,

    /// Clients granted access (address, CIDR or comma separated list)
    pub access_to: String,

    /// Directory the share lives in
    #[arg(long, default_value = "/exports")]
    pub base_path: String,

    /// Access type; only `ip` can be expressed as an export
    #[arg(long, default_value = IP_ACCESS)]
    pub access_type: String,
}

impl AllowAccessArgs {
    /// Execute the allow-access command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(share = %self.share, access_id = %self.access_id, "Starting allow-access command");

        let context = match GatewayContext::load(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let helper = match context.export_helper().await {
            Ok(h) => h,
            Err(e) => {
                println!("❌ Failed to load the export template");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };
        context.prepare().await?;

        let access = AccessRule {
            id: self.access_id.clone(),
            access_type: self.access_type.clone(),
            access_to: self.access_to.clone(),
        };

        match helper.allow_access(&self.base_path, &self.share, &access).await {
            Ok(published) => {
                println!(
                    "✅ Access {} granted to {} on {} (export {}, Export_Id {})",
                    access.id, access.access_to, self.share, published.name, published.export_id
                );
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to allow access {} on {}", access.id, self.share);
                println!("   Error: {e}");
                Ok(EXIT_FAILURE)
            }
        }
    }
}

/// Arguments for the deny-access command
#[derive(Args, Debug)]
pub struct DenyAccessArgs {
    /// Share name
    pub share: String,

    /// Access rule id
    pub access_id: String,

    /// Directory the share lives in
    #[arg(long, default_value = "/exports")]
    pub base_path: String,
}

impl DenyAccessArgs {
    /// Execute the deny-access command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(share = %self.share, access_id = %self.access_id, "Starting deny-access command");

        let context = match GatewayContext::load(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };
        let helper = context.export_helper().await?;

        // only the id matters for revocation
        let access = AccessRule::ip(self.access_id.clone(), String::new());
        match helper.deny_access(&self.base_path, &self.share, &access).await {
            Ok(()) => {
                println!("✅ Access {} revoked on {}", access.id, self.share);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to deny access {} on {}", access.id, self.share);
                println!("   Error: {e}");
                Ok(EXIT_FAILURE)
            }
        }
    }
}
