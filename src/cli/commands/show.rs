//! Show and render commands implementation
//!
//! `show` prints a stored export, `render` converts a local file between the
//! Ganesha configuration syntax and JSON without touching the gateway.

use crate::cli::context::{export_name, GatewayContext};
use crate::cli::{EXIT_FAILURE, EXIT_FATAL, EXIT_SUCCESS};
use crate::core::codec::{self, ConfigDocument};
use crate::core::store::ExportFileStore;
use crate::domain::ExportName;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Export name
    #[arg(required_unless_present = "path")]
    pub name: Option<String>,

    /// Find the export by its `EXPORT.Path` instead of its name
    #[arg(long, conflicts_with = "name")]
    pub path: Option<String>,

    /// Print as JSON instead of Ganesha syntax
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// File in Ganesha or JSON syntax
    pub file: PathBuf,

    /// Print as JSON instead of Ganesha syntax
    #[arg(long)]
    pub json: bool,
}

fn render(document: &ConfigDocument, json: bool) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(document)? + "\n")
    } else {
        Ok(codec::serialize(document))
    }
}

impl ShowArgs {
    /// Execute the show command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let context = match GatewayContext::load(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let name = match self.resolve_name(&context.store).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                println!("❌ No export serves path {}", self.path.as_deref().unwrap_or_default());
                return Ok(EXIT_FAILURE);
            }
            Err(e) => {
                println!("❌ Failed to look up export");
                println!("   Error: {e}");
                return Ok(EXIT_FAILURE);
            }
        };
        match context.store.read_export_file(&name).await {
            Ok(document) => {
                print!("{}", render(&document, self.json)?);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to read export {name}");
                println!("   Error: {e}");
                Ok(EXIT_FAILURE)
            }
        }
    }
}

impl ShowArgs {
    /// Export named on the command line, or the one serving `--path`
    async fn resolve_name(&self, store: &ExportFileStore) -> anyhow::Result<Option<ExportName>> {
        match (&self.name, &self.path) {
            (Some(name), _) => Ok(Some(export_name(name)?)),
            (None, Some(path)) => Ok(store.find_export_by_path(path).await?),
            (None, None) => anyhow::bail!("either an export name or --path is required"),
        }
    }
}

impl RenderArgs {
    /// Execute the render command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let text = std::fs::read_to_string(&self.file)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", self.file.display()))?;
        match codec::parse(&text) {
            Ok(document) => {
                print!("{}", render(&document, self.json)?);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to parse {}", self.file.display());
                println!("   Error: {e}");
                Ok(EXIT_FAILURE)
            }
        }
    }
}
