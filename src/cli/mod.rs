//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for ganesha-exports using clap.

pub mod commands;
pub mod context;

use clap::{Parser, Subcommand};

/// The command completed
pub const EXIT_SUCCESS: i32 = 0;

/// The requested operation failed
pub const EXIT_FAILURE: i32 = 1;

/// The tool could not be set up (configuration, logging)
pub const EXIT_FATAL: i32 = 5;

/// ganesha-exports - Transactional export management for NFS-Ganesha
#[derive(Parser, Debug)]
#[command(name = "ganesha-exports")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "ganesha-exports.toml",
        env = "GANESHA_EXPORTS_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GANESHA_EXPORTS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish an export definition from a file
    Publish(commands::publish::PublishArgs),

    /// Remove an export from the live service and from disk
    Retract(commands::retract::RetractArgs),

    /// Grant an IP access rule on a share
    AllowAccess(commands::access::AllowAccessArgs),

    /// Revoke an access rule on a share
    DenyAccess(commands::access::DenyAccessArgs),

    /// Regenerate INDEX.conf from the export files
    RebuildIndex(commands::index::RebuildIndexArgs),

    /// List stored exports
    List(commands::list::ListArgs),

    /// Print a stored export
    Show(commands::show::ShowArgs),

    /// Convert a local file between Ganesha syntax and JSON
    Render(commands::show::RenderArgs),

    /// Make the live service reload its configuration
    Reload(commands::reload::ReloadArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}
