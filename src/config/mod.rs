//! Configuration management for ganesha-exports.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! ganesha-exports uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Default values for every setting
//! - `GANESHA_EXPORTS_<SECTION>_<KEY>` environment overrides
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`GaneshaConfig`] - Gateway paths, service name, FSAL, root helper
//! - [`RemoteConfig`] - Optional SSH target for a remote gateway
//! - [`LoggingConfig`] - Log file settings
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [ganesha]
//! config_path = "/etc/ganesha/ganesha.conf"
//! db_path = "/var/lib/ganesha-exports/ganesha-exports.db"
//! export_template_dir = "/etc/ganesha-exports/export-templ.d"
//! service_name = "nfs-ganesha"
//! fsal_name = "VFS"
//! root_helper = ["sudo", "-n"]
//!
//! [remote]
//! host = "gw1.example.com"
//! login = "manila"
//! private_key = "${GANESHA_GATEWAY_KEY}"
//!
//! [logging]
//! local_enabled = true
//! local_path = "/var/log/ganesha-exports"
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use ganesha_exports::config::load_config;
//!
//! # fn example() {
//! match load_config("ganesha-exports.toml") {
//!     Ok(config) => println!("Gateway config: {}", config.ganesha.config_path),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_str};
pub use schema::{ApplicationConfig, GaneshaConfig, GaneshaExportsConfig, LoggingConfig, RemoteConfig};
