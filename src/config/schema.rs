//! Configuration schema types
//!
//! This module defines the configuration structure for ganesha-exports.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main ganesha-exports configuration
///
/// This is the root configuration structure that maps to the TOML file.
/// Every section is optional; omitted sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GaneshaExportsConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// NFS-Ganesha gateway settings
    #[serde(default)]
    pub ganesha: GaneshaConfig,

    /// Remote gateway reached over SSH; commands run locally when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GaneshaExportsConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.ganesha.validate()?;
        if let Some(remote) = &self.remote {
            remote.validate()?;
        }
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// NFS-Ganesha gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaneshaConfig {
    /// Main Ganesha configuration file; exports live in `export.d` next to it
    #[serde(default = "default_config_path")]
    pub config_path: String,

    /// SQLite database holding the export id counter
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Directory of export template fragments; empty selects the built-in template
    #[serde(default = "default_export_template_dir")]
    pub export_template_dir: String,

    /// Service unit restarted when a D-Bus reload fails
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// FSAL name written into the FSAL block of new exports
    #[serde(default = "default_fsal_name")]
    pub fsal_name: String,

    /// Command prefix for privileged commands, e.g. `["sudo", "-n"]`
    #[serde(default)]
    pub root_helper: Vec<String>,

    /// Seed of the export id counter; the first id allocated is one above it
    #[serde(default = "default_starting_export_id")]
    pub starting_export_id: i64,
}

impl GaneshaConfig {
    fn validate(&self) -> Result<(), String> {
        if self.config_path.is_empty() {
            return Err("ganesha.config_path cannot be empty".to_string());
        }
        if !Path::new(&self.config_path).is_absolute() {
            return Err(format!(
                "ganesha.config_path must be absolute, got '{}'",
                self.config_path
            ));
        }
        if self.db_path.is_empty() {
            return Err("ganesha.db_path cannot be empty".to_string());
        }
        if self.service_name.is_empty() {
            return Err("ganesha.service_name cannot be empty".to_string());
        }
        if self.fsal_name.is_empty() {
            return Err("ganesha.fsal_name cannot be empty".to_string());
        }
        if self.starting_export_id < 0 {
            return Err(format!(
                "ganesha.starting_export_id must be >= 0, got {}",
                self.starting_export_id
            ));
        }
        if self.root_helper.iter().any(String::is_empty) {
            return Err("ganesha.root_helper cannot contain empty words".to_string());
        }
        Ok(())
    }

    /// Template directory, if one is configured
    pub fn template_dir(&self) -> Option<&Path> {
        if self.export_template_dir.is_empty() {
            None
        } else {
            Some(Path::new(&self.export_template_dir))
        }
    }
}

impl Default for GaneshaConfig {
    fn default() -> Self {
        Self {
            config_path: default_config_path(),
            db_path: default_db_path(),
            export_template_dir: default_export_template_dir(),
            service_name: default_service_name(),
            fsal_name: default_fsal_name(),
            root_helper: Vec::new(),
            starting_export_id: default_starting_export_id(),
        }
    }
}

/// Remote gateway reached over SSH
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Gateway host name or address
    pub host: String,

    /// SSH port
    #[serde(default = "default_ssh_port")]
    pub port: u16,

    /// Login user on the gateway
    pub login: String,

    /// Private key file; the SSH agent is used when absent
    #[serde(default)]
    pub private_key: Option<String>,
}

impl RemoteConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("remote.host cannot be empty".to_string());
        }
        if self.login.is_empty() {
            return Err("remote.login cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("remote.port must be > 0".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rotated files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory of the log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_config_path() -> String {
    "/etc/ganesha/ganesha.conf".to_string()
}

fn default_db_path() -> String {
    "/var/lib/ganesha-exports/ganesha-exports.db".to_string()
}

fn default_export_template_dir() -> String {
    "/etc/ganesha-exports/export-templ.d".to_string()
}

fn default_service_name() -> String {
    "nfs-ganesha".to_string()
}

fn default_fsal_name() -> String {
    "VFS".to_string()
}

fn default_starting_export_id() -> i64 {
    100
}

fn default_ssh_port() -> u16 {
    22
}

fn default_local_path() -> String {
    "/var/log/ganesha-exports".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
