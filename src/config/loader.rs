//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{GaneshaExportsConfig, RemoteConfig};
use crate::domain::errors::ExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of the environment variables overriding file settings
pub const ENV_PREFIX: &str = "GANESHA_EXPORTS";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into GaneshaExportsConfig
/// 4. Applies environment variable overrides (GANESHA_EXPORTS_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use ganesha_exports::config::loader::load_config;
///
/// let config = load_config("ganesha-exports.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<GaneshaExportsConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ExportError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    load_config_str(&contents)
}

/// Loads configuration from TOML text
///
/// Performs the same substitution, override and validation steps as
/// [`load_config`].
pub fn load_config_str(contents: &str) -> Result<GaneshaExportsConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: GaneshaExportsConfig = toml::from_str(&contents)
        .map_err(|e| ExportError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ExportError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_var(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn parse_env<T: std::str::FromStr>(section: &str, key: &str) -> Result<Option<T>> {
    match env_var(section, key) {
        None => Ok(None),
        Some(val) => val.parse().map(Some).map_err(|_| {
            ExportError::Configuration(format!(
                "Invalid value '{val}' for {ENV_PREFIX}_{section}_{key}"
            ))
        }),
    }
}

/// Applies environment variable overrides using the GANESHA_EXPORTS_* prefix
///
/// Environment variables follow the pattern: GANESHA_EXPORTS_<SECTION>_<KEY>
/// For example: GANESHA_EXPORTS_GANESHA_CONFIG_PATH,
/// GANESHA_EXPORTS_REMOTE_HOST. `GANESHA_EXPORTS_GANESHA_ROOT_HELPER` is
/// split on whitespace.
fn apply_env_overrides(config: &mut GaneshaExportsConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Ganesha overrides
    if let Some(val) = env_var("GANESHA", "CONFIG_PATH") {
        config.ganesha.config_path = val;
    }
    if let Some(val) = env_var("GANESHA", "DB_PATH") {
        config.ganesha.db_path = val;
    }
    if let Some(val) = env_var("GANESHA", "EXPORT_TEMPLATE_DIR") {
        config.ganesha.export_template_dir = val;
    }
    if let Some(val) = env_var("GANESHA", "SERVICE_NAME") {
        config.ganesha.service_name = val;
    }
    if let Some(val) = env_var("GANESHA", "FSAL_NAME") {
        config.ganesha.fsal_name = val;
    }
    if let Some(val) = env_var("GANESHA", "ROOT_HELPER") {
        config.ganesha.root_helper = val.split_whitespace().map(str::to_string).collect();
    }
    if let Some(seed) = parse_env("GANESHA", "STARTING_EXPORT_ID")? {
        config.ganesha.starting_export_id = seed;
    }

    // Remote overrides; a host alone is enough to switch to SSH
    if let Some(host) = env_var("REMOTE", "HOST") {
        match config.remote.as_mut() {
            Some(remote) => remote.host = host,
            None => {
                config.remote = Some(RemoteConfig {
                    host,
                    port: 22,
                    login: std::env::var("USER").unwrap_or_default(),
                    private_key: None,
                })
            }
        }
    }
    if let Some(remote) = config.remote.as_mut() {
        if let Some(port) = parse_env("REMOTE", "PORT")? {
            remote.port = port;
        }
        if let Some(val) = env_var("REMOTE", "LOGIN") {
            remote.login = val;
        }
        if let Some(val) = env_var("REMOTE", "PRIVATE_KEY") {
            remote.private_key = Some(val);
        }
    }

    // Logging overrides
    if let Some(enabled) = parse_env("LOGGING", "LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("GE_LOADER_TEST_VAR", "test_value");
        let input = "login = \"${GE_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "login = \"test_value\"\n");
        std::env::remove_var("GE_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("GE_LOADER_MISSING_VAR");
        let input = "login = \"${GE_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("GE_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("GE_LOADER_COMMENTED_VAR");
        let input = "# login = \"${GE_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent.toml").is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[ganesha]
config_path = "/etc/ganesha/ganesha.conf"
db_path = "/var/lib/ganesha/exports.db"
root_helper = ["sudo", "-n"]
fsal_name = "GLUSTER"

[remote]
host = "gw1.example.com"
login = "manila"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.ganesha.root_helper, vec!["sudo", "-n"]);
        assert_eq!(config.ganesha.fsal_name, "GLUSTER");
        let remote = config.remote.unwrap();
        assert_eq!(remote.host, "gw1.example.com");
        assert_eq!(remote.port, 22);
    }

    #[test]
    fn test_load_config_invalid_values() {
        let result = load_config_str("[ganesha]\nconfig_path = \"relative.conf\"\n");
        assert!(matches!(result, Err(ExportError::Configuration(_))));
    }

    #[test]
    fn test_load_config_bad_toml() {
        assert!(load_config_str("[ganesha\n").is_err());
    }
}
