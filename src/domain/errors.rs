//! Domain error types
//!
//! This module defines the error hierarchy for the export engine.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main export engine error type
///
/// This is the primary error type used throughout the crate. Variants map
/// one-to-one onto the failure classes the lifecycle manager reasons about:
/// `publish` rolls back on any of them, `retract` swallows only [`Channel`]
/// failures raised while unregistering the live export.
///
/// [`Channel`]: ExportError::Channel
#[derive(Debug, Error)]
pub enum ExportError {
    /// Malformed configuration text
    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A template placeholder was never filled in
    #[error("Incomplete export block: value {value} of attribute {key} is a stub")]
    IncompleteExport { key: String, value: String },

    /// Requested export name is unknown
    #[error("Export not found: {0}")]
    NotFound(String),

    /// An export file with this name is already published
    #[error("Export already exists: {0}")]
    AlreadyExists(String),

    /// External command exited unsuccessfully (or could not be spawned)
    #[error("Command `{command}` failed with exit code {}: {}", display_code(.exit_code), .stderr.trim())]
    Command {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Live-service control channel failure
    #[error("Control channel error: {0}")]
    Channel(String),

    /// Export id counter is unreachable or returned garbage
    #[error("Export id allocation failed: {0}")]
    Allocation(String),

    /// Unsupported access rule
    #[error("Invalid share access: {0}")]
    InvalidAccess(String),

    /// Export name that cannot be mapped onto a file
    #[error("Invalid export name: {0}")]
    InvalidName(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl ExportError {
    /// Creates a syntax error at the given (1-based) line
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        ExportError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Returns true for the "export does not exist" class
    pub fn is_not_found(&self) -> bool {
        matches!(self, ExportError::NotFound(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = ExportError::syntax(3, "unterminated quoted string");
        assert_eq!(
            err.to_string(),
            "Syntax error at line 3: unterminated quoted string"
        );
    }

    #[test]
    fn test_incomplete_export_display() {
        let err = ExportError::IncompleteExport {
            key: "Path".to_string(),
            value: "@config".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Incomplete export block: value @config of attribute Path is a stub"
        );
    }

    #[test]
    fn test_command_error_display() {
        let err = ExportError::Command {
            command: "rm /etc/ganesha/export.d/x.conf".to_string(),
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "rm: cannot remove: No such file or directory\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command `rm /etc/ganesha/export.d/x.conf` failed with exit code 1: \
             rm: cannot remove: No such file or directory"
        );

        let err = ExportError::Command {
            command: "dbus-send".to_string(),
            exit_code: None,
            stdout: String::new(),
            stderr: "killed".to_string(),
        };
        assert!(err.to_string().contains("exit code none"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(ExportError::NotFound("share1_acc1".to_string()).is_not_found());
        assert!(!ExportError::Channel("down".to_string()).is_not_found());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: ExportError = io_err.into();
        assert!(matches!(err, ExportError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: ExportError = json_err.into();
        assert!(matches!(err, ExportError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: ExportError = toml_err.into();
        assert!(matches!(err, ExportError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_export_error_implements_std_error() {
        let err = ExportError::Allocation("counter store unreachable".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
