//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output filtered by level
//! - JSON-formatted log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use ganesha_exports::logging::init_logging;
//! use ganesha_exports::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a publish operation
///
/// # Example
///
/// ```no_run
/// use ganesha_exports::log_publish_start;
/// use ganesha_exports::domain::ExportName;
///
/// let name = ExportName::new("share1_acc1").unwrap();
/// log_publish_start!(&name);
/// ```
#[macro_export]
macro_rules! log_publish_start {
    ($export_name:expr) => {
        tracing::info!(export_name = %$export_name, "Publishing export");
    };
}

/// Log the completion of a publish operation
///
/// # Example
///
/// ```no_run
/// use ganesha_exports::log_publish_complete;
/// use ganesha_exports::domain::{ExportId, ExportName};
/// use std::time::Duration;
///
/// let name = ExportName::new("share1_acc1").unwrap();
/// log_publish_complete!(&name, ExportId::new(101), Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_publish_complete {
    ($export_name:expr, $export_id:expr, $duration:expr) => {
        tracing::info!(
            export_name = %$export_name,
            export_id = %$export_id,
            duration_ms = $duration.as_millis() as u64,
            "Export published"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use ganesha_exports::log_error_with_context;
/// use ganesha_exports::domain::ExportError;
///
/// let error = ExportError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a compensating action that could not be carried out
///
/// # Example
///
/// ```no_run
/// use ganesha_exports::log_rollback_failure;
///
/// log_rollback_failure!("unregister live export 101", "service unreachable");
/// ```
#[macro_export]
macro_rules! log_rollback_failure {
    ($action:expr, $error:expr) => {
        tracing::error!(
            action = %$action,
            error = %$error,
            "Rollback step failed"
        );
    };
}
