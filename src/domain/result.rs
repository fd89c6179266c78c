//! Result type alias for the export engine
//!
//! This module provides a convenient Result type alias that uses ExportError
//! as the error type.

use super::errors::ExportError;

/// Result type alias for export engine operations
///
/// # Examples
///
/// ```
/// use ganesha_exports::domain::result::Result;
/// use ganesha_exports::domain::errors::ExportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ExportError::NotFound("share1_acc1".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ExportError>;
