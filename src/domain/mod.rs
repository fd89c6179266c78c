//! Domain models and types for the export engine.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ExportName`], [`ExportId`])
//! - **Access rules** ([`AccessRule`])
//! - **Error types** ([`ExportError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ExportError>`]:
//!
//! ```rust
//! use ganesha_exports::domain::{ExportError, ExportName, Result};
//!
//! fn example() -> Result<ExportName> {
//!     ExportName::new("share1_acc1").map_err(ExportError::InvalidName)
//! }
//! ```

pub mod access;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use access::AccessRule;
pub use errors::ExportError;
pub use ids::{ExportId, ExportName, INDEX_NAME};
pub use result::Result;
