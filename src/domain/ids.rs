//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for export identifiers.
//! [`ExportName`] is the opaque name an export file is stored under,
//! [`ExportId`] is the numeric id the live service knows the export by.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the aggregate index file (without the `.conf` suffix)
pub const INDEX_NAME: &str = "INDEX";

/// Export name newtype wrapper
///
/// Names map directly onto `<export_dir>/<name>.conf`, so they must be a
/// single path component without whitespace, and must not collide with the
/// index file.
///
/// # Examples
///
/// ```
/// use ganesha_exports::domain::ids::ExportName;
/// use std::str::FromStr;
///
/// let name = ExportName::from_str("share1_acc1").unwrap();
/// assert_eq!(name.file_name(), "share1_acc1.conf");
/// assert!(ExportName::new("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExportName(String);

impl ExportName {
    /// Creates a new ExportName from a string
    ///
    /// # Arguments
    ///
    /// * `name` - The export name
    ///
    /// # Returns
    ///
    /// Returns `Ok(ExportName)` if the name is usable as a file stem, `Err` otherwise
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.is_empty() {
            return Err("Export name cannot be empty".to_string());
        }
        if name == INDEX_NAME {
            return Err(format!("Export name '{INDEX_NAME}' is reserved for the index"));
        }
        if name == "." || name == ".." || name.starts_with('.') {
            return Err(format!("Export name '{name}' cannot start with '.'"));
        }
        if name.chars().any(|c| c == '/' || c.is_whitespace() || c.is_control()) {
            return Err(format!(
                "Export name '{name}' must not contain '/' or whitespace"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the export name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name the export is stored under
    pub fn file_name(&self) -> String {
        format!("{}.conf", self.0)
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ExportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExportName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ExportName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Numeric export identifier
///
/// The live service addresses exports over D-Bus as `uint16`; ids above
/// `u16::MAX` are passed through unchanged and rejected by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExportId(u64);

impl ExportId {
    /// Wraps a raw id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ExportId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
