//! Export templates
//!
//! An export template is the document every published export starts from.
//! Site administrators provide it as a directory of `.conf` or `.json`
//! fragments which are merged in file-name order, so later files override
//! earlier ones. Values that must be supplied per export are marked with a
//! placeholder (`@config`, `@runtime`); publishing refuses documents that
//! still contain one.

use crate::core::codec::{self, ConfigDocument};
use crate::domain::{ExportError, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Template used when no template directory is configured or it is empty
pub const DEFAULT_EXPORT_TEMPLATE: &str = r#"
EXPORT {
    # Each EXPORT must have a unique Export_Id
    Export_Id = @config;
    # Directory in the exported file system this export is rooted on
    Path = @config;
    # Filesystem abstraction layer
    FSAL {
        Name = @config;
    }
    # Path of the export in the NFSv4 pseudo filesystem
    Pseudo = @config;
    # RPC security flavor, one of none, sys, krb5, krb5i, krb5p
    SecType = sys;
    # Alternative export identifier for NFSv3
    Tag = @config;
    CLIENT {
        # Comma separated list of clients
        Clients = @runtime;
        # One of RW, RO, MDONLY, MDONLY_RO, NONE
        Access_Type = RW;
    }
    # One of None, Root, All
    Squash = None;
}
"#;

/// Returns true for file names that take part in a template
fn is_template_file(file_name: &str) -> bool {
    file_name.ends_with(".conf") || file_name.ends_with(".json")
}

/// Merge every `.conf` and `.json` file in `dir` into one document
///
/// # Arguments
///
/// * `dir` - Template directory
/// * `must_exist` - Whether a missing directory is an error
///
/// # Errors
///
/// Returns [`ExportError::Configuration`] if the directory is missing and
/// `must_exist` is set or cannot be read, and [`ExportError::Syntax`] if a
/// fragment does not parse.
pub async fn load_template_dir(dir: &Path, must_exist: bool) -> Result<ConfigDocument> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound && !must_exist => {
            tracing::debug!(dir = %dir.display(), "Template directory does not exist");
            return Ok(ConfigDocument::new());
        }
        Err(e) => {
            return Err(ExportError::Configuration(format!(
                "Failed to read template directory {}: {e}",
                dir.display()
            )))
        }
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if is_template_file(&file_name) {
            files.push(file_name);
        }
    }
    files.sort();

    let mut template = ConfigDocument::new();
    for file_name in &files {
        let path = dir.join(file_name);
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ExportError::Configuration(format!("Failed to read template {}: {e}", path.display()))
        })?;
        let fragment = codec::parse(&text).map_err(|e| {
            tracing::error!(template = %path.display(), error = %e, "Invalid template fragment");
            e
        })?;
        codec::merge(&mut template, &fragment);
    }

    tracing::debug!(dir = %dir.display(), fragments = files.len(), "Export template loaded");
    Ok(template)
}

/// The built-in export template
pub fn default_export_template() -> Result<ConfigDocument> {
    codec::parse(DEFAULT_EXPORT_TEMPLATE)
}

/// Template from `dir`, or the built-in one when `dir` is unset, missing or empty
pub async fn load_export_template(dir: Option<&Path>) -> Result<ConfigDocument> {
    if let Some(dir) = dir {
        let template = load_template_dir(dir, false).await?;
        if !template.is_empty() {
            return Ok(template);
        }
    }
    default_export_template()
}
