//! Collaborator traits
//!
//! This module defines the interfaces the export engine drives. All three
//! are blocking boundaries (process execution, counter storage, the live
//! service's control channel) and are therefore async. The engine imposes no
//! timeouts of its own; implementations or callers do.

use crate::domain::{ExportId, Result};
use async_trait::async_trait;
use std::path::Path;

/// Options for a single command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Run through the configured root helper
    pub run_as_root: bool,

    /// Bytes fed to the command's stdin
    pub stdin: Option<Vec<u8>>,
}

impl Default for RunOptions {
    /// Commands run as root unless stated otherwise
    fn default() -> Self {
        Self::as_root()
    }
}

impl RunOptions {
    /// Privileged invocation without stdin
    pub fn as_root() -> Self {
        Self {
            run_as_root: true,
            stdin: None,
        }
    }

    /// Unprivileged invocation without stdin
    pub fn unprivileged() -> Self {
        Self {
            run_as_root: false,
            stdin: None,
        }
    }

    /// Feeds `payload` to the command's stdin
    pub fn with_stdin(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(payload.into());
        self
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes command lines, locally or on a remote gateway
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv` to completion
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Command`](crate::domain::ExportError::Command)
    /// carrying exit code, stdout and stderr when the command exits non-zero
    /// or cannot be started.
    async fn run(&self, argv: &[&str], options: RunOptions) -> Result<CommandOutput>;
}

/// Durable atomic-increment counters keyed by name
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Create counter `key` with value `seed` unless it already exists
    ///
    /// Must be safe to call repeatedly and concurrently; an existing counter
    /// is never reset.
    async fn init_if_absent(&self, key: &str, seed: i64) -> Result<()>;

    /// Increment counter `key` and return the new value
    async fn increment_and_get(&self, key: &str) -> Result<i64>;
}

/// Control channel into the running NFS service
#[async_trait]
pub trait ControlChannel: Send + Sync {
    /// Ask the service to load the export defined in `config_path`
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Channel`](crate::domain::ExportError::Channel)
    /// if the service cannot be reached or refuses the export.
    async fn add_export(&self, config_path: &Path, export_id: ExportId) -> Result<()>;

    /// Ask the service to drop the export with `export_id`
    async fn remove_export(&self, export_id: ExportId) -> Result<()>;
}
