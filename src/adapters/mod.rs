//! External system integrations for ganesha-exports.
//!
//! This module provides the collaborators the export engine drives:
//!
//! - [`traits`] - The [`CommandRunner`], [`CounterStore`] and [`ControlChannel`] interfaces
//! - [`command`] - Local and SSH command runners
//! - [`sqlite`] - Durable counters kept in an SQLite file through the `sqlite3` tool
//! - [`dbus`] - NFS-Ganesha `ExportMgr` and admin calls through `dbus-send`
//! - [`memory`] - In-process counter store and control channel
//! - [`factory`] - Builds the collaborators from configuration
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external processes and
//! daemons behind traits. Every command-backed adapter takes an
//! `Arc<dyn CommandRunner>`, so the same code drives a local gateway or a
//! remote one over SSH.
//!
//! ```rust,no_run
//! use ganesha_exports::adapters::{CommandRunner, DbusControlChannel, LocalCommandRunner, SqliteCounterStore};
//! use std::sync::Arc;
//!
//! let runner: Arc<dyn CommandRunner> =
//!     Arc::new(LocalCommandRunner::with_root_helper(vec!["sudo".to_string()]));
//! let counters = SqliteCounterStore::new(runner.clone(), "/var/lib/ganesha/exports.db");
//! let channel = DbusControlChannel::new(runner);
//! ```

pub mod command;
pub mod dbus;
pub mod factory;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use command::{LocalCommandRunner, SshCommandRunner};
pub use dbus::{DbusControlChannel, ReloadOutcome, ServiceReloader};
pub use memory::{MemoryControlChannel, MemoryCounterStore};
pub use sqlite::SqliteCounterStore;
pub use traits::{CommandOutput, CommandRunner, ControlChannel, CounterStore, RunOptions};
