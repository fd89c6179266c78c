// ganesha-exports - Transactional export management for NFS-Ganesha
// Copyright (c) 2025 ganesha-exports Contributors
// Licensed under the MIT License

//! # ganesha-exports - Transactional export management for NFS-Ganesha
//!
//! NFS-Ganesha has no API for changing its set of exports. Exports are
//! defined in a brace-structured configuration file, the running daemon can
//! be asked over D-Bus to load or drop a single export, and anything else
//! requires a reload or restart. This crate turns that mechanism into
//! something that behaves like a transactional API.
//!
//! ## Overview
//!
//! This library provides:
//! - **Parsing and writing** the Ganesha configuration language
//! - **Storing** one file per export with atomic writes, plus a generated index
//! - **Allocating** unique export ids from a durable counter
//! - **Publishing and retracting** exports with rollback on failure
//! - **Granting** share access rules as per-rule exports
//!
//! ## Architecture
//!
//! The crate follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export engine (codec, store, allocator, lifecycle, templates, access)
//! - [`adapters`] - Command execution, SQLite counters, D-Bus control channel
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ganesha_exports::adapters::{DbusControlChannel, LocalCommandRunner, SqliteCounterStore};
//! use ganesha_exports::core::allocator::ExportIdAllocator;
//! use ganesha_exports::core::codec;
//! use ganesha_exports::core::lifecycle::ExportLifecycleManager;
//! use ganesha_exports::core::store::ExportFileStore;
//! use ganesha_exports::domain::ExportName;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Arc::new(LocalCommandRunner::with_root_helper(vec!["sudo".into()]));
//!     let store = Arc::new(ExportFileStore::for_ganesha_config(
//!         runner.clone(),
//!         "/etc/ganesha/ganesha.conf",
//!     ));
//!     let counters = Arc::new(SqliteCounterStore::new(
//!         runner.clone(),
//!         "/var/lib/ganesha-exports/ganesha-exports.db",
//!     ));
//!     let manager = ExportLifecycleManager::new(
//!         store,
//!         Arc::new(ExportIdAllocator::new(counters)),
//!         Arc::new(DbusControlChannel::new(runner)),
//!     );
//!
//!     let document = codec::parse(
//!         "EXPORT { Path = /exports/share1; Pseudo = /exports/share1_acc1; Tag = acc1; \
//!          CLIENT { Clients = 10.0.0.5; } FSAL { Name = VFS; } }",
//!     )?;
//!     let published = manager.publish(&ExportName::new("share1_acc1")?, document).await?;
//!     println!("Published with Export_Id {}", published.export_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Consistency
//!
//! After every publish or retract the export files on disk, the exports
//! loaded by the daemon and `INDEX.conf` agree:
//!
//! - A failed publish undoes the steps it completed, newest first, and
//!   returns the original error
//! - A retract always removes the file and rebuilds the index, even when
//!   the daemon cannot be told to drop the export
//!
//! ## Error Handling
//!
//! All library operations return [`domain::Result`], whose error type is
//! [`domain::ExportError`]:
//!
//! ```rust
//! use ganesha_exports::core::codec;
//! use ganesha_exports::domain::ExportError;
//!
//! let err = codec::parse("EXPORT { Path = \"/unterminated; }").unwrap_err();
//! assert!(matches!(err, ExportError::Syntax { line: 1, .. }));
//! ```
//!
//! ## Logging
//!
//! The crate logs through `tracing` with structured fields such as
//! `export_name`, `export_id` and `path`; see [`logging::init_logging`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
