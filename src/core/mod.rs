//! Core business logic for ganesha-exports.
//!
//! This module contains the export configuration engine.
//!
//! # Modules
//!
//! - [`codec`] - Parse and serialize the Ganesha configuration language
//! - [`store`] - Per-export files and the aggregate index
//! - [`allocator`] - Unique export ids from a durable counter
//! - [`lifecycle`] - Transactional publish and retract with rollback
//! - [`template`] - Export templates and the built-in default
//! - [`access`] - Share access rules expressed as exports
//!
//! # Publish Workflow
//!
//! 1. **Assign id**: Keep the document's `Export_Id` or allocate a new one
//! 2. **Write**: Store the export file atomically
//! 3. **Register**: Ask the live service to load the export
//! 4. **Index**: Regenerate `INDEX.conf`
//!
//! Any failure undoes the completed steps in reverse order.
//!
//! # Example
//!
//! ```rust,no_run
//! use ganesha_exports::adapters::{LocalCommandRunner, MemoryControlChannel, MemoryCounterStore};
//! use ganesha_exports::core::allocator::ExportIdAllocator;
//! use ganesha_exports::core::codec;
//! use ganesha_exports::core::lifecycle::ExportLifecycleManager;
//! use ganesha_exports::core::store::ExportFileStore;
//! use ganesha_exports::domain::ExportName;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(ExportFileStore::for_ganesha_config(
//!     Arc::new(LocalCommandRunner::new()),
//!     "/etc/ganesha/ganesha.conf",
//! ));
//! let allocator = Arc::new(ExportIdAllocator::new(Arc::new(MemoryCounterStore::new())));
//! let manager = ExportLifecycleManager::new(store, allocator, Arc::new(MemoryControlChannel::new()));
//!
//! let document = codec::parse("EXPORT { Path = /exports/share1; Pseudo = /share1; }")?;
//! let published = manager.publish(&ExportName::new("share1")?, document).await?;
//! println!("Export {} published as id {}", published.name, published.export_id);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod allocator;
pub mod codec;
pub mod lifecycle;
pub mod store;
pub mod template;
