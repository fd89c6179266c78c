//! Export lifecycle
//!
//! This module provides the [`ExportLifecycleManager`], the only component
//! that mutates the export directory, together with the undo log it uses to
//! roll back a partially applied publish.

pub mod manager;
pub mod undo;

pub use manager::{ExportLifecycleManager, PublishedExport};
pub use undo::{UndoAction, UndoLog};
