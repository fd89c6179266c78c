//! Compensating actions for a partially applied publish
//!
//! Each forward step of a publish records the action that reverses it. On
//! failure the log is replayed last-in-first-out; on success it is dropped.

use crate::adapters::traits::ControlChannel;
use crate::core::store::ExportFileStore;
use crate::domain::{ExportId, ExportName};
use std::fmt;

/// One reversible step of a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// Delete the export file that was written
    DeleteFile(ExportName),

    /// Drop the export from the live service again
    UnregisterLive(ExportId),
}

impl fmt::Display for UndoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndoAction::DeleteFile(name) => write!(f, "delete export file {name}"),
            UndoAction::UnregisterLive(id) => write!(f, "unregister live export {id}"),
        }
    }
}

/// Ordered record of the steps a publish has completed so far
#[derive(Debug, Default)]
pub struct UndoLog {
    actions: Vec<UndoAction>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the compensation for a step that just succeeded
    pub fn push(&mut self, action: UndoAction) {
        self.actions.push(action);
    }

    /// Recorded actions in the order they were pushed
    pub fn actions(&self) -> &[UndoAction] {
        &self.actions
    }

    /// Forget every recorded action; the publish is complete
    pub fn commit(self) {
        tracing::trace!(steps = self.actions.len(), "Publish committed");
    }

    /// Replay the recorded actions newest first
    ///
    /// Every action is attempted even when an earlier one fails. Failures
    /// are logged and never returned; the caller reports the error that
    /// triggered the rollback.
    ///
    /// # Returns
    ///
    /// The number of actions that failed.
    pub async fn rollback(self, store: &ExportFileStore, channel: &dyn ControlChannel) -> usize {
        let mut failures = 0;
        for action in self.actions.into_iter().rev() {
            let result = match &action {
                UndoAction::DeleteFile(name) => store.remove_export_file(name).await,
                UndoAction::UnregisterLive(id) => channel.remove_export(*id).await,
            };
            match result {
                Ok(()) => tracing::debug!(action = %action, "Rolled back"),
                Err(e) => {
                    failures += 1;
                    crate::log_rollback_failure!(action, e);
                }
            }
        }
        failures
    }
}
