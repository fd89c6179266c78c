//! In-memory collaborators
//!
//! Process-local implementations of [`CounterStore`] and [`ControlChannel`]
//! with switchable failures. Useful when embedding the engine without a
//! live Ganesha daemon, and for exercising rollback paths.

use crate::adapters::traits::{ControlChannel, CounterStore};
use crate::domain::{ExportError, ExportId, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Counter store held in memory
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, i64>>,
    unreachable: AtomicBool,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the store were down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Current value of `key`, if initialized
    pub async fn value(&self, key: &str) -> Option<i64> {
        self.counters.lock().await.get(key).copied()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ExportError::Allocation(
                "counter store unreachable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn init_if_absent(&self, key: &str, seed: i64) -> Result<()> {
        self.check_reachable()?;
        self.counters
            .lock()
            .await
            .entry(key.to_string())
            .or_insert(seed);
        Ok(())
    }

    async fn increment_and_get(&self, key: &str) -> Result<i64> {
        self.check_reachable()?;
        let mut counters = self.counters.lock().await;
        let value = counters
            .get_mut(key)
            .ok_or_else(|| ExportError::Allocation(format!("counter '{key}' does not exist")))?;
        *value += 1;
        Ok(*value)
    }
}

/// Control channel that records live exports in memory
#[derive(Debug, Default)]
pub struct MemoryControlChannel {
    live: Mutex<BTreeMap<ExportId, PathBuf>>,
    fail_add: AtomicBool,
    fail_remove: AtomicBool,
}

impl MemoryControlChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `add_export` fail
    pub fn set_fail_add(&self, fail: bool) {
        self.fail_add.store(fail, Ordering::SeqCst);
    }

    /// Make `remove_export` fail
    pub fn set_fail_remove(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }

    /// Ids currently registered, ascending
    pub async fn live_exports(&self) -> Vec<ExportId> {
        self.live.lock().await.keys().copied().collect()
    }

    /// Config file an id was registered from
    pub async fn config_path(&self, export_id: ExportId) -> Option<PathBuf> {
        self.live.lock().await.get(&export_id).cloned()
    }
}

#[async_trait]
impl ControlChannel for MemoryControlChannel {
    async fn add_export(&self, config_path: &Path, export_id: ExportId) -> Result<()> {
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(ExportError::Channel(format!(
                "AddExport failed for export {export_id}"
            )));
        }
        let mut live = self.live.lock().await;
        if live.contains_key(&export_id) {
            return Err(ExportError::Channel(format!(
                "export {export_id} already active"
            )));
        }
        live.insert(export_id, config_path.to_path_buf());
        Ok(())
    }

    async fn remove_export(&self, export_id: ExportId) -> Result<()> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(ExportError::Channel(format!(
                "RemoveExport failed for export {export_id}"
            )));
        }
        match self.live.lock().await.remove(&export_id) {
            Some(_) => Ok(()),
            None => Err(ExportError::Channel(format!(
                "export {export_id} is not active"
            ))),
        }
    }
}
