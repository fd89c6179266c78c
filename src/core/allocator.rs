//! Export id allocation
//!
//! Ids come from a durable counter so they stay unique across restarts and
//! across every process managing the same gateway. The counter is seeded
//! once and only ever incremented.

use crate::adapters::traits::CounterStore;
use crate::domain::{ExportError, ExportId, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Counter the export ids are drawn from
pub const EXPORT_ID_COUNTER: &str = "exportid";

/// Value the counter starts at; the first allocated id is one above it
pub const DEFAULT_EXPORT_ID_SEED: i64 = 100;

/// Hands out unique, strictly increasing export ids
pub struct ExportIdAllocator {
    store: Arc<dyn CounterStore>,
    seed: i64,
    initialized: OnceCell<()>,
}

impl ExportIdAllocator {
    /// Create an allocator seeding the counter with [`DEFAULT_EXPORT_ID_SEED`]
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self::with_seed(store, DEFAULT_EXPORT_ID_SEED)
    }

    /// Create an allocator with a custom seed
    ///
    /// The seed only matters the first time the counter is created; an
    /// existing counter keeps its value.
    pub fn with_seed(store: Arc<dyn CounterStore>, seed: i64) -> Self {
        Self {
            store,
            seed,
            initialized: OnceCell::new(),
        }
    }

    /// Create the counter if it does not exist yet
    ///
    /// Safe to call any number of times, from any number of processes.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Allocation`] if the counter store is unreachable.
    pub async fn init(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                self.store
                    .init_if_absent(EXPORT_ID_COUNTER, self.seed)
                    .await
                    .map_err(into_allocation)?;
                tracing::debug!(counter = EXPORT_ID_COUNTER, seed = self.seed, "Export id counter ready");
                Ok::<(), ExportError>(())
            })
            .await?;
        Ok(())
    }

    /// Allocate the next export id
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Allocation`] if the counter store is
    /// unreachable or yields a value that is not a positive id.
    pub async fn allocate(&self) -> Result<ExportId> {
        self.init().await?;
        let value = self
            .store
            .increment_and_get(EXPORT_ID_COUNTER)
            .await
            .map_err(into_allocation)?;
        let id = u64::try_from(value)
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                ExportError::Allocation(format!("counter returned unusable id {value}"))
            })?;
        tracing::debug!(export_id = id, "Export id allocated");
        Ok(ExportId::new(id))
    }
}

fn into_allocation(err: ExportError) -> ExportError {
    match err {
        ExportError::Allocation(_) => err,
        other => ExportError::Allocation(other.to_string()),
    }
}
