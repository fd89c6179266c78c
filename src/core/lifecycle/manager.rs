//! Publish and retract exports transactionally

use super::undo::{UndoAction, UndoLog};
use crate::adapters::traits::ControlChannel;
use crate::core::allocator::ExportIdAllocator;
use crate::core::codec::{actual_key, get_ci, get_ci_mut, ConfigDocument};
use crate::core::store::{ExportFileStore, PLACEHOLDER_PREFIX};
use crate::domain::{ExportError, ExportId, ExportName, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

const EXPORT_BLOCK: &str = "EXPORT";
const EXPORT_ID_KEY: &str = "Export_Id";

/// Outcome of a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedExport {
    pub name: ExportName,
    pub export_id: ExportId,
    pub path: PathBuf,
}

/// Keeps export files, the live service and the index consistent
///
/// `publish` walks an export through
/// `Absent -> FileWritten -> LiveRegistered -> Indexed`, recording a
/// compensating action after each step and replaying them if a later step
/// fails. `retract` is best-effort towards the live service but always
/// removes the file and rebuilds the index.
///
/// Callers must not run two mutations against the same export directory
/// concurrently.
pub struct ExportLifecycleManager {
    store: Arc<ExportFileStore>,
    allocator: Arc<ExportIdAllocator>,
    channel: Arc<dyn ControlChannel>,
}

impl ExportLifecycleManager {
    /// Create a new ExportLifecycleManager
    ///
    /// # Arguments
    ///
    /// * `store` - Export file store
    /// * `allocator` - Source of new export ids
    /// * `channel` - Control channel into the live service
    pub fn new(
        store: Arc<ExportFileStore>,
        allocator: Arc<ExportIdAllocator>,
        channel: Arc<dyn ControlChannel>,
    ) -> Self {
        Self {
            store,
            allocator,
            channel,
        }
    }

    pub fn store(&self) -> &ExportFileStore {
        &self.store
    }

    /// Publish `document` as export `name`
    ///
    /// `name` must not be published yet. A numeric `EXPORT.Export_Id` in the
    /// document is kept; otherwise a new id is allocated and set. The
    /// document is then written, registered with the live service and the
    /// index is rebuilt.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::AlreadyExists`] if a file for `name` is already
    /// stored. Otherwise returns the error of the first step that failed,
    /// after every completed step has been undone. Errors raised while
    /// undoing are logged only.
    pub async fn publish(
        &self,
        name: &ExportName,
        mut document: ConfigDocument,
    ) -> Result<PublishedExport> {
        let started = Instant::now();
        crate::log_publish_start!(name);

        // Rolling back deletes the file, so an existing export must never be overwritten
        if self.store.contains(name).await? {
            tracing::warn!(export_name = %name, "Export already published");
            return Err(ExportError::AlreadyExists(name.to_string()));
        }

        let export_id = self.assign_export_id(&mut document).await?;
        let mut undo = UndoLog::new();

        match self.apply(name, export_id, &document, &mut undo).await {
            Ok(path) => {
                undo.commit();
                crate::log_publish_complete!(name, export_id, started.elapsed());
                Ok(PublishedExport {
                    name: name.clone(),
                    export_id,
                    path,
                })
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Publish failed, rolling back");
                let failures = undo.rollback(&self.store, self.channel.as_ref()).await;
                if failures > 0 {
                    tracing::warn!(export_name = %name, failures, "Rollback incomplete");
                }
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        name: &ExportName,
        export_id: ExportId,
        document: &ConfigDocument,
        undo: &mut UndoLog,
    ) -> Result<PathBuf> {
        let path = self.store.write_export_file(name, document).await?;
        undo.push(UndoAction::DeleteFile(name.clone()));

        self.channel.add_export(&path, export_id).await?;
        undo.push(UndoAction::UnregisterLive(export_id));

        self.store.rebuild_index().await?;
        Ok(path)
    }

    /// Remove export `name` from the live service and from disk
    ///
    /// An unknown name is a no-op. Failure to drop the live export is logged
    /// and ignored; the file is removed and the index rebuilt regardless,
    /// even when the file cannot be read.
    ///
    /// # Errors
    ///
    /// Returns the read error if the file could not be read back, otherwise
    /// an error if the file cannot be removed or the index cannot be
    /// rebuilt.
    pub async fn retract(&self, name: &ExportName) -> Result<()> {
        let read = match self.store.read_export_file(name).await {
            Ok(document) => Ok(document),
            Err(e) if e.is_not_found() => {
                tracing::info!(export_name = %name, "Export not found, nothing to retract");
                return Ok(());
            }
            Err(e) => {
                tracing::error!(
                    export_name = %name,
                    error = %e,
                    "Could not read export file, removing it without notifying the service"
                );
                Err(e)
            }
        };

        match read.as_ref().map(export_id_of) {
            Err(_) => {}
            Ok(Some(export_id)) => {
                if let Err(e) = self.channel.remove_export(export_id).await {
                    tracing::warn!(
                        export_name = %name,
                        export_id = %export_id,
                        error = %e,
                        "Could not remove live export, removing file anyway"
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(export_name = %name, "Export file has no numeric Export_Id");
            }
        }

        let removed = self.store.remove_export_file(name).await;
        let indexed = self.store.rebuild_index().await;
        read?;
        removed?;
        indexed?;

        tracing::info!(export_name = %name, "Export retracted");
        Ok(())
    }

    /// Export id embedded in `document`, allocating one if needed
    async fn assign_export_id(&self, document: &mut ConfigDocument) -> Result<ExportId> {
        let export = get_ci_mut(document, EXPORT_BLOCK)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ExportError::IncompleteExport {
                key: EXPORT_BLOCK.to_string(),
                value: "<missing>".to_string(),
            })?;

        match get_ci(export, EXPORT_ID_KEY) {
            None => {}
            Some(Value::String(s)) if s.starts_with(PLACEHOLDER_PREFIX) => {}
            Some(value) => {
                return value.as_u64().map(ExportId::new).ok_or_else(|| {
                    ExportError::IncompleteExport {
                        key: format!("{EXPORT_BLOCK}.{EXPORT_ID_KEY}"),
                        value: value.to_string(),
                    }
                });
            }
        }

        let export_id = self.allocator.allocate().await?;
        let key = actual_key(export, EXPORT_ID_KEY).unwrap_or_else(|| EXPORT_ID_KEY.to_string());
        export.insert(key, Value::from(export_id.get()));
        Ok(export_id)
    }
}

/// Numeric `EXPORT.Export_Id` of a stored export
fn export_id_of(document: &ConfigDocument) -> Option<ExportId> {
    get_ci(document, EXPORT_BLOCK)
        .and_then(Value::as_object)
        .and_then(|export| get_ci(export, EXPORT_ID_KEY))
        .and_then(Value::as_u64)
        .map(ExportId::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::traits::{CommandOutput, CommandRunner, RunOptions};
    use crate::adapters::{LocalCommandRunner, MemoryControlChannel, MemoryCounterStore};
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    struct Fixture {
        dir: TempDir,
        channel: Arc<MemoryControlChannel>,
        manager: ExportLifecycleManager,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ExportFileStore::new(
            Arc::new(LocalCommandRunner::new()),
            dir.path(),
        ));
        let allocator = Arc::new(ExportIdAllocator::new(Arc::new(MemoryCounterStore::new())));
        let channel = Arc::new(MemoryControlChannel::new());
        let manager = ExportLifecycleManager::new(store, allocator, channel.clone());
        Fixture {
            dir,
            channel,
            manager,
        }
    }

    fn doc(value: serde_json::Value) -> ConfigDocument {
        value.as_object().unwrap().clone()
    }

    fn name(s: &str) -> ExportName {
        ExportName::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_publish_allocates_id() {
        let fx = fixture();
        let published = fx
            .manager
            .publish(&name("share1"), doc(json!({"EXPORT": {"Path": "/s"}})))
            .await
            .unwrap();

        assert_eq!(published.export_id, ExportId::new(101));
        assert_eq!(published.path, fx.dir.path().join("share1.conf"));
        assert_eq!(fx.channel.live_exports().await, vec![ExportId::new(101)]);

        let stored = fx.manager.store().read_export_file(&name("share1")).await.unwrap();
        assert_eq!(stored["EXPORT"]["Export_Id"], json!(101));
    }

    #[tokio::test]
    async fn test_publish_reuses_embedded_id_case_insensitively() {
        let fx = fixture();
        let published = fx
            .manager
            .publish(
                &name("share1"),
                doc(json!({"export": {"export_id": 42, "Path": "/s"}})),
            )
            .await
            .unwrap();
        assert_eq!(published.export_id, ExportId::new(42));

        let stored = fx.manager.store().read_export_file(&name("share1")).await.unwrap();
        assert_eq!(stored["export"]["export_id"], json!(42));
        assert!(stored["export"].get("Export_Id").is_none());
    }

    #[tokio::test]
    async fn test_publish_replaces_placeholder_id() {
        let fx = fixture();
        let published = fx
            .manager
            .publish(
                &name("share1"),
                doc(json!({"EXPORT": {"Export_Id": "@config", "Path": "/s"}})),
            )
            .await
            .unwrap();
        assert_eq!(published.export_id, ExportId::new(101));
    }

    #[tokio::test]
    async fn test_publish_without_export_block() {
        let fx = fixture();
        let err = fx
            .manager
            .publish(&name("share1"), doc(json!({"Path": "/s"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::IncompleteExport { .. }));
    }

    #[tokio::test]
    async fn test_publish_rolls_back_file_when_channel_fails() {
        let fx = fixture();
        fx.channel.set_fail_add(true);

        let err = fx
            .manager
            .publish(&name("share1"), doc(json!({"EXPORT": {"Path": "/s"}})))
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Channel(_)));
        assert!(!fx.dir.path().join("share1.conf").exists());
        assert!(fx.channel.live_exports().await.is_empty());
    }

    #[tokio::test]
    async fn test_retract_removes_file_even_if_channel_fails() {
        let fx = fixture();
        fx.manager
            .publish(&name("share1"), doc(json!({"EXPORT": {"Path": "/s"}})))
            .await
            .unwrap();

        fx.channel.set_fail_remove(true);
        fx.manager.retract(&name("share1")).await.unwrap();

        assert!(!fx.dir.path().join("share1.conf").exists());
        let index = std::fs::read_to_string(fx.manager.store().index_path()).unwrap();
        assert!(!index.contains("share1.conf"));
    }

    #[tokio::test]
    async fn test_retract_unknown_is_noop() {
        let fx = fixture();
        fx.manager.retract(&name("ghost")).await.unwrap();
        assert!(!fx.manager.store().index_path().exists());
    }

    #[tokio::test]
    async fn test_publish_refuses_existing_export() {
        let fx = fixture();
        fx.manager
            .publish(&name("share1"), doc(json!({"EXPORT": {"Path": "/s"}})))
            .await
            .unwrap();
        let index_before = std::fs::read_to_string(fx.manager.store().index_path()).unwrap();

        fx.channel.set_fail_add(true);
        let err = fx
            .manager
            .publish(&name("share1"), doc(json!({"EXPORT": {"Path": "/t"}})))
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::AlreadyExists(ref n) if n == "share1"));
        let stored = fx.manager.store().read_export_file(&name("share1")).await.unwrap();
        assert_eq!(stored["EXPORT"]["Path"], json!("/s"));
        assert_eq!(
            std::fs::read_to_string(fx.manager.store().index_path()).unwrap(),
            index_before
        );
        assert_eq!(fx.channel.live_exports().await, vec![ExportId::new(101)]);
    }

    #[tokio::test]
    async fn test_retract_unreadable_file_still_cleans_up() {
        let fx = fixture();
        fx.manager
            .publish(&name("share1"), doc(json!({"EXPORT": {"Path": "/s"}})))
            .await
            .unwrap();
        std::fs::write(fx.dir.path().join("share1.conf"), "EXPORT { Path = \"/a; }").unwrap();

        let err = fx.manager.retract(&name("share1")).await.unwrap_err();

        assert!(matches!(err, ExportError::Syntax { line: 1, .. }));
        assert!(!fx.dir.path().join("share1.conf").exists());
        assert_eq!(
            std::fs::read_to_string(fx.manager.store().index_path()).unwrap(),
            ""
        );
        // the id could not be recovered, so the live export is left alone
        assert_eq!(fx.channel.live_exports().await, vec![ExportId::new(101)]);

        // a second retract finds nothing left to do
        fx.manager.retract(&name("share1")).await.unwrap();
    }

    /// Local runner whose writes of `INDEX.conf` fail
    struct FailingIndexRunner {
        inner: LocalCommandRunner,
    }

    #[async_trait]
    impl CommandRunner for FailingIndexRunner {
        async fn run(&self, argv: &[&str], options: RunOptions) -> Result<CommandOutput> {
            if argv.iter().any(|arg| arg.starts_with("INDEX.conf.")) {
                return Err(ExportError::Command {
                    command: argv.join(" "),
                    exit_code: Some(1),
                    stdout: String::new(),
                    stderr: "No space left on device".to_string(),
                });
            }
            self.inner.run(argv, options).await
        }
    }

    /// Channel recording whether the export file still existed at each removal
    struct ObservingChannel {
        inner: MemoryControlChannel,
        file: PathBuf,
        file_present_on_remove: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl ControlChannel for ObservingChannel {
        async fn add_export(&self, config_path: &Path, export_id: ExportId) -> Result<()> {
            self.inner.add_export(config_path, export_id).await
        }

        async fn remove_export(&self, export_id: ExportId) -> Result<()> {
            self.file_present_on_remove
                .lock()
                .await
                .push(self.file.exists());
            self.inner.remove_export(export_id).await
        }
    }

    #[tokio::test]
    async fn test_publish_rolls_back_both_steps_when_index_fails() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ExportFileStore::new(
            Arc::new(FailingIndexRunner {
                inner: LocalCommandRunner::new(),
            }),
            dir.path(),
        ));
        let allocator = Arc::new(ExportIdAllocator::new(Arc::new(MemoryCounterStore::new())));
        let channel = Arc::new(ObservingChannel {
            inner: MemoryControlChannel::new(),
            file: dir.path().join("share1.conf"),
            file_present_on_remove: Mutex::new(Vec::new()),
        });
        let manager = ExportLifecycleManager::new(store, allocator, channel.clone());

        let err = manager
            .publish(&name("share1"), doc(json!({"EXPORT": {"Path": "/s"}})))
            .await
            .unwrap_err();

        match err {
            ExportError::Command { stderr, .. } => assert_eq!(stderr, "No space left on device"),
            other => panic!("unexpected error {other:?}"),
        }
        // unregistering ran first, while the file was still there
        assert_eq!(*channel.file_present_on_remove.lock().await, vec![true]);
        assert!(channel.inner.live_exports().await.is_empty());
        assert!(!dir.path().join("share1.conf").exists());
        assert!(!dir.path().join("INDEX.conf").exists());
    }

    #[test]
    fn test_export_id_of() {
        assert_eq!(
            export_id_of(&doc(json!({"Export": {"EXPORT_ID": 7}}))),
            Some(ExportId::new(7))
        );
        assert_eq!(export_id_of(&doc(json!({"EXPORT": {"Export_Id": "x"}}))), None);
    }
}
