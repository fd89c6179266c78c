//! Per-export configuration files
//!
//! The [`ExportFileStore`] owns one directory holding a `<name>.conf` file per
//! export plus the generated `INDEX.conf`, which `%include`s every other file
//! in the directory. The main Ganesha configuration includes the index, so the
//! set of files on disk is the set of exports the service loads on restart.
//!
//! Every filesystem access goes through a [`CommandRunner`], which lets the
//! store manage a gateway over SSH exactly as it manages the local host.
//! Writes are atomic: content is streamed into a temporary file created in
//! the export directory and then renamed over the destination.

use crate::adapters::command::shell_quote;
use crate::adapters::traits::{CommandRunner, RunOptions};
use crate::core::codec::{self, lookup, walk, ConfigDocument};
use crate::domain::{ExportError, ExportName, Result, INDEX_NAME};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the directory next to the main Ganesha configuration file
pub const EXPORT_DIR_NAME: &str = "export.d";

/// Prefix marking a template value that must be filled in before publishing
pub const PLACEHOLDER_PREFIX: char = '@';

/// Directory of export files plus the aggregate index
pub struct ExportFileStore {
    runner: Arc<dyn CommandRunner>,
    export_dir: PathBuf,
}

impl ExportFileStore {
    /// Create a store for `export_dir`
    ///
    /// # Arguments
    ///
    /// * `runner` - Executes the filesystem commands
    /// * `export_dir` - Directory holding the export files
    pub fn new(runner: Arc<dyn CommandRunner>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            export_dir: export_dir.into(),
        }
    }

    /// Create a store for the `export.d` directory next to `ganesha_config_path`
    ///
    /// # Examples
    ///
    /// ```
    /// use ganesha_exports::adapters::LocalCommandRunner;
    /// use ganesha_exports::core::store::ExportFileStore;
    /// use std::path::Path;
    /// use std::sync::Arc;
    ///
    /// let store = ExportFileStore::for_ganesha_config(
    ///     Arc::new(LocalCommandRunner::new()),
    ///     "/etc/ganesha/ganesha.conf",
    /// );
    /// assert_eq!(store.export_dir(), Path::new("/etc/ganesha/export.d"));
    /// ```
    pub fn for_ganesha_config(
        runner: Arc<dyn CommandRunner>,
        ganesha_config_path: impl AsRef<Path>,
    ) -> Self {
        let parent = ganesha_config_path
            .as_ref()
            .parent()
            .unwrap_or_else(|| Path::new("/"));
        Self::new(runner, parent.join(EXPORT_DIR_NAME))
    }

    /// Directory holding the export files
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Location of the file for export `name`
    pub fn path_for(&self, name: &ExportName) -> PathBuf {
        self.export_dir.join(name.file_name())
    }

    /// Location of the index file
    pub fn index_path(&self) -> PathBuf {
        self.export_dir.join(format!("{INDEX_NAME}.conf"))
    }

    /// Create the export directory if it does not exist yet
    pub async fn init(&self) -> Result<()> {
        let dir = self.export_dir.to_string_lossy();
        self.runner
            .run(&["mkdir", "-p", &*dir], RunOptions::as_root())
            .await?;
        Ok(())
    }

    /// Persist `document` as the file for export `name`
    ///
    /// # Returns
    ///
    /// The path the export was written to.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::IncompleteExport`] if any string value still
    /// starts with the placeholder marker `@`, or a command error if the
    /// write fails. A failed write leaves any previous file untouched.
    pub async fn write_export_file(
        &self,
        name: &ExportName,
        document: &ConfigDocument,
    ) -> Result<PathBuf> {
        check_complete(document)?;
        let content = codec::serialize(document);
        let path = self.path_for(name);
        self.write_atomically(&name.file_name(), &path, &content)
            .await?;
        tracing::debug!(export_name = %name, path = %path.display(), "Export file written");
        Ok(path)
    }

    /// Read back the document stored for export `name`
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotFound`] if no such file exists, or
    /// [`ExportError::Syntax`] if its content does not parse.
    pub async fn read_export_file(&self, name: &ExportName) -> Result<ConfigDocument> {
        let path = self.path_for(name);
        self.ensure_exists(name, &path).await?;
        let path_str = path.to_string_lossy();
        let output = self
            .runner
            .run(&["cat", &*path_str], RunOptions::as_root())
            .await?;
        codec::parse(&output.stdout)
    }

    /// True if a file for export `name` exists
    pub async fn contains(&self, name: &ExportName) -> Result<bool> {
        match self.ensure_exists(name, &self.path_for(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete the file for export `name`
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotFound`] if no such file exists.
    pub async fn remove_export_file(&self, name: &ExportName) -> Result<()> {
        let path = self.path_for(name);
        self.ensure_exists(name, &path).await?;
        let path_str = path.to_string_lossy();
        self.runner
            .run(&["rm", &*path_str], RunOptions::as_root())
            .await?;
        tracing::debug!(export_name = %name, path = %path.display(), "Export file removed");
        Ok(())
    }

    /// Regenerate `INDEX.conf` from the files currently in the directory
    ///
    /// The index holds one `%include <export_dir>/<file>` line per export
    /// file, in lexicographic order. It is rewritten wholesale.
    pub async fn rebuild_index(&self) -> Result<()> {
        let files = self.list_conf_files().await?;
        let dir = self.export_dir.display().to_string();
        let content: String = files
            .iter()
            .map(|file| format!("%include {dir}/{file}\n"))
            .collect();

        let index_file = format!("{INDEX_NAME}.conf");
        self.write_atomically(&index_file, &self.index_path(), &content)
            .await?;
        tracing::debug!(export_dir = %dir, exports = files.len(), "Index rebuilt");
        Ok(())
    }

    /// Names of all exports currently stored, sorted
    ///
    /// Files whose stem is not a valid export name are skipped.
    pub async fn list_export_names(&self) -> Result<Vec<ExportName>> {
        let files = self.list_conf_files().await?;
        Ok(files
            .iter()
            .filter_map(|file| file.strip_suffix(".conf"))
            .filter_map(|stem| ExportName::new(stem).ok())
            .collect())
    }

    /// Name of the export whose `EXPORT.Path` equals `path`, if any
    pub async fn find_export_by_path(&self, path: &str) -> Result<Option<ExportName>> {
        for name in self.list_export_names().await? {
            let document = match self.read_export_file(&name).await {
                Ok(document) => document,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            };
            if lookup(&document, &["EXPORT", "Path"]).and_then(Value::as_str) == Some(path) {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    /// `*.conf` file names in the export directory except the index, sorted
    async fn list_conf_files(&self) -> Result<Vec<String>> {
        let dir = self.export_dir.to_string_lossy();
        let output = self
            .runner
            .run(&["ls", "-1", &*dir], RunOptions::unprivileged())
            .await?;
        let index_file = format!("{INDEX_NAME}.conf");
        let mut files: Vec<String> = output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|f| f.ends_with(".conf") && *f != index_file)
            .map(str::to_string)
            .collect();
        files.sort();
        Ok(files)
    }

    async fn ensure_exists(&self, name: &ExportName, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        match self
            .runner
            .run(&["test", "-f", &*path_str], RunOptions::as_root())
            .await
        {
            Ok(_) => Ok(()),
            // `test` itself is silent; output on stderr means the root helper failed
            Err(ExportError::Command {
                exit_code: Some(1),
                stderr,
                ..
            }) if stderr.trim().is_empty() => Err(ExportError::NotFound(name.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Write `content` to `dest` through a temporary file in the export directory
    async fn write_atomically(&self, file_name: &str, dest: &Path, content: &str) -> Result<()> {
        let dir = self.export_dir.to_string_lossy();
        let template = format!("{file_name}.XXXXXX");
        let output = self
            .runner
            .run(&["mktemp", "-p", &*dir, &template], RunOptions::as_root())
            .await?;
        let tmp = output.stdout.trim().to_string();
        if tmp.is_empty() {
            return Err(ExportError::Io(format!(
                "mktemp returned no file name in {dir}"
            )));
        }

        let dest = dest.to_string_lossy();
        let result = self.fill_and_rename(&tmp, &dest, content).await;
        if result.is_err() {
            if let Err(e) = self
                .runner
                .run(&["rm", "-f", &tmp], RunOptions::as_root())
                .await
            {
                tracing::warn!(tmp = %tmp, error = %e, "Could not remove temporary file");
            }
        }
        result
    }

    async fn fill_and_rename(&self, tmp: &str, dest: &str, content: &str) -> Result<()> {
        let script = format!("cat > {}", shell_quote(tmp));
        self.runner
            .run(
                &["sh", "-c", &script],
                RunOptions::as_root().with_stdin(content.as_bytes()),
            )
            .await?;
        self.runner
            .run(&["mv", tmp, dest], RunOptions::as_root())
            .await?;
        Ok(())
    }
}

/// Rejects documents that still contain template placeholders
fn check_complete(document: &ConfigDocument) -> Result<()> {
    for (key, value) in walk(document) {
        if let Value::String(s) = value {
            if s.starts_with(PLACEHOLDER_PREFIX) {
                return Err(ExportError::IncompleteExport {
                    key,
                    value: s.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalCommandRunner;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ExportFileStore {
        ExportFileStore::new(Arc::new(LocalCommandRunner::new()), dir.path())
    }

    fn export_doc(path: &str) -> ConfigDocument {
        json!({
            "EXPORT": {
                "Export_Id": 101,
                "Path": path,
                "Pseudo": format!("{path}_a"),
                "Tag": "a",
                "CLIENT": {"Clients": "10.0.0.5"},
                "FSAL": {"Name": "VFS"}
            }
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn name(s: &str) -> ExportName {
        ExportName::new(s).unwrap()
    }

    #[test]
    fn test_check_complete_rejects_placeholder() {
        let doc = json!({"EXPORT": {"FSAL": {"Name": "@config"}}});
        let err = check_complete(doc.as_object().unwrap()).unwrap_err();
        match err {
            ExportError::IncompleteExport { key, value } => {
                assert_eq!(key, "EXPORT.FSAL.Name");
                assert_eq!(value, "@config");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_check_complete_accepts_inner_at_sign() {
        let doc = json!({"EXPORT": {"Squash": "root@host"}});
        assert!(check_complete(doc.as_object().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let doc = export_doc("/exports/share1");

        let path = store.write_export_file(&name("share1"), &doc).await.unwrap();
        assert_eq!(path, dir.path().join("share1.conf"));
        assert_eq!(store.read_export_file(&name("share1")).await.unwrap(), doc);

        // no temporary files are left behind
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_export_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let doc = json!({"EXPORT": {"Path": "@config"}});

        let result = store
            .write_export_file(&name("share1"), doc.as_object().unwrap())
            .await;
        assert!(matches!(result, Err(ExportError::IncompleteExport { .. })));
        assert!(!dir.path().join("share1.conf").exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store
            .read_export_file(&name("ghost"))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store
            .remove_export_file(&name("ghost"))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_contains() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.contains(&name("share1")).await.unwrap());
        store
            .write_export_file(&name("share1"), &export_doc("/s"))
            .await
            .unwrap();
        assert!(store.contains(&name("share1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_root_helper_failure_is_not_not_found() {
        let dir = TempDir::new().unwrap();
        // a helper that refuses every privileged command like `sudo -n` without credentials
        let runner = LocalCommandRunner::with_root_helper(vec![
            "sh".into(),
            "-c".into(),
            "echo 'sudo: a password is required' >&2; exit 1".into(),
            "helper".into(),
        ]);
        let store = ExportFileStore::new(Arc::new(runner), dir.path());

        let err = store.read_export_file(&name("share1")).await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(err, ExportError::Command { exit_code: Some(1), .. }));
        assert!(store.contains(&name("share1")).await.is_err());
    }

    #[tokio::test]
    async fn test_rebuild_index_lists_sorted_exports() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .write_export_file(&name("b_share"), &export_doc("/b"))
            .await
            .unwrap();
        store
            .write_export_file(&name("a_share"), &export_doc("/a"))
            .await
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        store.rebuild_index().await.unwrap();
        store.rebuild_index().await.unwrap();

        let index = std::fs::read_to_string(store.index_path()).unwrap();
        let root = dir.path().display();
        assert_eq!(
            index,
            format!("%include {root}/a_share.conf\n%include {root}/b_share.conf\n")
        );
    }

    #[tokio::test]
    async fn test_remove_then_rebuild_drops_include() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .write_export_file(&name("share1"), &export_doc("/s"))
            .await
            .unwrap();
        store.rebuild_index().await.unwrap();

        store.remove_export_file(&name("share1")).await.unwrap();
        store.rebuild_index().await.unwrap();

        assert!(!dir.path().join("share1.conf").exists());
        assert_eq!(std::fs::read_to_string(store.index_path()).unwrap(), "");
    }

    #[tokio::test]
    async fn test_list_and_find_by_path() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .write_export_file(&name("one"), &export_doc("/exports/one"))
            .await
            .unwrap();
        store
            .write_export_file(&name("two"), &export_doc("/exports/two"))
            .await
            .unwrap();
        store.rebuild_index().await.unwrap();

        assert_eq!(
            store.list_export_names().await.unwrap(),
            vec![name("one"), name("two")]
        );
        assert_eq!(
            store.find_export_by_path("/exports/two").await.unwrap(),
            Some(name("two"))
        );
        assert_eq!(store.find_export_by_path("/nowhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_init_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("ganesha").join("export.d");
        let store = ExportFileStore::new(Arc::new(LocalCommandRunner::new()), &nested);
        store.init().await.unwrap();
        store.init().await.unwrap();
        assert!(nested.is_dir());
    }
}
