//! Share access through per-rule exports
//!
//! Every IP access rule on a share becomes its own export named
//! `<share>_<rule id>`, rooted at the share directory, visible under its own
//! pseudo path and restricted to the rule's clients. Granting access
//! publishes that export, revoking it retracts it.

use crate::core::codec::{patch, ConfigDocument};
use crate::core::lifecycle::{ExportLifecycleManager, PublishedExport};
use crate::domain::{AccessRule, ExportError, ExportName, Result};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

/// Supplies the FSAL block for an export
///
/// The block depends on the storage backend behind the gateway, which knows
/// how to reach the share's data.
pub trait FsalProvider: Send + Sync {
    fn fsal_block(&self, base_path: &str, share_name: &str, access: &AccessRule) -> ConfigDocument;
}

/// FSAL provider returning the same block for every export
#[derive(Debug, Clone)]
pub struct StaticFsal {
    block: ConfigDocument,
}

impl StaticFsal {
    /// Provider for an FSAL that needs nothing beyond its name
    ///
    /// # Examples
    ///
    /// ```
    /// use ganesha_exports::core::access::{FsalProvider, StaticFsal};
    /// use ganesha_exports::domain::AccessRule;
    ///
    /// let fsal = StaticFsal::named("VFS");
    /// let block = fsal.fsal_block("/exports", "share1", &AccessRule::ip("acc1", "10.0.0.5"));
    /// assert_eq!(block["Name"], "VFS");
    /// ```
    pub fn named(name: impl Into<String>) -> Self {
        let mut block = ConfigDocument::new();
        block.insert("Name".to_string(), Value::String(name.into()));
        Self { block }
    }

    pub fn new(block: ConfigDocument) -> Self {
        Self { block }
    }
}

impl FsalProvider for StaticFsal {
    fn fsal_block(&self, _base_path: &str, _share_name: &str, _access: &AccessRule) -> ConfigDocument {
        self.block.clone()
    }
}

/// Grants and revokes share access by publishing and retracting exports
pub struct ExportHelper {
    manager: Arc<ExportLifecycleManager>,
    template: ConfigDocument,
    fsal: Arc<dyn FsalProvider>,
}

impl ExportHelper {
    /// Create a new ExportHelper
    ///
    /// # Arguments
    ///
    /// * `manager` - Lifecycle manager the exports are published through
    /// * `template` - Document every export starts from
    /// * `fsal` - Source of the FSAL block
    pub fn new(
        manager: Arc<ExportLifecycleManager>,
        template: ConfigDocument,
        fsal: Arc<dyn FsalProvider>,
    ) -> Self {
        Self {
            manager,
            template,
            fsal,
        }
    }

    /// Name of the export carrying `access` on `share_name`
    pub fn export_name(share_name: &str, access: &AccessRule) -> Result<ExportName> {
        ExportName::new(format!("{share_name}_{}", access.id)).map_err(ExportError::InvalidName)
    }

    /// Build the export document granting `access` on `share_name`
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidAccess`] for anything but `ip` rules.
    pub fn build_export(
        &self,
        base_path: &str,
        share_name: &str,
        access: &AccessRule,
    ) -> Result<ConfigDocument> {
        if !access.is_ip() {
            return Err(ExportError::InvalidAccess(format!(
                "only ip access type allowed, got '{}'",
                access.access_type
            )));
        }

        let base = Path::new(base_path);
        let Value::Object(overlay) = json!({
            "EXPORT": {
                "Path": base.join(share_name).display().to_string(),
                "Pseudo": base.join(format!("{share_name}_{}", access.id)).display().to_string(),
                "Tag": access.id,
                "CLIENT": {
                    "Clients": access.access_to,
                },
                "FSAL": self.fsal.fsal_block(base_path, share_name, access),
            }
        }) else {
            return Err(ExportError::Serialization(
                "export overlay is not an object".to_string(),
            ));
        };
        Ok(patch(self.template.clone(), [&overlay]))
    }

    /// Grant `access` on `share_name` by publishing its export
    pub async fn allow_access(
        &self,
        base_path: &str,
        share_name: &str,
        access: &AccessRule,
    ) -> Result<PublishedExport> {
        let name = Self::export_name(share_name, access)?;
        let document = self.build_export(base_path, share_name, access)?;
        let published = self.manager.publish(&name, document).await?;
        tracing::info!(
            share = share_name,
            access_id = %access.id,
            access_to = %access.access_to,
            export_id = %published.export_id,
            "Access allowed"
        );
        Ok(published)
    }

    /// Revoke `access` on `share_name` by retracting its export
    ///
    /// Revoking access that was never granted succeeds.
    pub async fn deny_access(
        &self,
        _base_path: &str,
        share_name: &str,
        access: &AccessRule,
    ) -> Result<()> {
        let name = Self::export_name(share_name, access)?;
        self.manager.retract(&name).await?;
        tracing::info!(share = share_name, access_id = %access.id, "Access denied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LocalCommandRunner, MemoryControlChannel, MemoryCounterStore};
    use crate::core::allocator::ExportIdAllocator;
    use crate::core::codec::lookup;
    use crate::core::store::ExportFileStore;
    use crate::core::template::default_export_template;
    use tempfile::TempDir;

    fn helper(dir: &TempDir) -> ExportHelper {
        let store = Arc::new(ExportFileStore::new(
            Arc::new(LocalCommandRunner::new()),
            dir.path(),
        ));
        let allocator = Arc::new(ExportIdAllocator::new(Arc::new(MemoryCounterStore::new())));
        let manager = Arc::new(ExportLifecycleManager::new(
            store,
            allocator,
            Arc::new(MemoryControlChannel::new()),
        ));
        ExportHelper::new(
            manager,
            default_export_template().unwrap(),
            Arc::new(StaticFsal::named("VFS")),
        )
    }

    #[test]
    fn test_build_export_fills_template() {
        let dir = TempDir::new().unwrap();
        let doc = helper(&dir)
            .build_export("/exports", "share1", &AccessRule::ip("acc1", "10.0.0.5"))
            .unwrap();

        assert_eq!(lookup(&doc, &["EXPORT", "Path"]), Some(&json!("/exports/share1")));
        assert_eq!(
            lookup(&doc, &["EXPORT", "Pseudo"]),
            Some(&json!("/exports/share1_acc1"))
        );
        assert_eq!(lookup(&doc, &["EXPORT", "Tag"]), Some(&json!("acc1")));
        assert_eq!(
            lookup(&doc, &["EXPORT", "CLIENT", "Clients"]),
            Some(&json!("10.0.0.5"))
        );
        // template values the overlay does not touch survive
        assert_eq!(
            lookup(&doc, &["EXPORT", "CLIENT", "Access_Type"]),
            Some(&json!("RW"))
        );
        assert_eq!(lookup(&doc, &["EXPORT", "FSAL", "Name"]), Some(&json!("VFS")));
    }

    #[test]
    fn test_non_ip_access_rejected() {
        let dir = TempDir::new().unwrap();
        let access = AccessRule {
            id: "acc1".to_string(),
            access_type: "user".to_string(),
            access_to: "alice".to_string(),
        };
        assert!(matches!(
            helper(&dir).build_export("/exports", "share1", &access),
            Err(ExportError::InvalidAccess(_))
        ));
    }

    #[test]
    fn test_export_name_validation() {
        let access = AccessRule::ip("acc1", "10.0.0.5");
        assert_eq!(
            ExportHelper::export_name("share1", &access).unwrap().as_str(),
            "share1_acc1"
        );
        assert!(matches!(
            ExportHelper::export_name("a/b", &access),
            Err(ExportError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_allow_then_deny() {
        let dir = TempDir::new().unwrap();
        let helper = helper(&dir);
        let access = AccessRule::ip("acc1", "10.0.0.5");

        let published = helper.allow_access("/exports", "share1", &access).await.unwrap();
        assert_eq!(published.name.as_str(), "share1_acc1");
        assert!(dir.path().join("share1_acc1.conf").exists());

        helper.deny_access("/exports", "share1", &access).await.unwrap();
        assert!(!dir.path().join("share1_acc1.conf").exists());
    }

    #[tokio::test]
    async fn test_missing_fsal_name_is_incomplete() {
        let dir = TempDir::new().unwrap();
        let mut helper = helper(&dir);
        helper.fsal = Arc::new(StaticFsal::new(ConfigDocument::new()));

        let err = helper
            .allow_access("/exports", "share1", &AccessRule::ip("acc1", "10.0.0.5"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::IncompleteExport { key, .. } if key == "EXPORT.FSAL.Name"));
        assert!(!dir.path().join("share1_acc1.conf").exists());
    }
}
