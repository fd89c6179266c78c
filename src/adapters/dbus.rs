//! NFS-Ganesha D-Bus control channel
//!
//! Ganesha exposes an `ExportMgr` object on the system bus that can load or
//! drop a single export at runtime, and an `admin` object that can reload the
//! whole configuration. Both are reached with `dbus-send` through a
//! [`CommandRunner`], so the bus may be local or on a remote gateway.

use crate::adapters::traits::{CommandRunner, ControlChannel, RunOptions};
use crate::domain::{ExportError, ExportId, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Well-known bus name of the NFS-Ganesha daemon
pub const GANESHA_BUS_NAME: &str = "org.ganesha.nfsd";

/// Export manager object path
pub const EXPORT_MGR_PATH: &str = "/org/ganesha/nfsd/ExportMgr";

/// Admin object path
pub const ADMIN_PATH: &str = "/org/ganesha/nfsd/admin";

/// [`ControlChannel`] speaking to Ganesha's `ExportMgr` over D-Bus
pub struct DbusControlChannel {
    runner: Arc<dyn CommandRunner>,
}

impl DbusControlChannel {
    /// Create a channel that invokes `dbus-send` through `runner`
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn send(&self, method: &str, args: &[String]) -> Result<()> {
        send_ganesha(self.runner.as_ref(), EXPORT_MGR_PATH, "exportmgr", method, args).await
    }
}

/// `dbus-send` argv for a method call on the Ganesha daemon
fn dbus_send_argv(object: &str, interface: &str, method: &str, args: &[String]) -> Vec<String> {
    let mut argv = vec![
        "dbus-send".to_string(),
        "--print-reply".to_string(),
        "--system".to_string(),
        format!("--dest={GANESHA_BUS_NAME}"),
        object.to_string(),
        format!("{GANESHA_BUS_NAME}.{interface}.{method}"),
    ];
    argv.extend(args.iter().cloned());
    argv
}

async fn send_ganesha(
    runner: &dyn CommandRunner,
    object: &str,
    interface: &str,
    method: &str,
    args: &[String],
) -> Result<()> {
    let argv = dbus_send_argv(object, interface, method, args);
    let refs: Vec<&str> = argv.iter().map(String::as_str).collect();
    runner
        .run(&refs, RunOptions::as_root())
        .await
        .map_err(|e| ExportError::Channel(format!("{method} failed: {e}")))?;
    Ok(())
}

#[async_trait]
impl ControlChannel for DbusControlChannel {
    async fn add_export(&self, config_path: &Path, export_id: ExportId) -> Result<()> {
        tracing::debug!(path = %config_path.display(), export_id = %export_id, "Adding live export");
        self.send(
            "AddExport",
            &[
                format!("string:{}", config_path.display()),
                format!("string:EXPORT(Export_Id={export_id})"),
            ],
        )
        .await
    }

    async fn remove_export(&self, export_id: ExportId) -> Result<()> {
        // ids beyond u16::MAX are not representable; dbus-send rejects them
        tracing::debug!(export_id = %export_id, "Removing live export");
        self.send("RemoveExport", &[format!("uint16:{export_id}")])
            .await
    }
}

/// Forces the live service to pick up the configuration from disk
///
/// Tries the admin `reload` method first and falls back to restarting the
/// service unit when the reload request fails.
pub struct ServiceReloader {
    runner: Arc<dyn CommandRunner>,
    service_name: String,
}

/// How the configuration was picked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Reloaded,
    Restarted,
}

impl ServiceReloader {
    /// Create a reloader for the systemd unit `service_name`
    pub fn new(runner: Arc<dyn CommandRunner>, service_name: impl Into<String>) -> Self {
        Self {
            runner,
            service_name: service_name.into(),
        }
    }

    /// Reload the service configuration, restarting the service if needed
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Command`] if the restart fallback fails too.
    pub async fn reload(&self) -> Result<ReloadOutcome> {
        match send_ganesha(self.runner.as_ref(), ADMIN_PATH, "admin", "reload", &[]).await {
            Ok(()) => {
                tracing::info!("Configuration reloaded over D-Bus");
                return Ok(ReloadOutcome::Reloaded);
            }
            Err(e) => {
                tracing::warn!(error = %e, service = %self.service_name, "D-Bus reload failed, restarting service");
            }
        }

        self.runner
            .run(
                &["systemctl", "restart", self.service_name.as_str()],
                RunOptions::as_root(),
            )
            .await
            .map_err(|e| {
                tracing::error!(service = %self.service_name, error = %e, "Could not restart service");
                e
            })?;

        tracing::info!(service = %self.service_name, "Service restarted to force a configuration reload");
        Ok(ReloadOutcome::Restarted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::traits::CommandOutput;
    use std::sync::Mutex;

    /// Fails every command whose argv contains `fail_on`
    struct ScriptedRunner {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedRunner {
        fn new(fail_on: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                fail_on,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, argv: &[&str], _options: RunOptions) -> Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push(argv.iter().map(|s| s.to_string()).collect());
            if let Some(needle) = self.fail_on {
                if argv.iter().any(|a| a.contains(needle)) {
                    return Err(ExportError::Command {
                        command: argv.join(" "),
                        exit_code: Some(1),
                        stdout: String::new(),
                        stderr: "org.freedesktop.DBus.Error.ServiceUnknown".to_string(),
                    });
                }
            }
            Ok(CommandOutput::default())
        }
    }

    #[tokio::test]
    async fn test_add_export_argv() {
        let runner = ScriptedRunner::new(None);
        let channel = DbusControlChannel::new(runner.clone());
        channel
            .add_export(Path::new("/etc/ganesha/export.d/share1_acc1.conf"), ExportId::new(101))
            .await
            .unwrap();

        assert_eq!(
            runner.calls()[0],
            vec![
                "dbus-send",
                "--print-reply",
                "--system",
                "--dest=org.ganesha.nfsd",
                "/org/ganesha/nfsd/ExportMgr",
                "org.ganesha.nfsd.exportmgr.AddExport",
                "string:/etc/ganesha/export.d/share1_acc1.conf",
                "string:EXPORT(Export_Id=101)",
            ]
        );
    }

    #[tokio::test]
    async fn test_remove_export_argv() {
        let runner = ScriptedRunner::new(None);
        let channel = DbusControlChannel::new(runner.clone());
        channel.remove_export(ExportId::new(101)).await.unwrap();

        let calls = runner.calls();
        let call = &calls[0];
        assert_eq!(call[5], "org.ganesha.nfsd.exportmgr.RemoveExport");
        assert_eq!(call[6], "uint16:101");
    }

    #[tokio::test]
    async fn test_command_failure_is_channel_error() {
        let channel = DbusControlChannel::new(ScriptedRunner::new(Some("dbus-send")));
        let err = channel.remove_export(ExportId::new(5)).await.unwrap_err();
        assert!(matches!(err, ExportError::Channel(_)));
        assert!(err.to_string().contains("RemoveExport failed"));
    }

    #[tokio::test]
    async fn test_reload_over_dbus() {
        let runner = ScriptedRunner::new(None);
        let reloader = ServiceReloader::new(runner.clone(), "nfs-ganesha");
        assert_eq!(reloader.reload().await.unwrap(), ReloadOutcome::Reloaded);
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(runner.calls()[0][5], "org.ganesha.nfsd.admin.reload");
    }

    #[tokio::test]
    async fn test_reload_falls_back_to_restart() {
        let runner = ScriptedRunner::new(Some("dbus-send"));
        let reloader = ServiceReloader::new(runner.clone(), "nfs-ganesha");
        assert_eq!(reloader.reload().await.unwrap(), ReloadOutcome::Restarted);
        assert_eq!(
            runner.calls()[1],
            vec!["systemctl", "restart", "nfs-ganesha"]
        );
    }

    #[tokio::test]
    async fn test_restart_failure_propagates() {
        let runner = ScriptedRunner::new(Some("r"));
        let reloader = ServiceReloader::new(runner, "nfs-ganesha");
        assert!(matches!(
            reloader.reload().await,
            Err(ExportError::Command { .. })
        ));
    }
}
