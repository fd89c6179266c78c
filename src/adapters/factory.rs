//! Collaborator factory
//!
//! This module provides factory functions that build the command-backed
//! collaborators from configuration.

use crate::adapters::command::{LocalCommandRunner, SshCommandRunner};
use crate::adapters::dbus::{DbusControlChannel, ServiceReloader};
use crate::adapters::sqlite::SqliteCounterStore;
use crate::adapters::traits::{CommandRunner, ControlChannel, CounterStore};
use crate::config::GaneshaExportsConfig;
use std::sync::Arc;

/// Create a command runner based on the configuration
///
/// Commands run over SSH when a `[remote]` section is present and on this
/// host otherwise. Either way privileged commands are prefixed with
/// `ganesha.root_helper`.
pub fn create_command_runner(config: &GaneshaExportsConfig) -> Arc<dyn CommandRunner> {
    let root_helper = config.ganesha.root_helper.clone();
    match &config.remote {
        Some(remote) => {
            tracing::info!(host = %remote.host, port = remote.port, "Using remote gateway over SSH");
            let mut runner = SshCommandRunner::new(&remote.host, remote.port, &remote.login)
                .with_root_helper(root_helper);
            if let Some(key) = &remote.private_key {
                runner = runner.with_private_key(key);
            }
            Arc::new(runner)
        }
        None => {
            tracing::debug!("Using local gateway");
            Arc::new(LocalCommandRunner::with_root_helper(root_helper))
        }
    }
}

/// Create the counter store holding the export id sequence
pub fn create_counter_store(
    config: &GaneshaExportsConfig,
    runner: Arc<dyn CommandRunner>,
) -> Arc<dyn CounterStore> {
    Arc::new(SqliteCounterStore::new(runner, &config.ganesha.db_path))
}

/// Create the control channel into the live Ganesha daemon
pub fn create_control_channel(runner: Arc<dyn CommandRunner>) -> Arc<dyn ControlChannel> {
    Arc::new(DbusControlChannel::new(runner))
}

/// Create the reloader for the configured service unit
pub fn create_service_reloader(
    config: &GaneshaExportsConfig,
    runner: Arc<dyn CommandRunner>,
) -> ServiceReloader {
    ServiceReloader::new(runner, config.ganesha.service_name.clone())
}
