//! Wiring shared by the CLI commands
//!
//! Builds the export engine for the configured gateway once per command.

use crate::adapters::factory::{
    create_command_runner, create_control_channel, create_counter_store, create_service_reloader,
};
use crate::adapters::{CommandRunner, ServiceReloader};
use crate::config::{load_config, GaneshaExportsConfig};
use crate::core::access::{ExportHelper, StaticFsal};
use crate::core::allocator::ExportIdAllocator;
use crate::core::lifecycle::ExportLifecycleManager;
use crate::core::store::ExportFileStore;
use crate::core::template::load_export_template;
use crate::domain::{ExportError, ExportName, Result};
use std::sync::Arc;

/// Export engine assembled from configuration
pub struct GatewayContext {
    pub config: GaneshaExportsConfig,
    pub runner: Arc<dyn CommandRunner>,
    pub store: Arc<ExportFileStore>,
    pub manager: Arc<ExportLifecycleManager>,
}

impl GatewayContext {
    /// Assemble the engine for `config`
    pub fn new(config: GaneshaExportsConfig) -> Self {
        let runner = create_command_runner(&config);
        let store = Arc::new(ExportFileStore::for_ganesha_config(
            runner.clone(),
            &config.ganesha.config_path,
        ));
        let allocator = Arc::new(ExportIdAllocator::with_seed(
            create_counter_store(&config, runner.clone()),
            config.ganesha.starting_export_id,
        ));
        let manager = Arc::new(ExportLifecycleManager::new(
            store.clone(),
            allocator,
            create_control_channel(runner.clone()),
        ));
        Self {
            config,
            runner,
            store,
            manager,
        }
    }

    /// Load the configuration at `config_path` and assemble the engine for it
    pub fn load(config_path: &str) -> Result<Self> {
        let config = load_config(config_path)?;
        Ok(Self::new(config))
    }

    /// Make sure the export directory exists before mutating it
    pub async fn prepare(&self) -> Result<()> {
        self.store.init().await
    }

    /// Access helper using the configured template and FSAL
    pub async fn export_helper(&self) -> Result<ExportHelper> {
        let template = load_export_template(self.config.ganesha.template_dir()).await?;
        Ok(ExportHelper::new(
            self.manager.clone(),
            template,
            Arc::new(StaticFsal::named(self.config.ganesha.fsal_name.clone())),
        ))
    }

    pub fn reloader(&self) -> ServiceReloader {
        create_service_reloader(&self.config, self.runner.clone())
    }
}

/// Parse an export name given on the command line
pub fn export_name(name: &str) -> Result<ExportName> {
    ExportName::new(name).map_err(ExportError::InvalidName)
}
