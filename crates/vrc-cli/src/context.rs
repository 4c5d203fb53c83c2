//! Adapter wiring for the running platform

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;
use vrc_core::config::{self, AppSettings, TomlCredentialStore};
use vrc_core::defaults::PlatformDefaults;
use vrc_core::traits::{RdpBackend, VpnBackend};
use vrc_core::{AnyConnectCli, CommandTable, HttpReachability, RemoteDesktopClient, SystemRunner};
use vrc_orchestrator::ConnectionOrchestrator;

/// Real adapters built from the settings in a configuration directory
pub struct AppContext {
    pub vpn: Arc<dyn VpnBackend>,
    pub rdp: Arc<dyn RdpBackend>,
    pub store: Arc<TomlCredentialStore>,
}

impl AppContext {
    pub fn load(config_dir: &Path) -> Result<Self> {
        let settings_file = config::settings_path(config_dir);
        let settings = AppSettings::load_or_default(&settings_file)
            .with_context(|| format!("Failed to load settings from {:?}", settings_file))?;
        debug!(?settings, "Loaded settings");

        let reachability = Arc::new(HttpReachability::new(&settings.reachability));
        let table = CommandTable::new().with_vpn_client_path(settings.vpn_client_path.clone());

        let vpn = AnyConnectCli::new(SystemRunner::new(), reachability)
            .with_table(table)
            .with_timeouts(settings.timeouts.clone());
        let rdp = RemoteDesktopClient::new(SystemRunner::new()).with_timeouts(settings.timeouts);

        Ok(Self {
            vpn: Arc::new(vpn),
            rdp: Arc::new(rdp),
            store: Arc::new(credential_store(config_dir)),
        })
    }

    /// Orchestrator over these adapters and the platform defaults
    pub fn orchestrator(&self) -> ConnectionOrchestrator {
        ConnectionOrchestrator::new(
            self.vpn.clone(),
            self.rdp.clone(),
            self.store.clone(),
            Arc::new(PlatformDefaults::new()),
        )
    }
}

/// Credential store inside a configuration directory
pub fn credential_store(config_dir: &Path) -> TomlCredentialStore {
    TomlCredentialStore::in_dir(config_dir)
}

/// The `--config` directory, or the platform default
pub fn config_dir(overridden: Option<&PathBuf>) -> PathBuf {
    overridden.cloned().unwrap_or_else(config::default_config_dir)
}
