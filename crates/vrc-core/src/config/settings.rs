//! Optional tool settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Settings read from `settings.toml`.
///
/// Every field has a default so the file may be absent or partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Overrides the VPN client path from the platform table
    pub vpn_client_path: Option<PathBuf>,

    /// Upper bounds for external processes
    pub timeouts: TimeoutConfig,

    /// Connectivity probe configuration
    pub reachability: ReachabilityConfig,
}

impl AppSettings {
    /// Load settings, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match super::load_config(path) {
            Ok(settings) => Ok(settings),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }
}

/// Timeouts in seconds for each kind of external process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub connect: u64,
    pub disconnect: u64,
    pub query: u64,
    pub group_listing: u64,
    pub remote_desktop: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: 120,
            disconnect: 60,
            query: 20,
            group_listing: 30,
            remote_desktop: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect)
    }

    pub fn disconnect(&self) -> Duration {
        Duration::from_secs(self.disconnect)
    }

    pub fn query(&self) -> Duration {
        Duration::from_secs(self.query)
    }

    pub fn group_listing(&self) -> Duration {
        Duration::from_secs(self.group_listing)
    }

    pub fn remote_desktop(&self) -> Duration {
        Duration::from_secs(self.remote_desktop)
    }
}

/// Connectivity probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachabilityConfig {
    /// URLs probed with `HEAD`; any answer means online
    pub probes: Vec<String>,

    /// Per-probe timeout in seconds
    pub timeout: u64,
}

impl Default for ReachabilityConfig {
    fn default() -> Self {
        Self {
            probes: vec![
                "https://www.google.com/generate_204".to_string(),
                "https://1.1.1.1".to_string(),
            ],
            timeout: 5,
        }
    }
}

impl ReachabilityConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
