//! Defaults providers backed by the platform's own client state

#[cfg(target_os = "macos")]
mod bookmarks;
mod preferences;
#[cfg(windows)]
mod registry;

pub use preferences::{parse_preferences, preferences_path};

use async_trait::async_trait;
use tracing::debug;

use crate::error::DefaultsError;
use crate::platform::Platform;
use crate::traits::DefaultsProvider;
use crate::types::{RdpDefaults, VpnDefaults};

/// Reads AnyConnect preferences and remote-desktop history of this machine
#[derive(Debug, Clone)]
pub struct PlatformDefaults {
    platform: Platform,
}

impl PlatformDefaults {
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
        }
    }
}

impl Default for PlatformDefaults {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DefaultsProvider for PlatformDefaults {
    async fn vpn_defaults(&self) -> Result<VpnDefaults, DefaultsError> {
        let path = preferences_path(&self.platform)?;
        let xml = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DefaultsError::Unavailable {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let defaults = parse_preferences(&xml)?;
        debug!(path = %path.display(), server = %defaults.server, "Read VPN defaults");
        Ok(defaults)
    }

    async fn rdp_defaults(&self) -> Result<RdpDefaults, DefaultsError> {
        if let Platform::Unsupported(os) = &self.platform {
            return Err(DefaultsError::Unsupported(os.clone()));
        }

        let server = tokio::task::spawn_blocking(recent_rdp_host)
            .await
            .map_err(|e| DefaultsError::Malformed(format!("defaults reader panicked: {}", e)))??;
        debug!(%server, "Read remote desktop defaults");
        Ok(RdpDefaults { server })
    }
}

#[cfg(windows)]
fn recent_rdp_host() -> Result<String, DefaultsError> {
    registry::most_recent_host()
}

#[cfg(target_os = "macos")]
fn recent_rdp_host() -> Result<String, DefaultsError> {
    bookmarks::first_bookmark_host()
}

#[cfg(not(any(windows, target_os = "macos")))]
fn recent_rdp_host() -> Result<String, DefaultsError> {
    Err(DefaultsError::Unsupported(std::env::consts::OS.to_string()))
}
