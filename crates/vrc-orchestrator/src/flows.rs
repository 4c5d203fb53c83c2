//! Disconnect and status flows

use serde::Serialize;
use tracing::warn;
use vrc_core::config::CredentialStore;
use vrc_core::traits::{RdpBackend, VpnBackend};
use vrc_core::{BackendError, DisconnectOutcome};

use crate::state::FailureKind;

/// Whether the VPN client can be used on this machine
pub fn check_installation(vpn: &dyn VpnBackend) -> Result<(), FailureKind> {
    match vpn.is_installed() {
        Ok(true) => Ok(()),
        Ok(false) => Err(FailureKind::NotInstalled),
        Err(BackendError::UnsupportedPlatform(os)) => Err(FailureKind::UnsupportedPlatform(os)),
        Err(e) => Err(FailureKind::Fatal(e.to_string())),
    }
}

/// Progress of [`disconnect_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectStep {
    ClosingRemoteDesktop,
    ClosedRemoteDesktop,
    DisconnectingVpn,
    DisconnectedVpn(DisconnectOutcome),
}

/// Close the remote desktop, then disconnect the VPN.
///
/// A VPN that was not connected counts as disconnected.
pub async fn disconnect_all(
    vpn: &dyn VpnBackend,
    rdp: &dyn RdpBackend,
    mut on_step: impl FnMut(DisconnectStep) + Send,
) -> Result<DisconnectOutcome, BackendError> {
    on_step(DisconnectStep::ClosingRemoteDesktop);
    rdp.close().await?;
    on_step(DisconnectStep::ClosedRemoteDesktop);

    on_step(DisconnectStep::DisconnectingVpn);
    let outcome = vpn.disconnect().await?;
    on_step(DisconnectStep::DisconnectedVpn(outcome.clone()));
    Ok(outcome)
}

/// Connection state as shown by `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub vpn_connected: bool,
    /// Stored group name, reported only while connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    /// `None` when the check was skipped
    pub rdp_open: Option<bool>,
}

/// Query VPN and remote-desktop state concurrently.
///
/// Failed queries are logged and reported as "not connected"/"not open".
pub async fn check_statuses(
    vpn: &dyn VpnBackend,
    rdp: &dyn RdpBackend,
    store: &dyn CredentialStore,
    only_vpn: bool,
) -> StatusReport {
    let rdp_check = async {
        if only_vpn {
            return None;
        }
        match rdp.is_open().await {
            Ok(open) => Some(open),
            Err(e) => {
                warn!("Remote desktop check failed: {}", e);
                Some(false)
            }
        }
    };
    let (vpn_status, rdp_open) = tokio::join!(vpn.query_status(), rdp_check);

    let vpn_connected = vpn_status.unwrap_or_else(|e| {
        warn!("VPN status query failed: {}", e);
        false
    });

    let group_name = if vpn_connected {
        match store.get("vpn.groupName") {
            Ok(value) => value
                .and_then(|v| v.as_str().map(str::to_string))
                .filter(|name| !name.is_empty()),
            Err(e) => {
                warn!("Failed to read stored group name: {}", e);
                None
            }
        }
    } else {
        None
    };

    StatusReport {
        vpn_connected,
        group_name,
        rdp_open,
    }
}
