//! Traits for facts gathered from the surrounding machine

use async_trait::async_trait;

use crate::error::DefaultsError;
use crate::types::{RdpDefaults, VpnDefaults};

/// Connectivity check run before anything talks to a VPN server
#[async_trait]
pub trait Reachability: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Read-only source of previously used connection parameters
#[async_trait]
pub trait DefaultsProvider: Send + Sync {
    /// Server, group and username the VPN client last used.
    ///
    /// `group` is left empty; `group_name` holds the group as stored, which
    /// may be a name or a number.
    async fn vpn_defaults(&self) -> Result<VpnDefaults, DefaultsError>;

    /// Host the remote-desktop client last connected to
    async fn rdp_defaults(&self) -> Result<RdpDefaults, DefaultsError>;
}
