//! Process adapter traits

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{ConnectionOutcome, VpnGroup};
use vrc_anyconnect::DisconnectOutcome;

/// Abstraction over the VPN client
#[async_trait]
pub trait VpnBackend: Send + Sync {
    /// Whether the client binary exists on this machine.
    ///
    /// Fails with `UnsupportedPlatform` when the platform has no client.
    fn is_installed(&self) -> Result<bool, BackendError>;

    /// Connect and classify the client's response.
    ///
    /// Empty arguments fail with `MissingCredentials` before anything is
    /// spawned. Known outcomes, including negative ones, come back as `Ok`.
    async fn connect(
        &self,
        server: &str,
        group: &str,
        username: &str,
        password: &str,
    ) -> Result<ConnectionOutcome, BackendError>;

    /// Tear down the tunnel; "not connected" counts as success
    async fn disconnect(&self) -> Result<DisconnectOutcome, BackendError>;

    /// Whether a tunnel is currently established
    async fn query_status(&self) -> Result<bool, BackendError>;

    /// Login groups offered by a server, in the order the client lists them
    async fn list_groups(&self, server: &str) -> Result<Vec<VpnGroup>, BackendError>;
}

/// Abstraction over the remote-desktop client
#[async_trait]
pub trait RdpBackend: Send + Sync {
    /// Launch the client; resolves when the launcher process exits
    async fn open(&self, server: &str) -> Result<(), BackendError>;

    /// Kill the client
    async fn close(&self) -> Result<(), BackendError>;

    /// Whether the client shows up in the process list
    async fn is_open(&self) -> Result<bool, BackendError>;
}
