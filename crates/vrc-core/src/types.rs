//! Core domain types

use serde::{Deserialize, Serialize};

pub use vrc_anyconnect::{ConnectionOutcome, VpnGroup};

/// Credentials for the VPN concentrator.
///
/// Either all five fields are populated or the set is incomplete and the
/// interactive setup has to run.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VpnCredentials {
    /// Concentrator host name
    pub server: String,
    /// Numeric group identifier
    pub group: String,
    /// Human-readable group name
    pub group_name: String,
    /// Login name
    pub username: String,
    /// Password, stored in clear text
    pub password: String,
}

impl VpnCredentials {
    /// Whether every field is populated
    pub fn is_complete(&self) -> bool {
        [
            &self.server,
            &self.group,
            &self.group_name,
            &self.username,
            &self.password,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// Name of the first empty field among those `connect` requires
    pub fn first_missing_for_connect(&self) -> Option<&'static str> {
        [
            ("server", &self.server),
            ("group", &self.group),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

impl std::fmt::Debug for VpnCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VpnCredentials")
            .field("server", &self.server)
            .field("group", &self.group)
            .field("group_name", &self.group_name)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

/// Remote-desktop target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdpTarget {
    /// Internal host to open a session against
    pub server: String,
}

/// The full persisted record.
///
/// Owned by the orchestrator for one run and written back only when setup
/// completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavedConfig {
    pub vpn: VpnCredentials,
    pub rdp: RdpTarget,
    /// Skip the remote-desktop step
    pub only_vpn: bool,
}

impl SavedConfig {
    /// Whether the record is enough to connect without asking anything.
    ///
    /// The RDP server is only required when the remote-desktop step runs.
    pub fn is_complete(&self) -> bool {
        self.vpn.is_complete() && (self.only_vpn || !self.rdp.server.trim().is_empty())
    }

    /// Fill empty fields from freshly fetched defaults.
    ///
    /// Persisted values always win; a default only lands in a field that is
    /// still empty.
    pub fn merge_defaults(&mut self, vpn: &VpnDefaults, rdp: &RdpDefaults) {
        fill(&mut self.vpn.server, &vpn.server);
        fill(&mut self.vpn.group, &vpn.group);
        fill(&mut self.vpn.group_name, &vpn.group_name);
        fill(&mut self.vpn.username, &vpn.username);
        fill(&mut self.rdp.server, &rdp.server);
    }
}

fn fill(target: &mut String, default: &str) {
    if target.trim().is_empty() && !default.trim().is_empty() {
        *target = default.trim().to_string();
    }
}

/// Previously used VPN parameters read from the client's preferences
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpnDefaults {
    pub server: String,
    /// Numeric group identifier, once resolved
    pub group: String,
    /// Group as the preferences stored it
    pub group_name: String,
    pub username: String,
}

/// Previously used remote-desktop host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RdpDefaults {
    pub server: String,
}
