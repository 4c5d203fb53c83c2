//! Login group catalog

use std::sync::Arc;

use tracing::debug;
use vrc_core::traits::VpnBackend;
use vrc_core::{BackendError, VpnGroup};

/// Whether a group value is already a numeric identifier
pub fn is_group_number(group: &str) -> bool {
    let group = group.trim();
    !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit())
}

/// Number of the group whose name matches exactly
pub fn find_group_number(groups: &[VpnGroup], name: &str) -> Option<String> {
    groups
        .iter()
        .find(|group| group.name == name.trim())
        .map(|group| group.number.clone())
}

/// Lists a server's login groups and resolves names to numbers
#[derive(Clone)]
pub struct GroupCatalog {
    vpn: Arc<dyn VpnBackend>,
}

impl GroupCatalog {
    pub fn new(vpn: Arc<dyn VpnBackend>) -> Self {
        Self { vpn }
    }

    /// Groups offered by `server`, in listing order
    pub async fn list(&self, server: &str) -> Result<Vec<VpnGroup>, BackendError> {
        self.vpn.list_groups(server).await
    }

    /// Resolve a stored group to its numeric identifier.
    ///
    /// Numeric input is returned as-is without querying the server.
    pub async fn resolve_name_to_number(
        &self,
        server: &str,
        name: &str,
    ) -> Result<String, BackendError> {
        if is_group_number(name) {
            return Ok(name.trim().to_string());
        }

        let groups = self.list(server).await?;
        let number = find_group_number(&groups, name).ok_or_else(|| BackendError::GroupNotFound {
            server: server.to_string(),
            group: name.to_string(),
        })?;
        debug!(server, group = name, %number, "Resolved VPN group");
        Ok(number)
    }
}
