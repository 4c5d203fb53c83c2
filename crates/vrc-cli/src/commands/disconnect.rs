//! Disconnect command implementation

use anyhow::Result;
use vrc_core::DisconnectOutcome;
use vrc_orchestrator::{disconnect_all, DisconnectStep};

use super::{check_installation, EXIT_FAILURE, EXIT_SUCCESS};
use crate::context::AppContext;
use crate::output::{print_error, print_info, print_success};

/// Execute the disconnect command
pub async fn disconnect_command(context: &AppContext) -> Result<i32> {
    if !check_installation(context.vpn.as_ref()) {
        return Ok(EXIT_FAILURE);
    }

    let result = disconnect_all(context.vpn.as_ref(), context.rdp.as_ref(), |step| match step {
        DisconnectStep::ClosingRemoteDesktop => print_info("Closing RDP window"),
        DisconnectStep::ClosedRemoteDesktop => print_success("Closed RDP window"),
        DisconnectStep::DisconnectingVpn => print_info("Disconnecting from VPN"),
        DisconnectStep::DisconnectedVpn(DisconnectOutcome::NotConnected) => {
            print_success("VPN was not connected")
        }
        DisconnectStep::DisconnectedVpn(_) => print_success("Disconnected from VPN"),
    })
    .await;

    match result {
        Ok(_) => Ok(EXIT_SUCCESS),
        Err(e) => {
            print_error(&format!("Failed to disconnect: {}", e));
            Ok(EXIT_FAILURE)
        }
    }
}
