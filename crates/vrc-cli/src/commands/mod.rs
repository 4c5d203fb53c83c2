//! CLI command implementations

mod connect;
mod disconnect;
mod print_config;
mod status;

pub use connect::{connect_command, ProgressRenderer};
pub use disconnect::disconnect_command;
pub use print_config::print_config_command;
pub use status::status_command;

use vrc_core::traits::VpnBackend;

use crate::output::{print_error, print_info};

/// Process exit code of a successful command
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code of a command that ended in a failure state
pub const EXIT_FAILURE: i32 = 1;

/// Report whether the VPN client is usable, printing the failure if not
fn check_installation(vpn: &dyn VpnBackend) -> bool {
    print_info("Checking for Cisco AnyConnect installation");
    match vrc_orchestrator::check_installation(vpn) {
        Ok(()) => true,
        Err(kind) => {
            print_error(&kind.to_string());
            false
        }
    }
}
