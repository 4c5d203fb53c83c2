//! Status command implementation

use anyhow::Result;
use vrc_orchestrator::{check_statuses, StatusReport};

use super::{check_installation, EXIT_FAILURE, EXIT_SUCCESS};
use crate::context::AppContext;
use crate::output::{print_info, print_negative, print_success};

/// Execute the status command
pub async fn status_command(context: &AppContext, only_vpn: bool, json: bool) -> Result<i32> {
    if json {
        if let Err(kind) = vrc_orchestrator::check_installation(context.vpn.as_ref()) {
            println!("{}", serde_json::json!({ "error": kind.to_string() }));
            return Ok(EXIT_FAILURE);
        }
    } else if !check_installation(context.vpn.as_ref()) {
        return Ok(EXIT_FAILURE);
    }
    if !json {
        print_info("Checking statuses");
    }

    let report = check_statuses(
        context.vpn.as_ref(),
        context.rdp.as_ref(),
        context.store.as_ref(),
        only_vpn,
    )
    .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(EXIT_SUCCESS)
}

fn print_report(report: &StatusReport) {
    match (report.vpn_connected, &report.group_name) {
        (true, Some(group)) => print_success(&format!("VPN: connected ({})", group)),
        (true, None) => print_success("VPN: connected"),
        (false, _) => print_negative("VPN: disconnected"),
    }

    match report.rdp_open {
        Some(true) => print_success("RDP: opened"),
        Some(false) => print_negative("RDP: not opened"),
        None => println!("- RDP: skipped check"),
    }
}
