//! Output formatting utilities for the CLI
//!
//! Colored status lines for progress and results, and the table printed by
//! `print-config`.

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use tabled::{settings::Style, Table, Tabled};
use vrc_core::SavedConfig;

/// Group label shown for a stored group, e.g. `Engineering (1)`
pub fn group_label(group_name: &str, group: &str) -> String {
    let name = if group_name.is_empty() {
        "Default"
    } else {
        group_name
    };
    format!("{} ({})", name, group)
}

/// Format a saved configuration as a two-column table
///
/// The password is replaced by one `*` per character unless `show_password`
/// is set.
pub fn format_config(config: &SavedConfig, show_password: bool) -> String {
    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "SETTING")]
        name: &'static str,
        #[tabled(rename = "VALUE")]
        value: String,
    }

    let password = if show_password {
        config.vpn.password.clone()
    } else {
        "*".repeat(config.vpn.password.chars().count())
    };
    let only_vpn = if config.only_vpn { "✓" } else { "✗" };

    let rows = vec![
        ConfigRow {
            name: "VPN server",
            value: config.vpn.server.clone(),
        },
        ConfigRow {
            name: "Group",
            value: group_label(&config.vpn.group_name, &config.vpn.group),
        },
        ConfigRow {
            name: "Username",
            value: config.vpn.username.clone(),
        },
        ConfigRow {
            name: "Password",
            value: password,
        },
        ConfigRow {
            name: "RDP server",
            value: config.rdp.server.clone(),
        },
        ConfigRow {
            name: "Only connect to VPN",
            value: only_vpn.to_string(),
        },
    ];

    Table::new(rows).with(Style::rounded()).to_string()
}

fn print_prefixed(mut out: impl std::io::Write, color: Color, prefix: &str, msg: &str) {
    let _ = crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(prefix),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    print_prefixed(std::io::stdout(), Color::Green, "✓ ", msg);
}

/// Print an error message in red with an X prefix to stderr
pub fn print_error(msg: &str) {
    print_prefixed(std::io::stderr(), Color::Red, "✗ ", msg);
}

/// Print an in-progress message in cyan
pub fn print_info(msg: &str) {
    print_prefixed(std::io::stdout(), Color::Cyan, "ℹ ", msg);
}

/// Print a negative result to stdout, for status output
pub fn print_negative(msg: &str) {
    print_prefixed(std::io::stdout(), Color::Red, "✗ ", msg);
}

/// Print a follow-up command suggestion, e.g. after a failed login
pub fn print_suggestion(command: &str) {
    println!("Use {}", command);
}
