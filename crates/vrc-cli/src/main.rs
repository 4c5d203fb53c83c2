//! vpn-rdp-connecter CLI
//!
//! One command to connect the Cisco AnyConnect VPN and open Remote Desktop:
//! - no command: connect the VPN, then open Remote Desktop
//! - `disconnect`: close Remote Desktop, then disconnect the VPN
//! - `status`: show VPN and Remote Desktop state
//! - `print-config`: show the stored setup

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vpn_rdp_connecter::commands::{self, EXIT_FAILURE};
use vpn_rdp_connecter::context::{config_dir, AppContext};
use vpn_rdp_connecter::output::print_error;

#[derive(Parser)]
#[command(name = "vpn-rdp-connecter")]
#[command(author, version, about = "Connect to Cisco AnyConnect VPN and Remote Desktop in one command")]
#[command(propagate_version = true)]
struct Cli {
    /// Setup the credentials for Cisco VPN and Microsoft RDP
    #[arg(short, long, global = true)]
    setup: bool,

    /// Only connect to VPN
    #[arg(short, long, global = true)]
    only_vpn: bool,

    /// Used together with --only-vpn to change the default command behavior
    #[arg(long, global = true)]
    save: bool,

    /// Show password in plain text when printing the config
    #[arg(long, global = true)]
    show_password: bool,

    /// Print status as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Configuration directory
    #[arg(short, long, global = true, value_name = "DIR", env = "VPN_RDP_CONNECTER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Disconnect from both VPN and RDP
    #[command(alias = "d")]
    Disconnect,

    /// Show connection statuses for VPN and RDP
    #[command(alias = "s")]
    Status,

    /// Print the VPN and RDP config
    #[command(alias = "p")]
    PrintConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&format!("{:#}", e));
            EXIT_FAILURE
        }
    };

    // The remote-desktop launcher can leave handles behind that would keep
    // the runtime alive, so leave explicitly.
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let config_dir = config_dir(cli.config.as_ref());
    tracing::debug!(config_dir = %config_dir.display(), "Using configuration directory");

    match cli.command {
        Some(Commands::PrintConfig) => {
            commands::print_config_command(&config_dir, cli.show_password)
        }
        Some(Commands::Disconnect) => {
            let context = AppContext::load(&config_dir)?;
            commands::disconnect_command(&context).await
        }
        Some(Commands::Status) => {
            let context = AppContext::load(&config_dir)?;
            commands::status_command(&context, cli.only_vpn, cli.json).await
        }
        None => {
            let context = AppContext::load(&config_dir)?;
            commands::connect_command(&context, cli.setup, cli.only_vpn, cli.save).await
        }
    }
}
