//! vrc-core: Core abstractions and configuration for vpn-rdp-connecter
//!
//! This crate provides the domain types, error taxonomy, configuration and
//! credential store, the platform command table, and the process adapters
//! that drive the AnyConnect and remote-desktop clients.

pub mod backend;
pub mod config;
pub mod defaults;
pub mod error;
pub mod platform;
pub mod process;
pub mod reachability;
pub mod traits;
pub mod types;

pub use backend::{AnyConnectCli, RemoteDesktopClient};
pub use error::{BackendError, ConfigError, DefaultsError};
pub use platform::{CommandSpec, CommandTable, Operation, Platform};
pub use process::SystemRunner;
pub use reachability::HttpReachability;
pub use types::{RdpDefaults, RdpTarget, SavedConfig, VpnCredentials, VpnDefaults, VpnGroup};
pub use vrc_anyconnect::{ConnectionOutcome, DisconnectOutcome};
