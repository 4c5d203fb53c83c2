//! vpn-rdp-connecter: Command-line interface
//!
//! Wires the platform adapters of `vrc-core` into the orchestrator and
//! renders its progress, the setup wizard and the auxiliary commands.

pub mod commands;
pub mod context;
pub mod output;
pub mod wizard;
