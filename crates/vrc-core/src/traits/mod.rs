//! Core trait definitions

mod backend;
mod environment;
mod runner;

pub use backend::{RdpBackend, VpnBackend};
pub use environment::{DefaultsProvider, Reachability};
pub use runner::{CommandRunner, ProcessOutput, PromptRead};
