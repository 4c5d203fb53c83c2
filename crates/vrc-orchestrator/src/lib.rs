//! vrc-orchestrator: Sequences a VPN connection and a remote-desktop launch
//!
//! The orchestrator resolves credentials from the store, the platform
//! defaults and, when needed, an interactive setup; connects the VPN; and
//! opens the remote desktop once the tunnel is up. It owns no processes
//! itself: every external effect goes through the backend traits of
//! `vrc-core`.

pub mod flows;
pub mod groups;
pub mod orchestrator;
pub mod setup;
pub mod state;

pub use flows::{check_installation, check_statuses, disconnect_all, DisconnectStep, StatusReport};
pub use groups::{find_group_number, is_group_number, GroupCatalog};
pub use orchestrator::{ConnectionOrchestrator, RunReport, RunRequest};
pub use setup::{Answer, FormStep, SetupAssistant, SetupError, SetupField, SetupForm};
pub use state::{FailureKind, OrchestratorState};
