//! Orchestrator states and failure kinds

use std::fmt;

/// Why a run ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The VPN client binary is missing
    NotInstalled,
    /// The reachability check failed
    NoInternet,
    /// The VPN server rejected the login
    IncorrectLogin,
    /// No command table row for this operating system
    UnsupportedPlatform(String),
    /// A credential was still empty when connecting
    MissingCredentials(String),
    /// The user left the setup wizard
    SetupAborted,
    /// Anything unrecognised; carries the diagnostic text
    Fatal(String),
}

impl FailureKind {
    /// Follow-up command worth suggesting to the user
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::IncorrectLogin | Self::MissingCredentials(_) => {
                Some("`vpn-rdp-connecter --setup` to set login details.")
            }
            _ => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled => write!(f, "Could not find Cisco AnyConnect installation"),
            Self::NoInternet => write!(f, "No internet connection"),
            Self::IncorrectLogin => write!(f, "Incorrect login details"),
            Self::UnsupportedPlatform(os) => write!(f, "Unsupported platform `{}`", os),
            Self::MissingCredentials(field) => write!(f, "Missing VPN {}", field),
            Self::SetupAborted => write!(f, "Setup aborted"),
            Self::Fatal(detail) => write!(f, "{}", detail),
        }
    }
}

/// Where a run currently is.
///
/// Runs start in `CheckingInstallation` and end in `Done` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorState {
    CheckingInstallation,
    LoadingDefaults,
    SettingUp,
    LoadedFromStore,
    ConnectingVpn { group_name: String },
    OpeningRemoteDesktop { server: String },
    Done,
    Failed(FailureKind),
}

impl OrchestratorState {
    /// Whether the run is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckingInstallation => write!(f, "checking installation"),
            Self::LoadingDefaults => write!(f, "loading defaults"),
            Self::SettingUp => write!(f, "setting up"),
            Self::LoadedFromStore => write!(f, "loaded from store"),
            Self::ConnectingVpn { .. } => write!(f, "connecting VPN"),
            Self::OpeningRemoteDesktop { .. } => write!(f, "opening remote desktop"),
            Self::Done => write!(f, "done"),
            Self::Failed(kind) => write!(f, "failed: {}", kind),
        }
    }
}
