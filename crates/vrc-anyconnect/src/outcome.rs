//! Outcomes of connect and disconnect attempts

use std::fmt;

/// Result of a single connect attempt, as seen by the orchestrator.
///
/// `AlreadyConnected` is a positive outcome: the desired end state holds even
/// though the client reported it through its error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// The tunnel was established by this attempt
    Connected,
    /// The tunnel was already up before this attempt
    AlreadyConnected,
    /// The client rejected the group, username or password
    IncorrectLogin,
    /// The reachability check failed before anything was spawned
    NoInternet,
    /// The running operating system has no client entry
    UnsupportedPlatform(String),
    /// The client failed in a way no rule recognises; carries the raw output
    ProcessFailure(String),
}

impl ConnectionOutcome {
    /// Whether the VPN is up after this outcome
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Connected | Self::AlreadyConnected)
    }
}

impl fmt::Display for ConnectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::AlreadyConnected => write!(f, "already connected"),
            Self::IncorrectLogin => write!(f, "incorrect login"),
            Self::NoInternet => write!(f, "no internet connection"),
            Self::UnsupportedPlatform(os) => write!(f, "unsupported platform `{}`", os),
            Self::ProcessFailure(raw) => write!(f, "client failure: {}", raw),
        }
    }
}

/// Result of a single disconnect attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// The tunnel was torn down by this attempt
    Disconnected,
    /// There was no tunnel to tear down
    NotConnected,
    /// Unrecognised failure; carries the raw output
    Failed(String),
}
