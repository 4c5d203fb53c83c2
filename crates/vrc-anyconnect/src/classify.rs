//! Ordered classification of captured client responses
//!
//! The client reports "the end state already holds" and "the operation failed"
//! through the same channel with overlapping text. Every decision about what a
//! response means lives here, as an ordered list of `(Rule, verdict)` pairs per
//! operation. The first matching rule wins; no match is a process failure.
//!
//! All comparisons run on the normalized response: every `VPN>` prompt removed,
//! surrounding whitespace trimmed, compared case-insensitively.

use std::sync::OnceLock;

use regex::Regex;

use crate::outcome::{ConnectionOutcome, DisconnectOutcome};

/// Interactive prompt the client prints before every command in `-s` mode
pub const PROMPT: &str = "VPN>";

/// Which variant of the client produced a response.
///
/// The macOS client appends a trailing notice after its final `state:` line,
/// so the authoritative state sits on the second-to-last line there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientFlavor {
    /// Final state is the last line (Windows client)
    #[default]
    Standard,
    /// Final state is the second-to-last line (macOS client)
    TrailingState,
}

/// A captured client response plus the facts the rules need about it
#[derive(Debug, Clone)]
pub struct CliResponse {
    raw: String,
    exited_cleanly: bool,
    flavor: ClientFlavor,
    server: Option<String>,
}

impl CliResponse {
    /// Wrap raw output; `exited_cleanly` is the process exit status
    pub fn new(raw: impl Into<String>, exited_cleanly: bool) -> Self {
        Self {
            raw: raw.into(),
            exited_cleanly,
            flavor: ClientFlavor::Standard,
            server: None,
        }
    }

    /// Set the client flavor that produced the output
    pub fn with_flavor(mut self, flavor: ClientFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Set the server the command targeted
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Raw output as captured
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Output with prompts stripped and whitespace trimmed
    pub fn normalized(&self) -> String {
        self.raw.replace(PROMPT, "").trim().to_string()
    }
}

/// A single predicate over a normalized response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Ends with `Login failed.`
    LoginFailed,
    /// Ends with `Connected to {server}.`
    ConnectedNotice,
    /// Another VPN application holds the connect functionality
    AnotherClientRunning,
    /// Trailing-state clients only: second-to-last line reads `state: {0}`
    TrailingState(&'static str),
    /// Ends with `The VPN client is not connected.`
    NotConnectedNotice,
    /// Exit status success and no `error:` line anywhere
    ExitedCleanly,
}

/// Ordered rules for `connect`
pub const CONNECT_RULES: &[(Rule, ConnectVerdict)] = &[
    (Rule::LoginFailed, ConnectVerdict::IncorrectLogin),
    (Rule::ConnectedNotice, ConnectVerdict::AlreadyConnected),
    (Rule::AnotherClientRunning, ConnectVerdict::AlreadyConnected),
    (Rule::TrailingState("connected"), ConnectVerdict::Connected),
    (Rule::ExitedCleanly, ConnectVerdict::Connected),
];

/// Ordered rules for `disconnect`
pub const DISCONNECT_RULES: &[(Rule, DisconnectVerdict)] = &[
    (Rule::NotConnectedNotice, DisconnectVerdict::NotConnected),
    (Rule::TrailingState("disconnected"), DisconnectVerdict::Disconnected),
    (Rule::ExitedCleanly, DisconnectVerdict::Disconnected),
];

/// Verdicts a connect rule can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectVerdict {
    Connected,
    AlreadyConnected,
    IncorrectLogin,
}

/// Verdicts a disconnect rule can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectVerdict {
    Disconnected,
    NotConnected,
}

fn another_client_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?is)connect not available[.:]?\s*another (?:anyconnect|vpn) application is running\s*or this functionality was not requested by this application",
        )
        .expect("valid already-connected pattern")
    })
}

/// Strip a leading `>>` status marker and surrounding whitespace
fn strip_marker(line: &str) -> &str {
    line.trim().trim_start_matches(">>").trim()
}

impl Rule {
    /// Evaluate this rule against a response
    pub fn matches(&self, response: &CliResponse) -> bool {
        let text = response.normalized();
        let lower = text.to_lowercase();

        match self {
            Rule::LoginFailed => lower.ends_with("login failed."),
            Rule::ConnectedNotice => match &response.server {
                Some(server) if !server.is_empty() => {
                    lower.ends_with(&format!("connected to {}.", server.to_lowercase()))
                }
                _ => false,
            },
            Rule::AnotherClientRunning => another_client_pattern().is_match(&text),
            Rule::TrailingState(expected) => {
                if response.flavor != ClientFlavor::TrailingState {
                    return false;
                }
                // Shorter output has no second-to-last line to inspect.
                let lines: Vec<&str> = text.lines().collect();
                if lines.len() < 2 {
                    return false;
                }
                strip_marker(lines[lines.len() - 2])
                    .eq_ignore_ascii_case(&format!("state: {}", expected))
            }
            Rule::NotConnectedNotice => lower.ends_with("the vpn client is not connected."),
            Rule::ExitedCleanly => {
                response.exited_cleanly
                    && !text
                        .lines()
                        .any(|line| strip_marker(line).to_lowercase().starts_with("error:"))
            }
        }
    }
}

/// Return the verdict of the first rule that matches
pub fn first_match<T: Copy>(rules: &[(Rule, T)], response: &CliResponse) -> Option<(Rule, T)> {
    rules
        .iter()
        .find(|(rule, _)| rule.matches(response))
        .copied()
}

/// Classify the response of a connect script
pub fn classify_connect(response: &CliResponse) -> ConnectionOutcome {
    match first_match(CONNECT_RULES, response) {
        Some((rule, verdict)) => {
            tracing::debug!(?rule, ?verdict, "Classified connect response");
            match verdict {
                ConnectVerdict::Connected => ConnectionOutcome::Connected,
                ConnectVerdict::AlreadyConnected => ConnectionOutcome::AlreadyConnected,
                ConnectVerdict::IncorrectLogin => ConnectionOutcome::IncorrectLogin,
            }
        }
        None => ConnectionOutcome::ProcessFailure(response.raw().trim().to_string()),
    }
}

/// Classify the response of a disconnect script
pub fn classify_disconnect(response: &CliResponse) -> DisconnectOutcome {
    match first_match(DISCONNECT_RULES, response) {
        Some((rule, verdict)) => {
            tracing::debug!(?rule, ?verdict, "Classified disconnect response");
            match verdict {
                DisconnectVerdict::Disconnected => DisconnectOutcome::Disconnected,
                DisconnectVerdict::NotConnected => DisconnectOutcome::NotConnected,
            }
        }
        None => DisconnectOutcome::Failed(response.raw().trim().to_string()),
    }
}
