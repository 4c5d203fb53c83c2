//! Login group listing
//!
//! `connect {server}` prints the server's login groups as numbered lines and
//! then blocks on a `Group: ` prompt. The caller stops the client at the prompt
//! and hands the buffered text to [`parse_group_listing`].

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prompt the client prints when it waits for a group choice
pub const GROUP_PROMPT: &str = "Group: ";

/// Prompt that precedes the numbered group list
pub const CREDENTIALS_PROMPT: &str = "Please enter your username and password.";

/// A login group offered by a VPN server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VpnGroup {
    /// Numeric identifier the client expects at the group prompt
    pub number: String,
    /// Human-readable group name
    pub name: String,
}

impl VpnGroup {
    /// Create a new group
    pub fn new(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
        }
    }
}

/// The single group reported when the server offers no group choice
pub fn default_groups() -> Vec<VpnGroup> {
    vec![VpnGroup::new("0", "Default")]
}

fn group_line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)\)\s*(.*)$").expect("valid group line pattern"))
}

/// Parse the numbered group lines out of buffered client output.
///
/// Order is preserved as emitted. A number seen twice keeps its first name.
pub fn parse_group_listing(text: &str) -> Vec<VpnGroup> {
    let mut seen = HashSet::new();

    text.split(CREDENTIALS_PROMPT)
        .flat_map(str::lines)
        .map(str::trim)
        .filter_map(|line| {
            let captures = group_line_pattern().captures(line)?;
            let number = captures.get(1)?.as_str().to_string();
            let name = captures.get(2)?.as_str().trim().to_string();
            Some(VpnGroup { number, name })
        })
        .filter(|group| seen.insert(group.number.clone()))
        .collect()
}
