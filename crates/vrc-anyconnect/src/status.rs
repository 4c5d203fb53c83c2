//! Parsing of `stats` output

use crate::error::ResponseError;

const STATE_LABEL: &str = "connection state:";

/// Extract the authoritative connection state from `stats` output.
///
/// The client prints two `Connection State:` lines; the one that also mentions
/// `management` describes the management tunnel and is skipped.
pub fn parse_connection_state(output: &str) -> Result<String, ResponseError> {
    output
        .lines()
        .find_map(|line| {
            let lower = line.to_ascii_lowercase();
            if lower.contains("management") {
                return None;
            }
            let start = lower.find(STATE_LABEL)? + STATE_LABEL.len();
            Some(line[start..].trim().to_string())
        })
        .ok_or(ResponseError::MissingConnectionState)
}

/// Whether `stats` output reports an established tunnel
pub fn is_connected(output: &str) -> Result<bool, ResponseError> {
    parse_connection_state(output).map(|state| state.eq_ignore_ascii_case("connected"))
}
