//! vrc-anyconnect: Text protocol of the Cisco AnyConnect command-line client
//!
//! The client has no structured API. This crate owns everything that reads or
//! writes its text: the stdin scripts of `-s` mode, framing of the interactive
//! group prompt, parsing of `stats` and group listings, and the ordered rules
//! that classify a captured response. Nothing here spawns a process.

pub mod classify;
pub mod codec;
pub mod error;
pub mod groups;
pub mod outcome;
pub mod status;

pub use classify::{classify_connect, classify_disconnect, ClientFlavor, CliResponse, Rule};
pub use codec::{login_token, CliScriptCodec, GroupPromptCodec, ScriptCommand};
pub use error::ResponseError;
pub use groups::{default_groups, parse_group_listing, VpnGroup, CREDENTIALS_PROMPT, GROUP_PROMPT};
pub use outcome::{ConnectionOutcome, DisconnectOutcome};
pub use status::{is_connected, parse_connection_state};
