//! Core error types for vpn-rdp-connecter

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use vrc_anyconnect::ResponseError;

/// Errors raised by the VPN and remote-desktop process adapters
#[derive(Error, Debug)]
pub enum BackendError {
    /// A required credential was empty
    #[error("Missing credential: {field}")]
    MissingCredentials { field: &'static str },

    /// The running operating system has no command table entry
    #[error("Unsupported platform `{0}`")]
    UnsupportedPlatform(String),

    /// The reachability check failed
    #[error("No internet connection")]
    NoInternet,

    /// A group name did not match any group offered by the server
    #[error("Could not find group `{group}` on {server}")]
    GroupNotFound { server: String, group: String },

    /// The client failed in a way no rule recognises
    #[error("VPN client failure: {0}")]
    ProcessFailure(String),

    /// An external process did not finish in time
    #[error("`{command}` did not finish within {after:?}")]
    Timeout { command: String, after: Duration },

    /// An external process could not be started
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Client output could not be read or understood
    #[error("Unexpected client output: {0}")]
    Response(#[from] ResponseError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// I/O error while reading or writing a config file
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by defaults providers
#[derive(Error, Debug)]
pub enum DefaultsError {
    /// No defaults source exists on this platform
    #[error("No defaults source on platform `{0}`")]
    Unsupported(String),

    /// The defaults source could not be read
    #[error("Defaults unavailable from {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    /// The defaults source was read but made no sense
    #[error("Malformed defaults: {0}")]
    Malformed(String),

    /// Resolving a default through the VPN client failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl DefaultsError {
    /// Whether this failure means the machine is offline
    pub fn is_no_internet(&self) -> bool {
        matches!(self, Self::Backend(BackendError::NoInternet))
    }
}
