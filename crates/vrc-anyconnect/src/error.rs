//! Response error types

use thiserror::Error;

/// Errors raised while reading the client's text output
#[derive(Error, Debug)]
pub enum ResponseError {
    /// `stats` output had no authoritative `connection state:` line
    #[error("No connection state found in client output")]
    MissingConnectionState,

    /// I/O error while reading the client's output stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
