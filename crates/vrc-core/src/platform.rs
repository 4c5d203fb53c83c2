//! Platform command table
//!
//! Maps each operation to the executable and arguments issued on a given
//! operating system. Pure data: output interpretation lives in the adapters.

use std::fmt;
use std::path::{Path, PathBuf};

use vrc_anyconnect::ClientFlavor;

use crate::error::BackendError;

const WINDOWS_VPN_CLIENT: &str =
    "C:/Program Files (x86)/Cisco/Cisco AnyConnect Secure Mobility Client/vpncli.exe";
const MACOS_VPN_CLIENT: &str = "/opt/cisco/anyconnect/bin/vpn";

const MACOS_RDP_APP: &str = "/Applications/Microsoft Remote Desktop.app";
const MACOS_RDP_EXECUTABLE: &str =
    "/Applications/Microsoft Remote Desktop.app/Contents/MacOS/Microsoft Remote Desktop";

/// Operating systems with a row in the command table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    /// Anything else; carries the OS name
    Unsupported(String),
}

impl Platform {
    /// Platform of the running process
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS name as reported by `std::env::consts::OS`
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Fail with `UnsupportedPlatform` unless a row exists
    pub fn ensure_supported(&self) -> Result<(), BackendError> {
        match self {
            Self::Unsupported(os) => Err(BackendError::UnsupportedPlatform(os.clone())),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::MacOs => write!(f, "macos"),
            Self::Unsupported(os) => write!(f, "{}", os),
        }
    }
}

/// Operations the adapters issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// Scripted connect; the script goes to stdin
    Connect,
    /// Scripted disconnect; the script goes to stdin
    Disconnect,
    /// `stats`
    Status,
    /// Interactive connect, stopped at the group prompt
    ListGroups { server: &'a str },
    OpenRemoteDesktop { server: &'a str },
    CloseRemoteDesktop,
}

/// Executable plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub executable: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How the remote-desktop client shows up in the process list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMarker {
    /// Executable path contains the text, ignoring case
    PathContains(&'static str),
    /// Executable path is exactly this
    PathEquals(&'static str),
}

impl ProcessMarker {
    /// Whether an executable path matches this marker
    pub fn matches(&self, executable: &Path) -> bool {
        let path = executable.to_string_lossy();
        match self {
            Self::PathContains(needle) => path.to_lowercase().contains(&needle.to_lowercase()),
            Self::PathEquals(expected) => path == *expected,
        }
    }
}

/// The command table, with an optional VPN client path override
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    vpn_client_override: Option<PathBuf>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this VPN client path instead of the platform default
    pub fn with_vpn_client_path(mut self, path: Option<PathBuf>) -> Self {
        self.vpn_client_override = path;
        self
    }

    /// Path of the VPN client binary on a platform
    pub fn vpn_client_path(&self, platform: &Platform) -> Result<PathBuf, BackendError> {
        platform.ensure_supported()?;
        if let Some(path) = &self.vpn_client_override {
            return Ok(path.clone());
        }
        Ok(match platform {
            Platform::Windows => PathBuf::from(WINDOWS_VPN_CLIENT),
            _ => PathBuf::from(MACOS_VPN_CLIENT),
        })
    }

    /// Look up the command for an operation
    pub fn command_for(
        &self,
        operation: Operation<'_>,
        platform: &Platform,
    ) -> Result<CommandSpec, BackendError> {
        platform.ensure_supported()?;

        let spec = match operation {
            Operation::Connect | Operation::Disconnect => {
                CommandSpec::new(self.vpn_client_path(platform)?).arg("-s")
            }
            Operation::Status => CommandSpec::new(self.vpn_client_path(platform)?).arg("stats"),
            Operation::ListGroups { server } => CommandSpec::new(self.vpn_client_path(platform)?)
                .arg("connect")
                .arg(server),
            Operation::OpenRemoteDesktop { server } => match platform {
                Platform::Windows => {
                    let spec = CommandSpec::new("cmd.exe")
                        .arg("/c")
                        .arg("start")
                        .arg("mstsc.exe");
                    if server.trim().is_empty() {
                        spec
                    } else {
                        spec.arg(format!("/v:{}", server.trim()))
                    }
                }
                _ => CommandSpec::new("open").arg(MACOS_RDP_APP),
            },
            Operation::CloseRemoteDesktop => match platform {
                Platform::Windows => CommandSpec::new("taskkill").arg("/im").arg("mstsc.exe"),
                _ => CommandSpec::new("pkill").arg("Microsoft Remote Desktop"),
            },
        };
        Ok(spec)
    }

    /// Response shape of the platform's VPN client
    pub fn flavor(&self, platform: &Platform) -> ClientFlavor {
        match platform {
            Platform::MacOs => ClientFlavor::TrailingState,
            _ => ClientFlavor::Standard,
        }
    }

    /// Process-list marker of the platform's remote-desktop client
    pub fn rdp_process_marker(&self, platform: &Platform) -> Result<ProcessMarker, BackendError> {
        platform.ensure_supported()?;
        Ok(match platform {
            Platform::Windows => ProcessMarker::PathContains("mstsc"),
            _ => ProcessMarker::PathEquals(MACOS_RDP_EXECUTABLE),
        })
    }
}
