//! Process adapters for the external VPN and remote-desktop clients

mod rdp;
mod vpn;

pub use rdp::RemoteDesktopClient;
pub use vpn::AnyConnectCli;
