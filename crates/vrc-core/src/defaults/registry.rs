//! Remote Desktop Connection history in the Windows registry

use std::path::PathBuf;

use winreg::enums::HKEY_CURRENT_USER;
use winreg::RegKey;

use crate::error::DefaultsError;

const RECENT_SERVERS_KEY: &str = "Software\\Microsoft\\Terminal Server Client\\Default";

/// Most recently used host (`MRU0`), empty when there is no history
pub(super) fn most_recent_host() -> Result<String, DefaultsError> {
    let unavailable = |e: std::io::Error| DefaultsError::Unavailable {
        path: PathBuf::from(format!("HKCU\\{}", RECENT_SERVERS_KEY)),
        reason: e.to_string(),
    };

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = match hkcu.open_subkey(RECENT_SERVERS_KEY) {
        Ok(key) => key,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => return Err(unavailable(e)),
    };

    match key.get_value::<String, _>("MRU0") {
        Ok(host) => Ok(host.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(unavailable(e)),
    }
}
