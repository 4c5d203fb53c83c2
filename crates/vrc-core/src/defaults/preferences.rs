//! AnyConnect preferences file
//!
//! The client remembers the last server, group and user in a small XML file.

use std::path::PathBuf;

use roxmltree::Document;

use crate::error::DefaultsError;
use crate::platform::Platform;
use crate::types::VpnDefaults;

/// Location of the preferences file on a platform
pub fn preferences_path(platform: &Platform) -> Result<PathBuf, DefaultsError> {
    let unavailable = |reason: &str| DefaultsError::Unavailable {
        path: PathBuf::new(),
        reason: reason.to_string(),
    };

    match platform {
        Platform::Windows => dirs::data_local_dir()
            .map(|dir| {
                dir.join("Cisco")
                    .join("Cisco AnyConnect Secure Mobility Client")
                    .join("preferences.xml")
            })
            .ok_or_else(|| unavailable("local application data directory is unknown")),
        Platform::MacOs => dirs::home_dir()
            .map(|home| home.join(".anyconnect"))
            .ok_or_else(|| unavailable("home directory is unknown")),
        Platform::Unsupported(os) => Err(DefaultsError::Unsupported(os.clone())),
    }
}

/// Extract server, group and user from the preferences XML.
///
/// The group is returned in `group_name` as stored; resolving it to a number
/// needs the server's group listing.
pub fn parse_preferences(xml: &str) -> Result<VpnDefaults, DefaultsError> {
    let document = Document::parse(xml)
        .map_err(|e| DefaultsError::Malformed(format!("preferences are not XML: {}", e)))?;

    let mut defaults = VpnDefaults::default();
    let mut found = false;

    for node in document.descendants().filter(|n| n.is_element()) {
        let slot = match node.tag_name().name() {
            "DefaultHostName" => &mut defaults.server,
            "DefaultGroup" => &mut defaults.group_name,
            "DefaultUser" => &mut defaults.username,
            _ => continue,
        };
        found = true;
        *slot = node.text().unwrap_or_default().trim().to_string();
    }

    if !found {
        return Err(DefaultsError::Malformed(
            "no AnyConnect defaults in preferences".to_string(),
        ));
    }
    Ok(defaults)
}
