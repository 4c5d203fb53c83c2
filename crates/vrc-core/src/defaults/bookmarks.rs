//! Microsoft Remote Desktop bookmark database on macOS

use std::path::PathBuf;

use rusqlite::{Connection, OpenFlags};

use crate::error::DefaultsError;

const DATABASE: &str = "Library/Containers/com.microsoft.rdc.macos/Data/Library/Application Support/com.microsoft.rdc.macos/com.microsoft.rdc.application-data.sqlite";

/// Host name of the first saved bookmark, empty when there are none
pub(super) fn first_bookmark_host() -> Result<String, DefaultsError> {
    let path = dirs::home_dir()
        .map(|home| home.join(DATABASE))
        .ok_or_else(|| DefaultsError::Unavailable {
            path: PathBuf::from(DATABASE),
            reason: "home directory is unknown".to_string(),
        })?;
    let unavailable = |e: rusqlite::Error| DefaultsError::Unavailable {
        path: path.clone(),
        reason: e.to_string(),
    };

    let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(unavailable)?;

    match conn.query_row("SELECT ZHOSTNAME FROM ZBOOKMARKENTITY LIMIT 1", [], |row| {
        row.get::<_, Option<String>>(0)
    }) {
        Ok(host) => Ok(host.unwrap_or_default().trim().to_string()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(String::new()),
        Err(e) => Err(unavailable(e)),
    }
}
