//! Print-config command implementation

use std::path::Path;

use anyhow::{Context, Result};
use vrc_core::config::CredentialStore;

use super::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::context::credential_store;
use crate::output::{format_config, print_error};

/// Execute the print-config command
///
/// Reads the store only, so it works without the VPN client installed.
pub fn print_config_command(config_dir: &Path, show_password: bool) -> Result<i32> {
    let store = credential_store(config_dir);
    let saved = store
        .load()
        .with_context(|| format!("Failed to read {:?}", store.path()))?;

    match saved {
        Some(config) => {
            println!("{}", format_config(&config, show_password));
            Ok(EXIT_SUCCESS)
        }
        None => {
            print_error("Config is not set");
            Ok(EXIT_FAILURE)
        }
    }
}
