//! Credential store backed by `credentials.toml`

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::ConfigError;
use crate::types::SavedConfig;

/// Key-value access to the persisted [`SavedConfig`].
///
/// Keys are dotted paths into the record: `vpn.server`, `vpn.groupName`,
/// `rdp.server`, `onlyVpn`.
pub trait CredentialStore: Send + Sync {
    /// Read the whole record, `None` when nothing was ever saved
    fn load(&self) -> Result<Option<SavedConfig>, ConfigError>;

    /// Read a single key
    fn get(&self, key: &str) -> Result<Option<toml::Value>, ConfigError>;

    /// Write a single key, creating the record if needed
    fn set(&self, key: &str, value: toml::Value) -> Result<(), ConfigError>;

    /// Replace the whole record
    fn save(&self, config: &SavedConfig) -> Result<(), ConfigError>;
}

/// Store persisting to a TOML file readable only by the owner
#[derive(Debug, Clone)]
pub struct TomlCredentialStore {
    path: PathBuf,
}

impl TomlCredentialStore {
    /// Create a store for the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at `credentials.toml` inside a config directory
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(super::credentials_path(config_dir))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<Option<toml::Table>, ConfigError> {
        match super::load_config::<toml::Table>(&self.path) {
            Ok(table) => Ok(Some(table)),
            Err(ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_table(&self, table: &toml::Table) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(table)?;
        super::write_private(&self.path, &content)
    }
}

impl CredentialStore for TomlCredentialStore {
    fn load(&self) -> Result<Option<SavedConfig>, ConfigError> {
        self.read_table()?.map(table_to_config).transpose()
    }

    fn get(&self, key: &str) -> Result<Option<toml::Value>, ConfigError> {
        Ok(self
            .read_table()?
            .and_then(|table| table_get(&table, key).cloned()))
    }

    fn set(&self, key: &str, value: toml::Value) -> Result<(), ConfigError> {
        let mut table = self.read_table()?.unwrap_or_default();
        table_set(&mut table, key, value)?;
        self.write_table(&table)?;
        debug!(path = %self.path.display(), key, "Stored credential key");
        Ok(())
    }

    fn save(&self, config: &SavedConfig) -> Result<(), ConfigError> {
        super::save_config(&self.path, config)?;
        debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }
}

/// In-process store, used where nothing should touch the disk
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    table: Mutex<Option<toml::Table>>,
    saves: Mutex<usize>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a record
    pub fn with_config(config: &SavedConfig) -> Result<Self, ConfigError> {
        let store = Self::new();
        *lock(&store.table) = Some(config_to_table(config)?);
        Ok(store)
    }

    /// How many times [`CredentialStore::save`] was called
    pub fn save_count(&self) -> usize {
        *lock(&self.saves)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<SavedConfig>, ConfigError> {
        lock(&self.table).clone().map(table_to_config).transpose()
    }

    fn get(&self, key: &str) -> Result<Option<toml::Value>, ConfigError> {
        Ok(lock(&self.table)
            .as_ref()
            .and_then(|table| table_get(table, key).cloned()))
    }

    fn set(&self, key: &str, value: toml::Value) -> Result<(), ConfigError> {
        let mut guard = lock(&self.table);
        table_set(guard.get_or_insert_with(toml::Table::new), key, value)
    }

    fn save(&self, config: &SavedConfig) -> Result<(), ConfigError> {
        *lock(&self.table) = Some(config_to_table(config)?);
        *lock(&self.saves) += 1;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave a table half-written.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn table_to_config(table: toml::Table) -> Result<SavedConfig, ConfigError> {
    Ok(toml::Value::Table(table).try_into::<SavedConfig>()?)
}

fn config_to_table(config: &SavedConfig) -> Result<toml::Table, ConfigError> {
    match toml::Value::try_from(config)? {
        toml::Value::Table(table) => Ok(table),
        other => Err(ConfigError::Invalid(format!(
            "expected a table, got {}",
            other.type_str()
        ))),
    }
}

/// Navigate a dotted key path (e.g. `vpn.server`)
fn table_get<'a>(table: &'a toml::Table, key: &str) -> Option<&'a toml::Value> {
    let mut parts = key.split('.');
    let mut current = table.get(parts.next()?)?;
    for part in parts {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

/// Set a dotted key path, creating intermediate tables
fn table_set(table: &mut toml::Table, key: &str, value: toml::Value) -> Result<(), ConfigError> {
    let parts: Vec<&str> = key.split('.').collect();
    let (last_key, parents) = match parts.split_last() {
        Some((last, parents)) if !last.is_empty() => (*last, parents),
        _ => return Err(ConfigError::Invalid(format!("Invalid key: {:?}", key))),
    };

    // Navigate/create path to the parent
    let mut current = table;
    for part in parents {
        current = current
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .ok_or_else(|| ConfigError::Invalid(format!("Cannot navigate to key: {}", key)))?;
    }

    current.insert(last_key.to_string(), value);
    Ok(())
}
