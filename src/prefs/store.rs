use super::{PreferenceStore, Scope};
use crate::error::PreferenceError;
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed preferences.
///
/// Managed settings come from a single TOML table written by the
/// administrator. Host state lives in `<state_dir>/<hostname>.toml` and is
/// re-read on every access so external edits are picked up between calls.
#[derive(Debug, Clone)]
pub struct TomlPreferenceStore {
    managed_path: PathBuf,
    host_path: PathBuf,
}

impl TomlPreferenceStore {
    pub fn new(managed_path: impl Into<PathBuf>, host_path: impl Into<PathBuf>) -> Self {
        Self {
            managed_path: managed_path.into(),
            host_path: host_path.into(),
        }
    }

    /// Host state file named after the current machine.
    pub fn for_current_host(managed_path: impl Into<PathBuf>, state_dir: &Path) -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        Self::new(managed_path, state_dir.join(format!("{host}.toml")))
    }

    pub fn host_path(&self) -> &Path {
        &self.host_path
    }

    fn path_for(&self, scope: Scope) -> &Path {
        match scope {
            Scope::Managed => &self.managed_path,
            Scope::Host => &self.host_path,
        }
    }

    fn read_table(path: &Path) -> Result<toml::Table, PreferenceError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(toml::Table::new());
            }
            Err(error) => return Err(error.into()),
        };
        toml::from_str(&contents).map_err(|error: toml::de::Error| PreferenceError::Parse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn get(&self, key: &str, scope: Scope) -> Result<Option<toml::Value>, PreferenceError> {
        let mut table = Self::read_table(self.path_for(scope))?;
        Ok(table.remove(key))
    }

    fn set(&self, key: &str, value: toml::Value, scope: Scope) -> Result<(), PreferenceError> {
        if scope == Scope::Managed {
            return Err(PreferenceError::ReadOnly(scope));
        }
        let path = self.path_for(scope);
        let mut table = Self::read_table(path)?;
        table.insert(key.to_string(), value);

        let rendered = toml::to_string_pretty(&table).map_err(|error| PreferenceError::Encode {
            key: key.to_string(),
            message: error.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, rendered)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}
