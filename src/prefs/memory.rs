use super::{PreferenceStore, Scope};
use crate::error::PreferenceError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local store. Used by tests and dry runs; nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<(Scope, String), toml::Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value in any scope, including `Managed`.
    pub fn with(self, key: &str, value: impl Into<toml::Value>, scope: Scope) -> Self {
        self.lock().insert((scope, key.to_string()), value.into());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(Scope, String), toml::Value>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str, scope: Scope) -> Result<Option<toml::Value>, PreferenceError> {
        Ok(self.lock().get(&(scope, key.to_string())).cloned())
    }

    fn set(&self, key: &str, value: toml::Value, scope: Scope) -> Result<(), PreferenceError> {
        self.lock().insert((scope, key.to_string()), value);
        Ok(())
    }
}
