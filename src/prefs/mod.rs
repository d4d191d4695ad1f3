//! Key-value preference persistence.
//!
//! Two scopes are used: `Managed` holds administrator-provided settings
//! (cache directory, distribution URL, ignored users) and is read-only to
//! this tool; `Host` holds mutable per-machine state (last committed OS
//! version, acknowledgment ledger).
//!
//! Values cross the trait as `toml::Value`. Callers go through
//! [`get_typed`] / [`set_typed`] so the dynamic typing stays here.

mod memory;
mod store;

pub use memory::MemoryPreferenceStore;
pub use store::TomlPreferenceStore;

use crate::error::PreferenceError;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Scope {
    Managed,
    Host,
}

/// Managed keys.
pub const KEY_CACHE_DIR: &str = "cache_dir";
pub const KEY_DISTRO_URL: &str = "distro_url";
pub const KEY_IGNORED_USERS: &str = "ignored_users";

/// Host-state keys.
pub const KEY_LAST_COMMITTED_OS: &str = "last_committed_os";
pub const KEY_ACKNOWLEDGED: &str = "acknowledged_messages";

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str, scope: Scope) -> Result<Option<toml::Value>, PreferenceError>;
    fn set(&self, key: &str, value: toml::Value, scope: Scope) -> Result<(), PreferenceError>;
}

pub fn get_typed<T: DeserializeOwned>(
    store: &dyn PreferenceStore,
    key: &str,
    scope: Scope,
) -> Result<Option<T>, PreferenceError> {
    let Some(value) = store.get(key, scope)? else {
        return Ok(None);
    };
    tracing::debug!(key, %scope, "preference.get");
    value
        .try_into()
        .map(Some)
        .map_err(|error: toml::de::Error| PreferenceError::Decode {
            key: key.to_string(),
            message: error.to_string(),
        })
}

pub fn set_typed<T: Serialize>(
    store: &dyn PreferenceStore,
    key: &str,
    value: &T,
    scope: Scope,
) -> Result<(), PreferenceError> {
    let encoded = toml::Value::try_from(value).map_err(|error| PreferenceError::Encode {
        key: key.to_string(),
        message: error.to_string(),
    })?;
    tracing::debug!(key, %scope, "preference.set");
    store.set(key, encoded, scope)
}
