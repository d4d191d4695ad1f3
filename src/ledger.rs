//! Per-user record of acknowledged message versions.

use crate::error::{LedgerError, PreferenceError};
use crate::prefs::{self, KEY_ACKNOWLEDGED, PreferenceStore, Scope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// user → (message ID → highest acknowledged version).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AckLedger {
    users: BTreeMap<String, BTreeMap<String, u64>>,
}

impl AckLedger {
    /// Read the ledger from host state. Absent means empty.
    pub fn load(store: &dyn PreferenceStore) -> Result<Self, LedgerError> {
        match prefs::get_typed::<Self>(store, KEY_ACKNOWLEDGED, Scope::Host) {
            Ok(ledger) => Ok(ledger.unwrap_or_default()),
            Err(PreferenceError::Decode { message, .. }) => Err(LedgerError::Decode(message)),
            Err(error) => Err(error.into()),
        }
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), LedgerError> {
        prefs::set_typed(store, KEY_ACKNOWLEDGED, self, Scope::Host)?;
        Ok(())
    }

    pub fn acknowledged_version(&self, user: &str, message_id: &str) -> Option<u64> {
        self.users.get(user)?.get(message_id).copied()
    }

    /// True when `user` has acknowledged `message_id` at `version` or newer.
    pub fn has_seen(&self, user: &str, message_id: &str, version: u64) -> bool {
        self.acknowledged_version(user, message_id)
            .is_some_and(|seen| seen >= version)
    }

    /// Raise the stored version to `version` in memory. Never lowers it.
    pub fn record(&mut self, user: &str, message_id: &str, version: u64) {
        let seen = self
            .users
            .entry(user.to_string())
            .or_default()
            .entry(message_id.to_string())
            .or_insert(version);
        *seen = (*seen).max(version);
    }

    /// Record an acknowledgment and persist the ledger immediately.
    pub fn record_seen(
        &mut self,
        store: &dyn PreferenceStore,
        user: &str,
        message_id: &str,
        version: u64,
    ) -> Result<(), LedgerError> {
        self.record(user, message_id, version);
        self.save(store)?;
        tracing::info!(user, message_id, version, "Recorded acknowledgment");
        Ok(())
    }

    pub fn messages_for(&self, user: &str) -> Option<&BTreeMap<String, u64>> {
        self.users.get(user)
    }
}
