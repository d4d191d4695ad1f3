use crate::presenter::DialogOutcome;
use crate::version::OsVersion;
use std::path::PathBuf;

/// Caller-supplied inputs of one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub user: String,
    /// Use this OS version instead of the discovered one.
    pub os_version_override: Option<String>,
    /// Read the catalog from this file instead of the distribution point.
    pub catalog_override: Option<PathBuf>,
    /// Treat the run as post-upgrade even if the OS did not change.
    /// The OS version is not committed in this mode.
    pub force_upgrade: bool,
    pub cache_dir_override: Option<PathBuf>,
}

impl RunOptions {
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    /// Any test override is active.
    pub fn is_debug(&self) -> bool {
        self.force_upgrade || self.catalog_override.is_some() || self.os_version_override.is_some()
    }
}

/// What the run knows after `Init`.
#[derive(Debug, Clone)]
pub struct RunState {
    pub current_os: OsVersion,
    pub last_committed_os: OsVersion,
    pub user: String,
    pub upgrade_detected: bool,
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Init,
    /// No upgrade since the last committed run.
    Gated,
    IgnoredUser,
    NetworkWait,
    CatalogLoad,
    Eligibility,
    Presenting,
    Commit,
    /// Some message was not shown cleanly; nothing committed.
    PartialFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReport {
    pub message_id: String,
    pub version: u64,
    pub outcome: DialogOutcome,
}

/// Terminal state of a run that did not fail fatally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub phase: Phase,
    pub messages: Vec<MessageReport>,
    pub committed: bool,
}

impl RunReport {
    pub(super) fn stopped(phase: Phase) -> Self {
        Self {
            phase,
            messages: Vec::new(),
            committed: false,
        }
    }

    pub fn outcome_of(&self, message_id: &str) -> Option<DialogOutcome> {
        self.messages
            .iter()
            .find(|report| report.message_id == message_id)
            .map(|report| report.outcome)
    }
}
