//! Selection of the catalog messages to show in this run.

mod content;

pub use content::MessageContentStore;

use crate::catalog::MessageEntry;
use crate::error::ContentError;
use crate::ledger::AckLedger;
use crate::version::OsVersion;

pub struct EligibilityEngine<'a> {
    content: &'a MessageContentStore,
}

impl<'a> EligibilityEngine<'a> {
    pub fn new(content: &'a MessageContentStore) -> Self {
        Self { content }
    }

    /// Messages `user` should see on `os_version`, in catalog order.
    ///
    /// Each selected entry has its `message` property replaced by the path
    /// of its rendered content file.
    pub fn evaluate(
        &self,
        catalog: Vec<MessageEntry>,
        ledger: &AckLedger,
        user: &str,
        os_version: &OsVersion,
    ) -> Result<Vec<MessageEntry>, ContentError> {
        let mut applicable = Vec::new();
        for mut entry in catalog {
            tracing::info!(
                message_id = %entry.id,
                version = entry.version,
                user,
                "Checking if message has been seen"
            );
            if !entry.always_required && ledger.has_seen(user, &entry.id, entry.version) {
                tracing::info!(
                    message_id = %entry.id,
                    version = entry.version,
                    user,
                    "Already acknowledged"
                );
                continue;
            }

            let rendered = self
                .content
                .materialize(&entry.id, entry.version, &entry.properties.message)?;
            entry.properties.message = rendered.to_string_lossy().into_owned();

            if entry.requirements.contains(os_version) {
                tracing::info!(
                    message_id = %entry.id,
                    version = entry.version,
                    "Message meets the requirements to display"
                );
                applicable.push(entry);
            } else {
                tracing::debug!(
                    message_id = %entry.id,
                    requirements = %entry.requirements,
                    os_version = %os_version,
                    "OS version outside message requirements"
                );
            }
        }
        Ok(applicable)
    }
}
