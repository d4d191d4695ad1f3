use crate::cache::{atomic_write, sidecar_path};
use crate::error::ContentError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct VersionMarker {
    version: u64,
}

/// Rendered message bodies, one `<id>.md` per message.
#[derive(Debug, Clone)]
pub struct MessageContentStore {
    dir: PathBuf,
}

impl MessageContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, message_id: &str) -> PathBuf {
        self.dir.join(format!("{message_id}.md"))
    }

    /// Version recorded for the file of `message_id`, if any.
    pub fn stored_version(&self, message_id: &str) -> Option<u64> {
        let path = self.path_for(message_id);
        if !path.exists() {
            return None;
        }
        let raw = fs::read_to_string(sidecar_path(&path)).ok()?;
        match serde_json::from_str::<VersionMarker>(&raw) {
            Ok(marker) => Some(marker.version),
            Err(error) => {
                tracing::warn!(message_id, "Unreadable version marker: {error}");
                None
            }
        }
    }

    /// Write `text` for (`message_id`, `version`) unless that exact version
    /// is already on disk. Returns the absolute file path.
    pub fn materialize(
        &self,
        message_id: &str,
        version: u64,
        text: &str,
    ) -> Result<PathBuf, ContentError> {
        let path = self.path_for(message_id);
        if self.stored_version(message_id) == Some(version) {
            tracing::debug!(message_id, version, "Content version unchanged, skipping write");
            return Ok(absolute(&path));
        }

        tracing::debug!(message_id, version, "Writing message content");
        let write_error = |source| ContentError::Write {
            message_id: message_id.to_string(),
            source,
        };
        let marker = sidecar_path(&path);
        match fs::remove_file(&marker) {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => return Err(write_error(error)),
        }
        atomic_write(&path, text.as_bytes()).map_err(write_error)?;

        let encoded =
            serde_json::to_vec(&VersionMarker { version }).map_err(|source| ContentError::Marker {
                message_id: message_id.to_string(),
                source,
            })?;
        atomic_write(&marker, &encoded).map_err(write_error)?;
        Ok(absolute(&path))
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
