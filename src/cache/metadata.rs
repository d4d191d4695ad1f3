//! Sidecar metadata stored next to cached files.

use crate::error::CacheError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SIDECAR_SUFFIX: &str = ".meta.json";

/// Validator record for one cached file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// `ETag` of the response that produced the content, if it sent one.
    pub validator: Option<String>,
    /// SHA-256 of the content this record describes.
    pub sha256: String,
    pub fetched_at: DateTime<Utc>,
}

impl CacheMetadata {
    pub fn describe(content: &[u8], validator: Option<String>) -> Self {
        Self {
            validator,
            sha256: compute_checksum(content),
            fetched_at: Utc::now(),
        }
    }
}

pub fn compute_checksum(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// `<dir>/<name>.meta.json` for `<dir>/<name>`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(SIDECAR_SUFFIX);
    path.with_file_name(name)
}

/// Read the sidecar and confirm it describes the file's current content.
///
/// Returns `None` when the content file or sidecar is missing, the sidecar is
/// unreadable, or the checksum disagrees (a write interrupted between the
/// content and the sidecar).
pub fn read_verified(path: &Path) -> Option<CacheMetadata> {
    let raw = fs::read_to_string(sidecar_path(path)).ok()?;
    let metadata: CacheMetadata = match serde_json::from_str(&raw) {
        Ok(metadata) => metadata,
        Err(error) => {
            tracing::warn!(path = %path.display(), "Ignoring unreadable cache metadata: {error}");
            return None;
        }
    };
    let content = fs::read(path).ok()?;
    if compute_checksum(&content) != metadata.sha256 {
        tracing::warn!(path = %path.display(), "Cached content does not match its metadata");
        return None;
    }
    Some(metadata)
}

/// Replace `path` with `content` and record `validator` for it.
///
/// The sidecar is removed first and written last, so an interruption at any
/// point leaves the file unvalidated rather than paired with a stale record.
pub fn write_validated(
    path: &Path,
    content: &[u8],
    validator: Option<String>,
) -> Result<CacheMetadata, CacheError> {
    let sidecar = sidecar_path(path);
    match fs::remove_file(&sidecar) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(CacheError::Io { path: sidecar, source }),
    }

    atomic_write(path, content).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let metadata = CacheMetadata::describe(content, validator);
    let encoded = serde_json::to_vec_pretty(&metadata)?;
    atomic_write(&sidecar, &encoded).map_err(|source| CacheError::Io {
        path: sidecar.clone(),
        source,
    })?;
    Ok(metadata)
}

/// Write to a temp file beside `path`, then rename over it.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, data)?;
    fs::rename(&temp_path, path)
}
