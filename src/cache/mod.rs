//! Conditional fetch cache for remote resources.
//!
//! A cached file is trusted only after its stored `ETag` has been compared
//! with the one the origin currently reports. When the origin cannot be
//! asked, the run fails instead of falling back to possibly stale content.

mod metadata;

pub use metadata::{CacheMetadata, atomic_write, compute_checksum, read_verified, sidecar_path};

use crate::error::CacheError;
use reqwest::Client;
use reqwest::header::ETAG;
use std::path::{Path, PathBuf};

/// A cached resource and the validator it was stored with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub path: PathBuf,
    pub url: String,
    /// `None` when the file is absent, unvalidated, or the origin sent no `ETag`.
    pub validator: Option<String>,
}

pub struct ContentCache {
    client: Client,
}

impl ContentCache {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Whether `path` must be (re)downloaded from `url`.
    ///
    /// No request is made when the file does not exist. Otherwise the
    /// origin's current `ETag` is fetched with HEAD and compared with the
    /// stored one; a missing validator on either side counts as a mismatch.
    pub async fn needs_fetch(&self, path: &Path, url: &str) -> Result<bool, CacheError> {
        tracing::info!(path = %path.display(), "Checking if cached file needs downloading");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Not cached yet");
            return Ok(true);
        }

        let remote = self.remote_validator(url).await?;
        let stored = read_verified(path).and_then(|metadata| metadata.validator);
        tracing::debug!(?remote, ?stored, "Comparing validators");

        match (stored, remote) {
            (Some(stored), Some(remote)) if stored == remote => {
                tracing::info!(path = %path.display(), "ETag unchanged, skipping download");
                Ok(false)
            }
            _ => {
                tracing::info!(path = %path.display(), "ETag differs or is missing");
                Ok(true)
            }
        }
    }

    /// Download `url` into `path` and record the response `ETag`.
    pub async fn fetch(&self, path: &Path, url: &str) -> Result<CacheEntry, CacheError> {
        tracing::info!(url, path = %path.display(), "Downloading");
        let download_failed = |error: reqwest::Error| {
            tracing::error!(url, "Download failed: {error}");
            CacheError::DownloadFailed {
                url: url.to_string(),
                message: error.to_string(),
            }
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(download_failed)?;
        let validator = header_validator(response.headers());
        let body = response.bytes().await.map_err(download_failed)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let metadata = metadata::write_validated(path, &body, validator)?;
        if metadata.validator.is_none() {
            tracing::warn!(url, "Origin sent no ETag; file will be downloaded again next run");
        }
        tracing::info!(path = %path.display(), bytes = body.len(), "Cached");

        Ok(CacheEntry {
            path: path.to_path_buf(),
            url: url.to_string(),
            validator: metadata.validator,
        })
    }

    /// Download only when [`needs_fetch`](Self::needs_fetch) says so.
    pub async fn refresh(&self, path: &Path, url: &str) -> Result<CacheEntry, CacheError> {
        if self.needs_fetch(path, url).await? {
            self.fetch(path, url).await
        } else {
            Ok(Self::stored_entry(path, url))
        }
    }

    /// The entry as currently on disk, without contacting the origin.
    pub fn stored_entry(path: &Path, url: &str) -> CacheEntry {
        CacheEntry {
            path: path.to_path_buf(),
            url: url.to_string(),
            validator: read_verified(path).and_then(|metadata| metadata.validator),
        }
    }

    async fn remote_validator(&self, url: &str) -> Result<Option<String>, CacheError> {
        tracing::debug!(url, "Getting ETag header");
        let response = self
            .client
            .head(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| {
                tracing::error!(url, "Unable to get ETag: {error}");
                CacheError::RemoteUnavailable {
                    url: url.to_string(),
                    message: error.to_string(),
                }
            })?;
        Ok(header_validator(response.headers()))
    }
}

fn header_validator(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get(ETAG)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
