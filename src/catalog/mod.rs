//! Message catalog loading and parsing.

mod template;
mod types;

pub use types::{DialogProperties, MessageEntry};

use crate::cache::ContentCache;
use crate::error::CatalogError;
use crate::version::SpecifierSet;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use types::RawMessage;
use url::Url;

pub const CATALOG_FILE: &str = "messages.yaml";
pub const ASSET_DIR: &str = "assets";

/// Where the catalog and its assets are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionPoint {
    base: String,
}

impl DistributionPoint {
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|error| CatalogError::Url {
            url: raw.to_string(),
            message: error.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CatalogError::Url {
                url: raw.to_string(),
                message: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(Self {
            base: trimmed.to_string(),
        })
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/{CATALOG_FILE}", self.base)
    }

    pub fn asset_base(&self) -> String {
        format!("{}/{ASSET_DIR}/", self.base)
    }
}

pub struct CatalogLoader<'a> {
    cache: &'a ContentCache,
    cache_dir: PathBuf,
    distribution: Option<DistributionPoint>,
}

impl<'a> CatalogLoader<'a> {
    pub fn new(
        cache: &'a ContentCache,
        cache_dir: impl Into<PathBuf>,
        distribution: Option<DistributionPoint>,
    ) -> Self {
        Self {
            cache,
            cache_dir: cache_dir.into(),
            distribution,
        }
    }

    pub fn local_catalog_path(&self) -> PathBuf {
        self.cache_dir.join(CATALOG_FILE)
    }

    /// Load the catalog.
    ///
    /// `local_override` is read directly and the cache is not consulted.
    /// Otherwise the cached copy is refreshed from the distribution point
    /// first.
    pub async fn load(
        &self,
        local_override: Option<&Path>,
    ) -> Result<Vec<MessageEntry>, CatalogError> {
        let path = match local_override {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using local catalog, not downloading");
                path.to_path_buf()
            }
            None => {
                let distribution = self
                    .distribution
                    .as_ref()
                    .ok_or(CatalogError::NoDistribution)?;
                let entry = self
                    .cache
                    .refresh(&self.local_catalog_path(), &distribution.catalog_url())
                    .await?;
                entry.path
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| CatalogError::Read {
            path: path.clone(),
            source,
        })?;
        let asset_base = self.distribution.as_ref().map(DistributionPoint::asset_base);
        let entries = parse_catalog(&text, &path.display().to_string(), asset_base.as_deref())?;
        tracing::info!(count = entries.len(), "Loaded catalog");
        Ok(entries)
    }
}

/// Parse the first YAML document of `text` into validated entries.
pub fn parse_catalog(
    text: &str,
    source_name: &str,
    asset_base: Option<&str>,
) -> Result<Vec<MessageEntry>, CatalogError> {
    let parse_error = |message: String| {
        tracing::error!(source_name, "Failed to load catalog: {message}");
        CatalogError::Parse {
            source_name: source_name.to_string(),
            message,
        }
    };

    let document = serde_yaml::Deserializer::from_str(text)
        .next()
        .ok_or_else(|| parse_error("document is empty".into()))?;
    // An empty or null document is a truncated catalog, not an empty one.
    let raw = Option::<Vec<RawMessage>>::deserialize(document)
        .map_err(|error| parse_error(error.to_string()))?
        .ok_or_else(|| parse_error("document is empty".into()))?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(raw.len());
    for record in raw {
        validate_message_id(&record.message_id).map_err(&parse_error)?;
        if !seen.insert(record.message_id.clone()) {
            return Err(parse_error(format!(
                "duplicate messageID {:?}",
                record.message_id
            )));
        }

        let requirements = SpecifierSet::parse(record.os_requirements.as_deref().unwrap_or(""))
            .map_err(|error| parse_error(format!("{}: {error}", record.message_id)))?;

        let mut properties = record.dialog_properties;
        template::expand(&mut properties, &record.message_id, asset_base);

        entries.push(MessageEntry {
            id: record.message_id,
            version: record.message_version,
            requirements,
            always_required: record.always_required,
            properties,
        });
    }
    Ok(entries)
}

// IDs name files in the cache directory.
fn validate_message_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("messageID must not be empty".into());
    }
    if id.starts_with('.') || id.contains(['/', '\\', '\0']) {
        return Err(format!("messageID {id:?} is not usable as a file name"));
    }
    Ok(())
}
