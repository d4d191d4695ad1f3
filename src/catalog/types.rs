use crate::version::SpecifierSet;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Properties handed to the dialog presenter.
///
/// The fields the engine reads or computes are typed; everything else the
/// catalog author sets is carried through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Message text in the catalog; the rendered file path once materialized.
    pub message: String,
    /// Auto-close delay in seconds.
    #[serde(
        default,
        deserialize_with = "deserialize_timer",
        skip_serializing_if = "Option::is_none"
    )]
    pub timer: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infobox: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DialogProperties {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
            timer: None,
            infobox: None,
            extra: BTreeMap::new(),
        }
    }
}

// Catalogs write the timer both as `300` and `"300"`.
fn deserialize_timer<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Timer {
        Seconds(u64),
        Text(String),
    }

    match Option::<Timer>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Timer::Seconds(secs)) => Ok(Some(secs)),
        Some(Timer::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("timer {text:?} is not a number"))),
    }
}

/// One catalog record, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEntry {
    pub id: String,
    pub version: u64,
    pub requirements: SpecifierSet,
    pub always_required: bool,
    pub properties: DialogProperties,
}

/// Catalog record as written in the document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawMessage {
    #[serde(rename = "messageID")]
    pub message_id: String,
    pub message_version: u64,
    #[serde(default)]
    pub os_requirements: Option<String>,
    #[serde(default)]
    pub always_required: bool,
    pub dialog_properties: DialogProperties,
}
