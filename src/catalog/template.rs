use super::types::DialogProperties;

const MESSAGE_ID_TOKEN: &str = "<<MSG>>";
const ASSET_SCHEME: &str = "assets://";

/// Expand `<<MSG>>` and `assets://` in every top-level string property.
///
/// `asset_base` is the remote asset directory ending in `/`. With no base
/// the asset scheme is left as written.
pub fn expand(properties: &mut DialogProperties, message_id: &str, asset_base: Option<&str>) {
    let rewrite = |value: &mut String| {
        if value.contains(MESSAGE_ID_TOKEN) {
            *value = value.replace(MESSAGE_ID_TOKEN, message_id);
        }
        if let Some(base) = asset_base
            && value.contains(ASSET_SCHEME)
        {
            *value = value.replace(ASSET_SCHEME, base);
        }
    };

    rewrite(&mut properties.message);
    if let Some(title) = properties.title.as_mut() {
        rewrite(title);
    }
    if let Some(infobox) = properties.infobox.as_mut() {
        rewrite(infobox);
    }
    for value in properties.extra.values_mut() {
        if let serde_json::Value::String(text) = value {
            rewrite(text);
        }
    }
}
