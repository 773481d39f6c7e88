//! Archive metadata parsing and rendering
//!
//! Two generations of metadata exist:
//! - legacy `.meta`: `key=appName` lines, where the key is derived from group and data id
//! - structured `.metadata.yml`: a YAML list of entries with `dataId`, `group` and `type`

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use manioc_common::is_blank;

use crate::model::{
    ArchiveItem, CanonicalMetadataEntry, LEGACY_METADATA_NAME, STRUCTURED_METADATA_NAME,
};

/// Line breaks and `|` all delimit legacy tokens
fn is_legacy_delimiter(c: char) -> bool {
    matches!(c, '\r' | '\n' | '|')
}

/// Metadata that cannot be used for an import
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("metadata illegal: {0}")]
pub struct MetadataIllegal(pub String);

/// Parsed archive metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataDocument {
    /// Legacy lookup key to application name
    Legacy(HashMap<String, String>),
    /// Entries in document order
    Structured(Vec<CanonicalMetadataEntry>),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StructuredMetadata {
    #[serde(default)]
    metadata: Vec<RawMetadataEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadataEntry {
    data_id: Option<String>,
    group: Option<String>,
    #[serde(rename = "type")]
    config_type: Option<String>,
    desc: Option<String>,
    app_name: Option<String>,
}

impl MetadataDocument {
    /// Pick the parser from the metadata item name
    ///
    /// Only `.metadata.yml` selects the structured parser; a legacy or absent metadata
    /// item is treated as legacy.
    pub fn from_item(item: Option<&ArchiveItem>) -> Result<Self, MetadataIllegal> {
        match item {
            Some(item) if item.name == STRUCTURED_METADATA_NAME => {
                Self::parse_structured(&item.content)
            }
            Some(item) => Self::parse_legacy(&item.content),
            None => Ok(MetadataDocument::Legacy(HashMap::new())),
        }
    }

    /// Parse legacy `key=value` metadata
    ///
    /// Every non blank token must split on `=` into exactly two pieces. An empty value
    /// is accepted and leaves the application unset.
    pub fn parse_legacy(text: &str) -> Result<Self, MetadataIllegal> {
        let mut map = HashMap::new();

        for token in text.split(is_legacy_delimiter) {
            if is_blank(token) {
                continue;
            }
            let mut pieces = token.split('=');
            match (pieces.next(), pieces.next(), pieces.next()) {
                (Some(key), Some(value), None) => {
                    if !value.is_empty() {
                        map.insert(key.to_string(), value.to_string());
                    }
                }
                _ => {
                    return Err(MetadataIllegal(format!(
                        "legacy metadata token '{}' is not key=value",
                        token
                    )));
                }
            }
        }

        Ok(MetadataDocument::Legacy(map))
    }

    /// Parse structured YAML metadata
    pub fn parse_structured(text: &str) -> Result<Self, MetadataIllegal> {
        let document: StructuredMetadata = serde_yaml::from_str::<Option<StructuredMetadata>>(text)
            .map_err(|e| MetadataIllegal(e.to_string()))?
            .unwrap_or_default();

        if document.metadata.is_empty() {
            return Err(MetadataIllegal("metadata list is empty".to_string()));
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(document.metadata.len());
        for (index, raw) in document.metadata.into_iter().enumerate() {
            let (Some(data_id), Some(group), Some(config_type)) = (
                raw.data_id.filter(|v| !is_blank(v)),
                raw.group.filter(|v| !is_blank(v)),
                raw.config_type.filter(|v| !is_blank(v)),
            ) else {
                return Err(MetadataIllegal(format!(
                    "metadata entry {} lacks dataId, group or type",
                    index
                )));
            };

            if !seen.insert((group.clone(), data_id.clone())) {
                return Err(MetadataIllegal(format!(
                    "duplicate metadata entry {}/{}",
                    group, data_id
                )));
            }

            entries.push(CanonicalMetadataEntry {
                data_id,
                group,
                config_type,
                desc: raw.desc.unwrap_or_default(),
                app_name: raw.app_name.unwrap_or_default(),
            });
        }

        Ok(MetadataDocument::Structured(entries))
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, MetadataDocument::Structured(_))
    }
}

/// Legacy application lookup key: `group.dataId.app` with the last `.` of the data id
/// replaced by `~`
pub fn legacy_app_key(group: &str, data_id: &str) -> String {
    let data_id = match data_id.rsplit_once('.') {
        Some((stem, ext)) => format!("{}~{}", stem, ext),
        None => data_id.to_string(),
    };
    format!("{}.{}.app", group, data_id)
}

/// Render a structured metadata item
pub fn render_structured(entries: &[CanonicalMetadataEntry]) -> Result<ArchiveItem, serde_yaml::Error> {
    #[derive(Serialize)]
    struct Document<'a> {
        metadata: &'a [CanonicalMetadataEntry],
    }

    let yaml = serde_yaml::to_string(&Document { metadata: entries })?;
    Ok(ArchiveItem::new(STRUCTURED_METADATA_NAME, yaml))
}

/// Render a legacy metadata item, one line per entry that has an application
pub fn render_legacy(entries: &[CanonicalMetadataEntry]) -> ArchiveItem {
    let text = entries
        .iter()
        .filter(|e| !is_blank(&e.app_name))
        .map(|e| format!("{}={}\r\n", legacy_app_key(&e.group, &e.data_id), e.app_name))
        .collect::<String>();
    ArchiveItem::new(LEGACY_METADATA_NAME, text)
}
