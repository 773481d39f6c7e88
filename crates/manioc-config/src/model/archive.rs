//! Archive level models

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between group and data id in a content item name
pub const ITEM_SEPARATOR: &str = "/";

/// Metadata item name of the legacy archive layout
pub const LEGACY_METADATA_NAME: &str = ".meta";

/// Metadata item name of the structured archive layout
pub const STRUCTURED_METADATA_NAME: &str = ".metadata.yml";

/// One named file inside an archive
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchiveItem {
    pub name: String,
    pub content: String,
}

impl ArchiveItem {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Split the item name into `(group, data_id)`
    ///
    /// Returns `None` unless the name has exactly one separator with text on both sides.
    pub fn split_name(&self) -> Option<(&str, &str)> {
        split_item_name(&self.name)
    }
}

/// Build a content item name from group and data id
pub fn item_name(group: &str, data_id: &str) -> String {
    format!("{}{}{}", group, ITEM_SEPARATOR, data_id)
}

/// Split `group/dataId`; `None` when the name is malformed
pub fn split_item_name(name: &str) -> Option<(&str, &str)> {
    let mut parts = name.split(ITEM_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(group), Some(data_id), None) if !group.is_empty() && !data_id.is_empty() => {
            Some((group, data_id))
        }
        _ => None,
    }
}

/// Contents of an unpacked archive
#[derive(Clone, Debug, Default)]
pub struct UnpackedArchive {
    pub metadata: Option<ArchiveItem>,
    /// Content items in physical archive order
    pub items: Vec<ArchiveItem>,
}

/// Metadata describing one config, independent of the archive layout
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMetadataEntry {
    pub data_id: String,
    pub group: String,
    #[serde(rename = "type")]
    pub config_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_name: String,
}

impl CanonicalMetadataEntry {
    pub fn key(&self) -> (&str, &str) {
        (&self.group, &self.data_id)
    }
}

/// Archive layout produced by an export
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// `.metadata.yml` listing every entry
    #[default]
    Structured,
    /// `.meta` with `key=appName` lines
    Legacy,
}

impl Display for ArchiveFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveFormat::Structured => write!(f, "structured"),
            ArchiveFormat::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structured" | "v2" => Ok(ArchiveFormat::Structured),
            "legacy" | "v1" => Ok(ArchiveFormat::Legacy),
            _ => Err(format!(
                "Invalid archive format: {}. Valid values: structured, legacy",
                s
            )),
        }
    }
}

/// A packed export ready to hand out
#[derive(Clone, Debug)]
pub struct ExportArchive {
    pub file_name: String,
    pub data: Vec<u8>,
}
