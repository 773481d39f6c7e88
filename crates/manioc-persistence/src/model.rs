//! Domain model types for the persistence abstraction layer
//!
//! These types are the values exchanged with the persistence traits,
//! decoupled from specific storage backends.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage mode for the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// Process memory only, nothing survives a restart
    Memory,
    /// Process memory mirrored to a JSON snapshot file after every write
    Snapshot,
}

impl Display for StorageMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Memory => write!(f, "memory"),
            StorageMode::Snapshot => write!(f, "snapshot"),
        }
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(StorageMode::Memory),
            "snapshot" => Ok(StorageMode::Snapshot),
            _ => Err(format!("Invalid storage mode: {}", s)),
        }
    }
}

/// Conflict resolution policy for batch writes
///
/// The config engine passes it through untouched; only backends interpret it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SameConfigPolicy {
    /// Stop the batch at the first existing config
    #[default]
    Abort,
    /// Leave existing configs untouched and continue
    Skip,
    /// Replace existing configs
    Overwrite,
}

impl Display for SameConfigPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SameConfigPolicy::Abort => write!(f, "ABORT"),
            SameConfigPolicy::Skip => write!(f, "SKIP"),
            SameConfigPolicy::Overwrite => write!(f, "OVERWRITE"),
        }
    }
}

impl FromStr for SameConfigPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ABORT" => Ok(SameConfigPolicy::Abort),
            "SKIP" => Ok(SameConfigPolicy::Skip),
            "OVERWRITE" => Ok(SameConfigPolicy::Overwrite),
            _ => Err(format!(
                "Invalid policy: {}. Valid values: ABORT, SKIP, OVERWRITE",
                s
            )),
        }
    }
}

/// Namespace information
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    pub namespace_id: String,
    pub namespace_name: String,
    pub namespace_desc: String,
}

/// A persisted config row
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigStorageData {
    pub id: i64,
    pub data_id: String,
    pub group: String,
    pub tenant: String,
    pub content: String,
    pub md5: String,
    pub app_name: String,
    pub config_type: String,
    pub desc: String,
    pub encrypted_data_key: String,
    pub src_user: String,
    pub src_ip: String,
    pub created_time: i64,
    pub modified_time: i64,
}

/// Identity of one config inside a batch outcome
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigKey {
    pub data_id: String,
    pub group: String,
}

impl From<&ConfigStorageData> for ConfigKey {
    fn from(value: &ConfigStorageData) -> Self {
        Self {
            data_id: value.data_id.clone(),
            group: value.group.clone(),
        }
    }
}

/// Per-batch outcome reported by a batch write
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWriteOutcome {
    pub succ_count: u32,
    pub skip_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fail_data: Vec<ConfigKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_data: Vec<ConfigKey>,
}

impl BatchWriteOutcome {
    pub fn fail_count(&self) -> u32 {
        self.fail_data.len() as u32
    }
}
