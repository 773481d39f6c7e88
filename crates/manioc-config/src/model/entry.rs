//! Persistable config entries

use serde::{Deserialize, Serialize};

use manioc_persistence::ConfigStorageData;

/// A config entry handed to persistence
///
/// `encrypted_data_key` is empty for plaintext content. An empty `app_name`
/// means no application is associated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub data_id: String,
    pub group: String,
    pub namespace: String,
    pub content: String,
    pub encrypted_data_key: String,
    #[serde(rename = "type")]
    pub config_type: String,
    pub desc: String,
    pub app_name: String,
    pub created_by: String,
}

impl From<&ConfigEntry> for ConfigStorageData {
    fn from(entry: &ConfigEntry) -> Self {
        ConfigStorageData {
            data_id: entry.data_id.clone(),
            group: entry.group.clone(),
            tenant: entry.namespace.clone(),
            content: entry.content.clone(),
            app_name: entry.app_name.clone(),
            config_type: entry.config_type.clone(),
            desc: entry.desc.clone(),
            encrypted_data_key: entry.encrypted_data_key.clone(),
            src_user: entry.created_by.clone(),
            ..Default::default()
        }
    }
}

impl From<ConfigStorageData> for ConfigEntry {
    fn from(data: ConfigStorageData) -> Self {
        ConfigEntry {
            data_id: data.data_id,
            group: data.group,
            namespace: data.tenant,
            content: data.content,
            encrypted_data_key: data.encrypted_data_key,
            config_type: data.config_type,
            desc: data.desc,
            app_name: data.app_name,
            created_by: data.src_user,
        }
    }
}

/// Infer a config type from the data id extension
pub fn infer_config_type(data_id: &str) -> String {
    let ext = match data_id.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    };

    match ext.as_str() {
        "properties" => "properties",
        "xml" => "xml",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "html" | "htm" => "html",
        _ => "text",
    }
    .to_string()
}

/// A stored config returned by detail reads, content already decrypted
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDetail {
    pub id: i64,
    pub data_id: String,
    pub group: String,
    pub namespace: String,
    pub content: String,
    pub md5: String,
    #[serde(rename = "type")]
    pub config_type: String,
    pub desc: String,
    pub app_name: String,
    pub encrypted_data_key: String,
    pub create_time: i64,
    pub modify_time: i64,
}

impl From<ConfigStorageData> for ConfigDetail {
    fn from(data: ConfigStorageData) -> Self {
        ConfigDetail {
            id: data.id,
            data_id: data.data_id,
            group: data.group,
            namespace: data.tenant,
            content: data.content,
            md5: data.md5,
            config_type: data.config_type,
            desc: data.desc,
            app_name: data.app_name,
            encrypted_data_key: data.encrypted_data_key,
            create_time: data.created_time,
            modify_time: data.modified_time,
        }
    }
}
