//! Change and trace events

use serde::{Deserialize, Serialize};

/// Persistence trace event type
pub const PERSISTENCE_EVENT: &str = "persist";

/// Persistence type for a publish
pub const PERSISTENCE_TYPE_PUB: &str = "pub";

/// Persistence type for a removal
pub const PERSISTENCE_TYPE_REMOVE: &str = "remove";

/// Signals that the stored value of one config changed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDataChangeEvent {
    pub data_id: String,
    pub group: String,
    pub namespace: String,
    pub is_beta: bool,
    pub last_modified: i64,
}

impl ConfigDataChangeEvent {
    pub fn new(data_id: &str, group: &str, namespace: &str, last_modified: i64) -> Self {
        Self {
            data_id: data_id.to_string(),
            group: group.to_string(),
            namespace: namespace.to_string(),
            is_beta: false,
            last_modified,
        }
    }
}

/// Audit record of one persistence action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigTraceEvent {
    pub data_id: String,
    pub group: String,
    pub namespace: String,
    pub request_ip_app: Option<String>,
    pub timestamp: i64,
    pub handle_ip: String,
    pub event_type: String,
    pub persistence_type: String,
    pub content: Option<String>,
}
