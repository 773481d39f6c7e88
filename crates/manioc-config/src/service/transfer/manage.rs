use tracing::{info, warn};

use manioc_common::{DEFAULT_GROUP, is_blank};
use manioc_persistence::ConfigStorageData;

use crate::error::{TransferError, TransferResult};
use crate::model::{
    ConfigDataChangeEvent, ConfigDetail, ConfigEntry, ConfigTraceEvent, PERSISTENCE_EVENT,
    PERSISTENCE_TYPE_PUB, PERSISTENCE_TYPE_REMOVE,
};

use super::ConfigTransferService;

impl ConfigTransferService {
    /// Remove configs by id and notify per removed config
    ///
    /// Returns `true` both when configs were removed and when none of the ids matched;
    /// callers cannot tell the two apart from the return value.
    pub async fn delete_configs(
        &self,
        ids: &[i64],
        client_ip: &str,
        src_user: &str,
    ) -> TransferResult<bool> {
        let removed = self
            .persistence
            .config_remove_by_ids(ids, client_ip, src_user)
            .await
            .map_err(TransferError::Persistence)?;
        if removed.is_empty() {
            return Ok(true);
        }

        let now = chrono::Utc::now().timestamp_millis();
        for config in &removed {
            self.emit(
                ConfigDataChangeEvent::new(&config.data_id, &config.group, &config.tenant, now),
                ConfigTraceEvent {
                    data_id: config.data_id.clone(),
                    group: config.group.clone(),
                    namespace: config.tenant.clone(),
                    request_ip_app: None,
                    timestamp: now,
                    handle_ip: client_ip.to_string(),
                    event_type: PERSISTENCE_EVENT.to_string(),
                    persistence_type: PERSISTENCE_TYPE_REMOVE.to_string(),
                    content: None,
                },
            );
        }

        info!(requested = ids.len(), removed = removed.len(), src_user, "Deleted configs");
        Ok(true)
    }

    /// Read one config with its content decrypted
    pub async fn detail_config(
        &self,
        data_id: &str,
        group: &str,
        namespace: &str,
    ) -> TransferResult<Option<ConfigDetail>> {
        let Some(config) = self
            .persistence
            .config_find_one(data_id, group, namespace)
            .await
            .map_err(TransferError::Persistence)?
        else {
            return Ok(None);
        };

        let content = self
            .encryption
            .decrypt(data_id, &config.encrypted_data_key, &config.content)
            .await
            .map_err(|e| TransferError::encryption(data_id, e))?;

        let mut detail = ConfigDetail::from(config);
        detail.content = content;
        Ok(Some(detail))
    }

    /// Create or update one config
    ///
    /// Content is encrypted only when the caller supplied no data key; a supplied
    /// key means the content is already sealed. A blank group falls back to
    /// `DEFAULT_GROUP`.
    pub async fn publish_config(
        &self,
        mut entry: ConfigEntry,
        src_ip: &str,
        request_ip_app: Option<&str>,
    ) -> TransferResult<bool> {
        if is_blank(&entry.data_id) {
            return Err(TransferError::IllegalArgument(
                "required parameter 'dataId' is missing".to_string(),
            ));
        }
        if is_blank(&entry.group) {
            entry.group = DEFAULT_GROUP.to_string();
        }

        if is_blank(&entry.encrypted_data_key) {
            let sealed = self
                .encryption
                .encrypt(&entry.data_id, &entry.content)
                .await
                .map_err(|e| TransferError::encryption(&entry.data_id, e))?;
            entry.content = sealed.content;
            entry.encrypted_data_key = sealed.encrypted_data_key;
        }

        let published = self
            .persistence
            .config_create_or_update(ConfigStorageData::from(&entry), &entry.created_by, src_ip)
            .await
            .map_err(TransferError::Persistence)?;
        if !published {
            warn!(data_id = %entry.data_id, group = %entry.group, "Config publish was not applied");
            return Ok(false);
        }

        let now = chrono::Utc::now().timestamp_millis();
        self.emit(
            ConfigDataChangeEvent::new(&entry.data_id, &entry.group, &entry.namespace, now),
            ConfigTraceEvent {
                data_id: entry.data_id.clone(),
                group: entry.group.clone(),
                namespace: entry.namespace.clone(),
                request_ip_app: request_ip_app.map(str::to_string),
                timestamp: now,
                handle_ip: self.handle_ip.clone(),
                event_type: PERSISTENCE_EVENT.to_string(),
                persistence_type: PERSISTENCE_TYPE_PUB.to_string(),
                content: Some(entry.content.clone()),
            },
        );

        info!(data_id = %entry.data_id, group = %entry.group, namespace = %entry.namespace, "Published config");
        Ok(true)
    }
}
