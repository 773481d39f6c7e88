//! Transfer orchestration
//!
//! [`ConfigTransferService`] ties the codec, metadata parsing, reconciliation and
//! encryption to the persistence and notification collaborators. Each operation is
//! request scoped; the service keeps no state between calls.

mod clone;
mod export;
mod import;
mod manage;

pub use export::export_file_name;

use std::sync::Arc;

use tracing::{info, warn};

use manioc_common::{is_blank, local_ip};
use manioc_persistence::{
    BatchWriteOutcome, ConfigStorageData, PersistenceService, SameConfigPolicy,
};

use crate::error::{TransferError, TransferResult};
use crate::model::{
    ConfigDataChangeEvent, ConfigEntry, ConfigTraceEvent, PERSISTENCE_EVENT, PERSISTENCE_TYPE_PUB,
};
use crate::service::encryption::EncryptionAdapter;
use crate::service::notify::NotificationSink;

pub struct ConfigTransferService {
    persistence: Arc<dyn PersistenceService>,
    encryption: Arc<dyn EncryptionAdapter>,
    notifier: Arc<dyn NotificationSink>,
    handle_ip: String,
}

impl ConfigTransferService {
    pub fn new(
        persistence: Arc<dyn PersistenceService>,
        encryption: Arc<dyn EncryptionAdapter>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            persistence,
            encryption,
            notifier,
            handle_ip: local_ip(),
        }
    }

    /// Override the ip recorded as handler in trace records
    pub fn with_handle_ip(mut self, handle_ip: &str) -> Self {
        self.handle_ip = handle_ip.to_string();
        self
    }

    pub fn persistence(&self) -> &Arc<dyn PersistenceService> {
        &self.persistence
    }

    /// True when a non blank namespace is unknown to the registry
    async fn namespace_missing(&self, namespace: &str) -> TransferResult<bool> {
        if is_blank(namespace) {
            return Ok(false);
        }
        let exists = self
            .persistence
            .namespace_check(namespace)
            .await
            .map_err(TransferError::Persistence)?;
        Ok(!exists)
    }

    /// Batch write `entries`, then emit a change event and a trace record per entry
    async fn persist_and_notify(
        &self,
        entries: &[ConfigEntry],
        src_user: &str,
        src_ip: &str,
        request_ip_app: Option<&str>,
        policy: SameConfigPolicy,
    ) -> TransferResult<BatchWriteOutcome> {
        let rows: Vec<ConfigStorageData> = entries.iter().map(ConfigStorageData::from).collect();
        let outcome = self
            .persistence
            .config_batch_insert_or_update(rows, src_user, src_ip, None, policy)
            .await
            .map_err(TransferError::Persistence)?;

        info!(
            entries = entries.len(),
            succ = outcome.succ_count,
            skip = outcome.skip_count,
            fail = outcome.fail_count(),
            %policy,
            src_user,
            "Batch persisted configs"
        );

        let now = chrono::Utc::now().timestamp_millis();
        for entry in entries {
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
        }

        Ok(outcome)
    }

    /// Notification problems are logged and never fail the write that caused them
    fn emit(&self, change: ConfigDataChangeEvent, trace: ConfigTraceEvent) {
        let (data_id, group) = (change.data_id.clone(), change.group.clone());
        if let Err(e) = self.notifier.notify(change) {
            warn!(%data_id, %group, error = %e, "Failed to publish config change event");
        }
        if let Err(e) = self.notifier.trace(trace) {
            warn!(%data_id, %group, error = %e, "Failed to write config trace record");
        }
    }
}
