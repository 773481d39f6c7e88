//! Shared fixtures for transfer engine tests
//!
//! - RecordingSink: captures change and trace events, optionally failing
//! - RefusingEncryption: encryption that fails for one data id
//! - CountingStore: in-memory store that counts gateway calls
//! - zip helpers building archives in memory

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use zip::{ZipWriter, write::SimpleFileOptions};

use manioc_common::crypto::{CryptoError, CryptoResult};
use manioc_config::{
    ConfigDataChangeEvent, ConfigEntry, ConfigTraceEvent, ConfigTransferService, EncryptedContent,
    EncryptionAdapter, NoopEncryption, NotificationSink,
};
use manioc_persistence::{
    BatchWriteOutcome, ConfigPersistence, ConfigStorageData, ExportFilter, MemoryPersistService,
    NamespaceInfo, NamespacePersistence, PersistenceService, SameConfigPolicy, StorageMode,
};

pub const TEST_USER: &str = "admin";
pub const TEST_IP: &str = "10.0.0.8";
pub const TEST_NAMESPACE: &str = "dev";

#[derive(Default)]
pub struct RecordingSink {
    pub changes: Mutex<Vec<ConfigDataChangeEvent>>,
    pub traces: Mutex<Vec<ConfigTraceEvent>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn changed_ids(&self) -> Vec<String> {
        self.changes
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.data_id.clone())
            .collect()
    }

    pub fn trace_types(&self) -> Vec<String> {
        self.traces
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.persistence_type.clone())
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, event: ConfigDataChangeEvent) -> anyhow::Result<()> {
        self.changes.lock().unwrap().push(event);
        if self.fail {
            anyhow::bail!("notification transport down");
        }
        Ok(())
    }

    fn trace(&self, event: ConfigTraceEvent) -> anyhow::Result<()> {
        self.traces.lock().unwrap().push(event);
        if self.fail {
            anyhow::bail!("trace log unavailable");
        }
        Ok(())
    }
}

/// Passes content through, except for one data id it refuses to encrypt
pub struct RefusingEncryption {
    pub data_id: &'static str,
}

#[async_trait]
impl EncryptionAdapter for RefusingEncryption {
    async fn encrypt(&self, data_id: &str, content: &str) -> CryptoResult<EncryptedContent> {
        if data_id == self.data_id {
            return Err(CryptoError::EncryptionFailed("key service unavailable".to_string()));
        }
        Ok(EncryptedContent::plain(content))
    }

    async fn decrypt(
        &self,
        _data_id: &str,
        _encrypted_data_key: &str,
        content: &str,
    ) -> CryptoResult<String> {
        Ok(content.to_string())
    }
}

/// Memory store that counts every config gateway call
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryPersistService,
    pub config_calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.config_calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.config_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConfigPersistence for CountingStore {
    async fn config_find_one(
        &self,
        data_id: &str,
        group: &str,
        namespace_id: &str,
    ) -> anyhow::Result<Option<ConfigStorageData>> {
        self.hit();
        self.inner.config_find_one(data_id, group, namespace_id).await
    }

    async fn config_find_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<ConfigStorageData>> {
        self.hit();
        self.inner.config_find_by_ids(ids).await
    }

    async fn config_find_for_export(
        &self,
        filter: &ExportFilter,
    ) -> anyhow::Result<Vec<ConfigStorageData>> {
        self.hit();
        self.inner.config_find_for_export(filter).await
    }

    async fn config_create_or_update(
        &self,
        config: ConfigStorageData,
        src_user: &str,
        src_ip: &str,
    ) -> anyhow::Result<bool> {
        self.hit();
        self.inner.config_create_or_update(config, src_user, src_ip).await
    }

    async fn config_batch_insert_or_update(
        &self,
        configs: Vec<ConfigStorageData>,
        src_user: &str,
        src_ip: &str,
        config_advance_info: Option<&HashMap<String, String>>,
        policy: SameConfigPolicy,
    ) -> anyhow::Result<BatchWriteOutcome> {
        self.hit();
        self.inner
            .config_batch_insert_or_update(configs, src_user, src_ip, config_advance_info, policy)
            .await
    }

    async fn config_remove_by_ids(
        &self,
        ids: &[i64],
        client_ip: &str,
        src_user: &str,
    ) -> anyhow::Result<Vec<ConfigStorageData>> {
        self.hit();
        self.inner.config_remove_by_ids(ids, client_ip, src_user).await
    }
}

#[async_trait]
impl NamespacePersistence for CountingStore {
    async fn namespace_find_all(&self) -> anyhow::Result<Vec<NamespaceInfo>> {
        self.inner.namespace_find_all().await
    }

    async fn namespace_create(&self, namespace_id: &str, name: &str, desc: &str) -> anyhow::Result<()> {
        self.inner.namespace_create(namespace_id, name, desc).await
    }

    async fn namespace_check(&self, namespace_id: &str) -> anyhow::Result<bool> {
        self.inner.namespace_check(namespace_id).await
    }
}

#[async_trait]
impl PersistenceService for CountingStore {
    fn storage_mode(&self) -> StorageMode {
        self.inner.storage_mode()
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        self.inner.health_check().await
    }
}

pub struct Fixture {
    pub store: Arc<CountingStore>,
    pub sink: Arc<RecordingSink>,
    pub service: ConfigTransferService,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with(Arc::new(NoopEncryption), RecordingSink::default()).await
    }

    pub async fn with(encryption: Arc<dyn EncryptionAdapter>, sink: RecordingSink) -> Self {
        let store = Arc::new(CountingStore::default());
        store
            .namespace_create(TEST_NAMESPACE, "Development", "")
            .await
            .unwrap();
        let sink = Arc::new(sink);
        let service = ConfigTransferService::new(store.clone(), encryption, sink.clone())
            .with_handle_ip("192.168.0.1");
        Self {
            store,
            sink,
            service,
        }
    }

    /// Store configs directly, returns their ids
    pub async fn seed(&self, namespace: &str, configs: &[(&str, &str, &str)]) -> Vec<i64> {
        let rows = configs
            .iter()
            .map(|(group, data_id, content)| {
                ConfigStorageData::from(&ConfigEntry {
                    data_id: data_id.to_string(),
                    group: group.to_string(),
                    namespace: namespace.to_string(),
                    content: content.to_string(),
                    config_type: "text".to_string(),
                    ..Default::default()
                })
            })
            .collect();
        self.store
            .inner
            .config_batch_insert_or_update(rows, TEST_USER, TEST_IP, None, SameConfigPolicy::Abort)
            .await
            .unwrap();

        let mut ids = Vec::new();
        for (group, data_id, _) in configs {
            let row = self
                .store
                .inner
                .config_find_one(data_id, group, namespace)
                .await
                .unwrap()
                .unwrap();
            ids.push(row.id);
        }
        ids
    }

    pub async fn stored(&self, namespace: &str, group: &str, data_id: &str) -> Option<ConfigStorageData> {
        self.store
            .inner
            .config_find_one(data_id, group, namespace)
            .await
            .unwrap()
    }
}

/// Build a zip archive from `(name, content)` pairs, in the given order
pub fn zip_of(files: &[(&str, &str)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer.into_inner()
}

/// Structured metadata document for `(group, dataId, type)` triples
///
/// Leaked so it can sit next to string literals in [`zip_of`] inputs.
pub fn structured_metadata(entries: &[(&str, &str, &str)]) -> &'static str {
    let mut yaml = String::from("metadata:\n");
    for (group, data_id, config_type) in entries {
        yaml.push_str(&format!(
            "  - dataId: {}\n    group: {}\n    type: {}\n",
            data_id, group, config_type
        ));
    }
    Box::leak(yaml.into_boxed_str())
}
