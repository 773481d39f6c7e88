//! In-memory persistence backend
//!
//! Keeps every row behind one lock so a batch write is applied atomically with
//! respect to other callers. When a snapshot path is configured the whole state is
//! written to a JSON file after each mutation and reloaded on startup.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use md5::{Digest, Md5};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use manioc_common::ManiocError;

use crate::model::{
    BatchWriteOutcome, ConfigKey, ConfigStorageData, NamespaceInfo, SameConfigPolicy, StorageMode,
};
use crate::traits::{ConfigPersistence, ExportFilter, NamespacePersistence, PersistenceService};

type RowKey = (String, String, String);

fn row_key(tenant: &str, group: &str, data_id: &str) -> RowKey {
    (tenant.to_string(), group.to_string(), data_id.to_string())
}

fn compute_md5(content: &str) -> String {
    const_hex::encode(Md5::digest(content.as_bytes()))
}

#[derive(Default, Serialize, Deserialize)]
struct MemoryState {
    next_id: i64,
    configs: BTreeMap<i64, ConfigStorageData>,
    namespaces: BTreeMap<String, NamespaceInfo>,
    #[serde(skip)]
    index: HashMap<RowKey, i64>,
}

impl MemoryState {
    fn rebuild_index(&mut self) {
        self.index = self
            .configs
            .values()
            .map(|c| (row_key(&c.tenant, &c.group, &c.data_id), c.id))
            .collect();
    }

    fn find_id(&self, config: &ConfigStorageData) -> Option<i64> {
        self.index
            .get(&row_key(&config.tenant, &config.group, &config.data_id))
            .copied()
    }

    fn insert(&mut self, mut config: ConfigStorageData, src_user: &str, src_ip: &str, now: i64) {
        self.next_id += 1;
        config.id = self.next_id;
        config.md5 = compute_md5(&config.content);
        config.src_user = src_user.to_string();
        config.src_ip = src_ip.to_string();
        config.created_time = now;
        config.modified_time = now;
        self.index.insert(
            row_key(&config.tenant, &config.group, &config.data_id),
            config.id,
        );
        self.configs.insert(config.id, config);
    }

    fn update(&mut self, id: i64, config: ConfigStorageData, src_user: &str, src_ip: &str, now: i64) {
        if let Some(existing) = self.configs.get_mut(&id) {
            existing.md5 = compute_md5(&config.content);
            existing.content = config.content;
            existing.app_name = config.app_name;
            existing.config_type = config.config_type;
            existing.desc = config.desc;
            existing.encrypted_data_key = config.encrypted_data_key;
            existing.src_user = src_user.to_string();
            existing.src_ip = src_ip.to_string();
            existing.modified_time = now;
        }
    }

    fn remove(&mut self, id: i64) -> Option<ConfigStorageData> {
        let removed = self.configs.remove(&id)?;
        self.index
            .remove(&row_key(&removed.tenant, &removed.group, &removed.data_id));
        Some(removed)
    }
}

/// In-memory persistence with optional JSON snapshot
pub struct MemoryPersistService {
    state: RwLock<MemoryState>,
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryPersistService {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPersistService {
    /// Create an empty store that lives only in memory
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            snapshot_path: None,
        }
    }

    /// Open a snapshot-backed store, loading the file if it exists
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ManiocError> {
        let path = path.as_ref().to_path_buf();
        let mut state = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str::<MemoryState>(&text).map_err(|e| {
                ManiocError::StorageError(format!("corrupt snapshot {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryState::default(),
            Err(e) => {
                return Err(ManiocError::StorageError(format!(
                    "read snapshot {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        state.rebuild_index();
        info!(
            path = %path.display(),
            configs = state.configs.len(),
            namespaces = state.namespaces.len(),
            "Loaded config snapshot"
        );

        Ok(Self {
            state: RwLock::new(state),
            snapshot_path: Some(path),
        })
    }

    async fn flush(&self) -> anyhow::Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&*self.state.read())?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), "Flushed config snapshot");
        Ok(())
    }

    fn batch_write(
        &self,
        configs: Vec<ConfigStorageData>,
        src_user: &str,
        src_ip: &str,
        policy: SameConfigPolicy,
    ) -> BatchWriteOutcome {
        let now = chrono::Utc::now().timestamp_millis();
        let mut outcome = BatchWriteOutcome::default();
        let mut state = self.state.write();

        let mut pending = configs.into_iter();
        while let Some(config) = pending.next() {
            match state.find_id(&config) {
                None => {
                    state.insert(config, src_user, src_ip, now);
                    outcome.succ_count += 1;
                }
                Some(id) => match policy {
                    SameConfigPolicy::Abort => {
                        outcome.fail_data.push(ConfigKey::from(&config));
                        outcome.skip_data = pending.by_ref().map(|c| ConfigKey::from(&c)).collect();
                        break;
                    }
                    SameConfigPolicy::Skip => {
                        outcome.skip_count += 1;
                        outcome.skip_data.push(ConfigKey::from(&config));
                    }
                    SameConfigPolicy::Overwrite => {
                        state.update(id, config, src_user, src_ip, now);
                        outcome.succ_count += 1;
                    }
                },
            }
        }
        outcome
    }
}

#[async_trait]
impl ConfigPersistence for MemoryPersistService {
    async fn config_find_one(
        &self,
        data_id: &str,
        group: &str,
        namespace_id: &str,
    ) -> anyhow::Result<Option<ConfigStorageData>> {
        let state = self.state.read();
        Ok(state
            .index
            .get(&row_key(namespace_id, group, data_id))
            .and_then(|id| state.configs.get(id))
            .cloned())
    }

    async fn config_find_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<ConfigStorageData>> {
        let state = self.state.read();
        Ok(state
            .configs
            .values()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn config_find_for_export(
        &self,
        filter: &ExportFilter,
    ) -> anyhow::Result<Vec<ConfigStorageData>> {
        let state = self.state.read();
        let mut configs: Vec<ConfigStorageData> = if !filter.ids.is_empty() {
            state
                .configs
                .values()
                .filter(|c| filter.ids.contains(&c.id))
                .cloned()
                .collect()
        } else {
            state
                .configs
                .values()
                .filter(|c| c.tenant == filter.namespace_id)
                .filter(|c| match filter.group.as_deref() {
                    Some(g) if !g.is_empty() => c.group == g,
                    _ => true,
                })
                .filter(|c| match &filter.data_ids {
                    Some(ids) if !ids.is_empty() => ids.contains(&c.data_id),
                    _ => true,
                })
                .filter(|c| match filter.app_name.as_deref() {
                    Some(app) if !app.is_empty() => c.app_name == app,
                    _ => true,
                })
                .cloned()
                .collect()
        };
        configs.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.data_id.cmp(&b.data_id)));
        Ok(configs)
    }

    async fn config_create_or_update(
        &self,
        config: ConfigStorageData,
        src_user: &str,
        src_ip: &str,
    ) -> anyhow::Result<bool> {
        self.batch_write(vec![config], src_user, src_ip, SameConfigPolicy::Overwrite);
        self.flush().await?;
        Ok(true)
    }

    async fn config_batch_insert_or_update(
        &self,
        configs: Vec<ConfigStorageData>,
        src_user: &str,
        src_ip: &str,
        _config_advance_info: Option<&HashMap<String, String>>,
        policy: SameConfigPolicy,
    ) -> anyhow::Result<BatchWriteOutcome> {
        let outcome = self.batch_write(configs, src_user, src_ip, policy);
        self.flush().await?;
        Ok(outcome)
    }

    async fn config_remove_by_ids(
        &self,
        ids: &[i64],
        client_ip: &str,
        src_user: &str,
    ) -> anyhow::Result<Vec<ConfigStorageData>> {
        let removed: Vec<ConfigStorageData> = {
            let mut state = self.state.write();
            ids.iter().filter_map(|id| state.remove(*id)).collect()
        };
        if !removed.is_empty() {
            debug!(count = removed.len(), client_ip, src_user, "Removed configs");
            self.flush().await?;
        }
        Ok(removed)
    }
}

#[async_trait]
impl NamespacePersistence for MemoryPersistService {
    async fn namespace_find_all(&self) -> anyhow::Result<Vec<NamespaceInfo>> {
        Ok(self.state.read().namespaces.values().cloned().collect())
    }

    async fn namespace_create(
        &self,
        namespace_id: &str,
        name: &str,
        desc: &str,
    ) -> anyhow::Result<()> {
        {
            let mut state = self.state.write();
            if state.namespaces.contains_key(namespace_id) {
                return Err(ManiocError::IllegalArgument(format!(
                    "namespace '{}' already exist",
                    namespace_id
                ))
                .into());
            }
            state.namespaces.insert(
                namespace_id.to_string(),
                NamespaceInfo {
                    namespace_id: namespace_id.to_string(),
                    namespace_name: name.to_string(),
                    namespace_desc: desc.to_string(),
                },
            );
        }
        self.flush().await
    }

    async fn namespace_check(&self, namespace_id: &str) -> anyhow::Result<bool> {
        Ok(self.state.read().namespaces.contains_key(namespace_id))
    }
}

#[async_trait]
impl PersistenceService for MemoryPersistService {
    fn storage_mode(&self) -> StorageMode {
        if self.snapshot_path.is_some() {
            StorageMode::Snapshot
        } else {
            StorageMode::Memory
        }
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
