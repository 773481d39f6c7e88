//! Config persistence trait
//!
//! Defines the interface for configuration storage operations.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::model::{BatchWriteOutcome, ConfigStorageData, SameConfigPolicy};

/// Selection used by exports
///
/// When `ids` is non-empty it wins over every other field.
#[derive(Clone, Debug, Default)]
pub struct ExportFilter {
    pub namespace_id: String,
    pub group: Option<String>,
    pub data_ids: Option<Vec<String>>,
    pub app_name: Option<String>,
    pub ids: Vec<i64>,
}

/// Configuration persistence operations
#[async_trait]
pub trait ConfigPersistence: Send + Sync {
    /// Find a single config by data_id, group, and namespace_id
    async fn config_find_one(
        &self,
        data_id: &str,
        group: &str,
        namespace_id: &str,
    ) -> anyhow::Result<Option<ConfigStorageData>>;

    /// Find configs by row id, in id order; unknown ids are ignored
    async fn config_find_by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<ConfigStorageData>>;

    /// Find configs for export, ordered by group then data id
    async fn config_find_for_export(
        &self,
        filter: &ExportFilter,
    ) -> anyhow::Result<Vec<ConfigStorageData>>;

    /// Create or update a single config
    async fn config_create_or_update(
        &self,
        config: ConfigStorageData,
        src_user: &str,
        src_ip: &str,
    ) -> anyhow::Result<bool>;

    /// Write a batch of configs, resolving existing keys with `policy`
    async fn config_batch_insert_or_update(
        &self,
        configs: Vec<ConfigStorageData>,
        src_user: &str,
        src_ip: &str,
        config_advance_info: Option<&HashMap<String, String>>,
        policy: SameConfigPolicy,
    ) -> anyhow::Result<BatchWriteOutcome>;

    /// Remove configs by row id, returns the removed rows in removal order
    async fn config_remove_by_ids(
        &self,
        ids: &[i64],
        client_ip: &str,
        src_user: &str,
    ) -> anyhow::Result<Vec<ConfigStorageData>>;
}
