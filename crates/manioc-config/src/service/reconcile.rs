//! Reconciliation of archive items against metadata
//!
//! Legacy archives accept every well-formed item and only use the metadata to look up
//! the application. Structured archives are matched both ways: items without metadata
//! and metadata without items are both reported, and entries come out in metadata order.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{TransferError, TransferResult};
use crate::model::{
    ArchiveItem, CanonicalMetadataEntry, ConfigEntry, UnrecognizedItem, UnrecognizedReason,
    infer_config_type, item_name,
};
use crate::service::encryption::{EncryptedContent, EncryptionAdapter};
use crate::service::metadata::{MetadataDocument, legacy_app_key};

/// Entries ready for persistence plus everything that was left out
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub entries: Vec<ConfigEntry>,
    pub unrecognized: Vec<UnrecognizedItem>,
}

pub struct ReconciliationEngine<'a> {
    encryption: &'a dyn EncryptionAdapter,
    namespace: &'a str,
    created_by: &'a str,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(encryption: &'a dyn EncryptionAdapter, namespace: &'a str, created_by: &'a str) -> Self {
        Self {
            encryption,
            namespace,
            created_by,
        }
    }

    pub async fn reconcile(
        &self,
        document: &MetadataDocument,
        items: Vec<ArchiveItem>,
    ) -> TransferResult<Reconciliation> {
        let reconciliation = match document {
            MetadataDocument::Legacy(app_names) => self.reconcile_legacy(app_names, items).await?,
            MetadataDocument::Structured(metadata) => {
                self.reconcile_structured(metadata, items).await?
            }
        };

        debug!(
            structured = document.is_structured(),
            entries = reconciliation.entries.len(),
            unrecognized = reconciliation.unrecognized.len(),
            "Reconciled archive items"
        );
        Ok(reconciliation)
    }

    async fn reconcile_legacy(
        &self,
        app_names: &HashMap<String, String>,
        items: Vec<ArchiveItem>,
    ) -> TransferResult<Reconciliation> {
        let mut result = Reconciliation::default();

        for item in items {
            let Some((group, data_id)) = item.split_name() else {
                result
                    .unrecognized
                    .push(UnrecognizedItem::new(item.name, UnrecognizedReason::MalformedName));
                continue;
            };

            let app_name = app_names
                .get(&legacy_app_key(group, data_id))
                .cloned()
                .unwrap_or_default();
            let sealed = self.seal(data_id, &item.content).await?;

            result.entries.push(ConfigEntry {
                data_id: data_id.to_string(),
                group: group.to_string(),
                namespace: self.namespace.to_string(),
                content: sealed.content,
                encrypted_data_key: sealed.encrypted_data_key,
                config_type: infer_config_type(data_id),
                desc: String::new(),
                app_name,
                created_by: self.created_by.to_string(),
            });
        }

        Ok(result)
    }

    async fn reconcile_structured(
        &self,
        metadata: &[CanonicalMetadataEntry],
        items: Vec<ArchiveItem>,
    ) -> TransferResult<Reconciliation> {
        let mut result = Reconciliation::default();
        let known: HashSet<(&str, &str)> = metadata.iter().map(|m| m.key()).collect();
        let mut contents: HashMap<(String, String), String> = HashMap::with_capacity(items.len());

        for item in items {
            let key = item
                .split_name()
                .map(|(group, data_id)| (group.to_string(), data_id.to_string()));
            match key {
                None => result
                    .unrecognized
                    .push(UnrecognizedItem::new(item.name, UnrecognizedReason::MalformedName)),
                Some(key) if known.contains(&(key.0.as_str(), key.1.as_str())) => {
                    contents.insert(key, item.content);
                }
                Some(_) => result
                    .unrecognized
                    .push(UnrecognizedItem::new(item.name, UnrecognizedReason::NotInMetadata)),
            }
        }

        for meta in metadata {
            let key = (meta.group.clone(), meta.data_id.clone());
            let Some(content) = contents.remove(&key) else {
                result.unrecognized.push(UnrecognizedItem::new(
                    item_name(&meta.group, &meta.data_id),
                    UnrecognizedReason::MissingFile,
                ));
                continue;
            };

            let sealed = self.seal(&meta.data_id, &content).await?;
            result.entries.push(ConfigEntry {
                data_id: meta.data_id.clone(),
                group: meta.group.clone(),
                namespace: self.namespace.to_string(),
                content: sealed.content,
                encrypted_data_key: sealed.encrypted_data_key,
                config_type: meta.config_type.clone(),
                desc: meta.desc.clone(),
                app_name: meta.app_name.clone(),
                created_by: self.created_by.to_string(),
            });
        }

        Ok(result)
    }

    async fn seal(&self, data_id: &str, content: &str) -> TransferResult<EncryptedContent> {
        self.encryption
            .encrypt(data_id, content)
            .await
            .map_err(|e| TransferError::encryption(data_id, e))
    }
}
