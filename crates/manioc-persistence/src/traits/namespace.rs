//! Namespace persistence trait

use async_trait::async_trait;

use crate::model::NamespaceInfo;

/// Namespace persistence operations
#[async_trait]
pub trait NamespacePersistence: Send + Sync {
    /// Find all namespaces
    async fn namespace_find_all(&self) -> anyhow::Result<Vec<NamespaceInfo>>;

    /// Create a new namespace
    async fn namespace_create(
        &self,
        namespace_id: &str,
        name: &str,
        desc: &str,
    ) -> anyhow::Result<()>;

    /// Check if namespace exists
    async fn namespace_check(&self, namespace_id: &str) -> anyhow::Result<bool>;
}
