//! Persistence traits for the storage abstraction layer
//!
//! The config engine only talks to storage through these traits; conflict
//! resolution and transactional guarantees live behind them.

pub mod config;
pub mod namespace;

pub use config::{ConfigPersistence, ExportFilter};
pub use namespace::NamespacePersistence;

use async_trait::async_trait;

use crate::model::StorageMode;

/// Unified persistence service trait
#[async_trait]
pub trait PersistenceService: ConfigPersistence + NamespacePersistence + Send + Sync {
    /// Get the current storage mode
    fn storage_mode(&self) -> StorageMode;

    /// Health check for the storage backend
    async fn health_check(&self) -> anyhow::Result<()>;
}
