//! Application state shared by every command

use std::sync::Arc;

use tracing::info;

use manioc_common::crypto::{CryptoError, CryptoResult};
use manioc_common::is_blank;
use manioc_config::{
    ChangePublisher, ConfigEncryptionServiceBuilder, ConfigTransferService, EncryptionAdapter,
    EncryptionPattern, NoopEncryption,
};
use manioc_persistence::{MemoryPersistService, PersistenceService};

use super::config::Configuration;

pub struct AppState {
    pub configuration: Configuration,
    /// Snapshot backed config store
    pub persistence: Arc<MemoryPersistService>,
    pub publisher: Arc<ChangePublisher>,
    pub transfer: ConfigTransferService,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("configuration", &self.configuration)
            .field("storage_mode", &self.persistence.storage_mode())
            .field("subscribers", &self.publisher.subscriber_count())
            .finish()
    }
}

/// Encryption strategy selected by `manioc.config.encryption.*`
pub fn encryption_adapter(configuration: &Configuration) -> CryptoResult<Arc<dyn EncryptionAdapter>> {
    if !configuration.encryption_enabled() {
        return Ok(Arc::new(NoopEncryption));
    }

    let key = configuration.encryption_key();
    if is_blank(&key) {
        return Err(CryptoError::InvalidKey(
            "encryption is enabled but manioc.config.encryption.key is empty".to_string(),
        ));
    }

    let mut builder = ConfigEncryptionServiceBuilder::empty().encryption_key(&key);
    for pattern in configuration.encryption_patterns() {
        builder = builder.pattern(pattern.parse::<EncryptionPattern>()?);
    }
    let service = builder.build()?;
    info!(
        patterns = ?service.patterns().iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        "Config encryption enabled"
    );
    Ok(Arc::new(service))
}

impl AppState {
    pub async fn new(configuration: Configuration) -> anyhow::Result<Self> {
        let snapshot = configuration.snapshot_path();
        let persistence = Arc::new(MemoryPersistService::open(&snapshot).await?);
        persistence.health_check().await?;

        let publisher = Arc::new(ChangePublisher::new());
        let transfer = ConfigTransferService::new(
            persistence.clone(),
            encryption_adapter(&configuration)?,
            publisher.clone(),
        )
        .with_handle_ip(&configuration.server_ip());

        info!(
            snapshot = %snapshot.display(),
            mode = %persistence.storage_mode(),
            "Config store ready"
        );
        Ok(Self {
            configuration,
            persistence,
            publisher,
            transfer,
        })
    }
}
