//! Config transfer service layer
//!
//! This module provides the building blocks of archive transfer:
//! - Archive codec and metadata parsing
//! - Content encryption strategies
//! - Reconciliation of archive items against metadata
//! - Change notification
//! - Import, export, clone and delete orchestration

pub mod archive;
pub mod encryption;
pub mod metadata;
pub mod notify;
pub mod reconcile;
pub mod transfer;

pub use archive::ArchiveCodec;
pub use encryption::{
    ConfigEncryptionService, ConfigEncryptionServiceBuilder, EncryptedContent, EncryptionAdapter,
    EncryptionPattern, NoopEncryption,
};
pub use metadata::{MetadataDocument, MetadataIllegal};
pub use notify::{ChangePublisher, NotificationSink};
pub use reconcile::{Reconciliation, ReconciliationEngine};
pub use transfer::ConfigTransferService;
