//! Manioc Config - Config archive transfer engine
//!
//! This crate provides:
//! - Archive packing and unpacking (structured and legacy metadata)
//! - Reconciliation of archive items against metadata
//! - Import, export, clone and batch delete of configs
//! - Content encryption strategies
//! - Change notification and trace logging

pub mod error;
pub mod model;
pub mod service;

pub use error::TransferError;
pub use model::*;
pub use service::{
    ArchiveCodec, ChangePublisher, ConfigEncryptionService, ConfigEncryptionServiceBuilder,
    ConfigTransferService, EncryptedContent, EncryptionAdapter, EncryptionPattern, MetadataDocument,
    NoopEncryption, NotificationSink, ReconciliationEngine,
};
