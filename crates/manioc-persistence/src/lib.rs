//! Manioc Persistence - storage abstraction layer
//!
//! This crate provides:
//! - Persistence traits consumed by the config engine (`ConfigPersistence`,
//!   `NamespacePersistence`, `PersistenceService`)
//! - Storage model types decoupled from any backend
//! - An in-memory backend with optional JSON snapshot file

pub mod memory;
pub mod model;
pub mod traits;

pub use memory::MemoryPersistService;
pub use model::*;
pub use traits::*;
