//! Manioc Common - Shared types and utilities
//!
//! This crate provides the foundational pieces used across all Manioc crates:
//! - Error types and error codes
//! - Content encryption primitives
//! - Utility functions

pub mod crypto;
pub mod error;
pub mod utils;

pub use error::{ErrorCode, ManiocError};
pub use utils::{is_blank, local_ip};

/// Default group name
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

/// Namespace id of the public (default) tenant
pub const PUBLIC_NAMESPACE_ID: &str = "";
