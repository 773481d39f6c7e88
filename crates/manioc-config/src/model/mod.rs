//! Data models for config transfer
//!
//! - `archive`: raw archive items and the canonical metadata they are checked against
//! - `entry`: persistable config entries
//! - `result`: typed outcomes and result payloads
//! - `event`: change and trace events

pub mod archive;
pub mod entry;
pub mod event;
pub mod result;

pub use archive::*;
pub use entry::*;
pub use event::*;
pub use result::*;
