//! Data models module
//!
//! - `config` - Configuration management
//! - `app_state` - Services shared by every command
//! - `response` - Result payloads printed by the commands

pub mod app_state;
pub mod config;
pub mod response;

pub use app_state::AppState;
pub use config::{ConfigOverrides, Configuration};
pub use response::Result;
