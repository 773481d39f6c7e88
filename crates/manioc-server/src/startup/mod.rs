//! Application startup utilities

mod logging;

pub use logging::{LogRotation, LoggingConfig, LoggingGuard, ROOT_LOG_FILE, init_logging};
