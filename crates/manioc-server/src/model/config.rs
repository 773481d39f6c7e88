//! Configuration management for Manioc
//!
//! Values are layered, later sources winning:
//! 1. `conf/application.yml` (or the file given with `--conf`)
//! 2. environment variables prefixed `MANIOC`, `__` separating key segments
//! 3. command line overrides

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};

use manioc_common::{ManiocError, local_ip};
use manioc_config::ArchiveFormat;

use crate::startup::LoggingConfig;

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
pub const DEFAULT_SNAPSHOT_FILE: &str = "config-snapshot.json";

pub const SERVER_IP: &str = "manioc.server.ip";
pub const STORAGE_SNAPSHOT: &str = "manioc.storage.snapshot";
pub const ENCRYPTION_ENABLED: &str = "manioc.config.encryption.enabled";
pub const ENCRYPTION_KEY: &str = "manioc.config.encryption.key";
pub const ENCRYPTION_PATTERNS: &str = "manioc.config.encryption.patterns";
pub const EXPORT_FORMAT: &str = "manioc.config.export.format";
pub const LOGS_PATH: &str = "manioc.logs.path";
pub const LOGS_LEVEL: &str = "manioc.logs.level";
pub const LOGS_CONSOLE: &str = "manioc.logs.console";
pub const LOGS_FILE: &str = "manioc.logs.file";
pub const LOGS_ROTATION: &str = "manioc.logs.rotation";

/// Command line values that take precedence over files and environment
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Configuration file, required to exist when given
    pub conf: Option<PathBuf>,
    /// Directory holding the config snapshot
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

fn config_error(e: config::ConfigError) -> ManiocError {
    ManiocError::ConfigError(e.to_string())
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

impl Configuration {
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ManiocError> {
        let file = overrides
            .conf
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config_builder = Config::builder()
            .add_source(File::from(file.as_path()).required(overrides.conf.is_some()))
            .add_source(
                Environment::with_prefix("MANIOC")
                    .keep_prefix(true)
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(dir) = &overrides.data_dir {
            config_builder = config_builder
                .set_override(
                    STORAGE_SNAPSHOT,
                    dir.join(DEFAULT_SNAPSHOT_FILE).to_string_lossy().into_owned(),
                )
                .map_err(config_error)?;
        }
        if let Some(level) = &overrides.log_level {
            config_builder = config_builder
                .set_override(LOGS_LEVEL, level.as_str())
                .map_err(config_error)?;
        }

        let config = config_builder.build().map_err(config_error)?;
        Ok(Configuration { config })
    }

    /// Configuration made of the given file only, without environment
    pub fn from_file(path: &Path) -> Result<Self, ManiocError> {
        let config = Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(config_error)?;
        Ok(Configuration { config })
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    /// Address reported as the handling ip of trace records
    pub fn server_ip(&self) -> String {
        self.config
            .get_string(SERVER_IP)
            .ok()
            .filter(|ip| !ip.trim().is_empty())
            .unwrap_or_else(local_ip)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.config
            .get_string(STORAGE_SNAPSHOT)
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("manioc/data").join(DEFAULT_SNAPSHOT_FILE))
    }

    // ========================================================================
    // Config Encryption
    // ========================================================================

    pub fn encryption_enabled(&self) -> bool {
        self.config.get_bool(ENCRYPTION_ENABLED).unwrap_or(false)
    }

    pub fn encryption_key(&self) -> String {
        self.config
            .get_string(ENCRYPTION_KEY)
            .unwrap_or_default()
    }

    /// Patterns as a YAML list, or a comma separated string from the environment
    pub fn encryption_patterns(&self) -> Vec<String> {
        let patterns = match self.config.get_array(ENCRYPTION_PATTERNS) {
            Ok(values) => values
                .into_iter()
                .filter_map(|v| v.into_string().ok())
                .collect(),
            Err(_) => self
                .config
                .get_string(ENCRYPTION_PATTERNS)
                .map(|v| v.split(',').map(|p| p.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["cipher-".to_string()]),
        };

        patterns
            .into_iter()
            .filter(|p: &String| !p.is_empty())
            .collect()
    }

    // ========================================================================
    // Export Configuration
    // ========================================================================

    /// Unknown values fall back to the structured format
    pub fn export_format(&self) -> ArchiveFormat {
        self.config
            .get_string(EXPORT_FORMAT)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn log_dir(&self) -> Option<String> {
        self.config.get_string(LOGS_PATH).ok()
    }

    pub fn log_level(&self) -> String {
        self.config
            .get_string(LOGS_LEVEL)
            .unwrap_or_else(|_| "info".to_string())
    }

    pub fn log_console_enabled(&self) -> bool {
        self.config.get_bool(LOGS_CONSOLE).unwrap_or(true)
    }

    pub fn log_file_enabled(&self) -> bool {
        self.config.get_bool(LOGS_FILE).unwrap_or(true)
    }

    /// daily, hourly or never
    pub fn log_rotation(&self) -> String {
        self.config
            .get_string(LOGS_ROTATION)
            .unwrap_or_else(|_| "daily".to_string())
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.log_dir(),
            self.log_console_enabled(),
            self.log_file_enabled(),
            &self.log_level(),
            &self.log_rotation(),
        )
    }
}
