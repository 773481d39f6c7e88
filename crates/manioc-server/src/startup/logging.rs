//! Console and rolling file logging
//!
//! | Log File          | Content                       | Targets            |
//! |-------------------|-------------------------------|--------------------|
//! | manioc.log        | everything                    | (all)              |
//! | config-server.log | import, export and clone      | manioc_config      |
//! | persistence.log   | config store                  | manioc_persistence |
//! | config-trace.log  | persistence trace records     | config_trace       |
//!
//! Files live in `~/manioc/logs` unless `MANIOC_LOG_DIR` or `manioc.logs.path` says
//! otherwise. The console layer writes to stderr; stdout carries command results.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use manioc_config::service::notify::CONFIG_TRACE_TARGET;

pub const ROOT_LOG_FILE: &str = "manioc.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// A log file fed by a fixed set of targets
struct ComponentLog {
    file_name: &'static str,
    targets: &'static [&'static str],
}

const COMPONENT_LOGS: &[ComponentLog] = &[
    ComponentLog {
        file_name: "config-server.log",
        targets: &["manioc_config"],
    },
    ComponentLog {
        file_name: "persistence.log",
        targets: &["manioc_persistence"],
    },
    ComponentLog {
        file_name: "config-trace.log",
        targets: &[CONFIG_TRACE_TARGET],
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

impl FromStr for LogRotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(LogRotation::Daily),
            "hourly" => Ok(LogRotation::Hourly),
            "never" => Ok(LogRotation::Never),
            _ => Err(format!("Invalid log rotation: {}", s)),
        }
    }
}

fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    Path::new(&home).join("manioc").join("logs")
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub console_output: bool,
    pub file_logging: bool,
    /// Level of the console and root file layers, unless `RUST_LOG` is set
    pub level: Level,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            console_output: true,
            file_logging: true,
            level: Level::INFO,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// `MANIOC_LOG_DIR` wins over the configured directory; unknown levels and
    /// rotations fall back to their defaults.
    pub fn from_config(
        log_dir: Option<String>,
        console_output: bool,
        file_logging: bool,
        level: &str,
        rotation: &str,
    ) -> Self {
        let log_dir = std::env::var("MANIOC_LOG_DIR")
            .ok()
            .or(log_dir)
            .map(PathBuf::from)
            .unwrap_or_else(default_log_dir);

        Self {
            log_dir,
            console_output,
            file_logging,
            level: level.parse().unwrap_or(Level::INFO),
            rotation: rotation.parse().unwrap_or_default(),
        }
    }

    fn level_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
    }

    fn rolling_writer(&self, file_name: &str, guards: &mut Vec<WorkerGuard>) -> NonBlocking {
        let appender = RollingFileAppender::new(self.rotation.into(), &self.log_dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        guards.push(guard);
        writer
    }
}

/// Keeps the background log writers alive, flushing them when dropped
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

fn component_filter(component: &ComponentLog) -> Targets {
    component
        .targets
        .iter()
        .fold(Targets::new(), |targets, target| {
            targets.with_target(*target, LevelFilter::TRACE)
        })
}

/// Install the global subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    let mut guards = Vec::new();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.console_output {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(config.level_filter())
                .boxed(),
        );
    }

    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;

        let root = config.rolling_writer(ROOT_LOG_FILE, &mut guards);
        layers.push(
            fmt::layer()
                .with_writer(root)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_filter(config.level_filter())
                .boxed(),
        );

        for component in COMPONENT_LOGS {
            let writer = config.rolling_writer(component.file_name, &mut guards);
            layers.push(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(component_filter(component))
                    .boxed(),
            );
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    tracing::debug!(
        log_dir = %config.log_dir.display(),
        files = config.file_logging,
        rotation = ?config.rotation,
        "Logging initialized"
    );
    Ok(LoggingGuard {
        _file_guards: guards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert!(config.console_output && config.file_logging);
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.rotation, LogRotation::Daily);
        assert!(config.log_dir.ends_with("manioc/logs"));
    }

    #[test]
    fn test_from_config_falls_back_on_bad_values() {
        let config = LoggingConfig::from_config(None, false, true, "debug", "hourly");
        assert!(!config.console_output);
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.rotation, LogRotation::Hourly);

        let config = LoggingConfig::from_config(None, true, true, "loud", "weekly");
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.rotation, LogRotation::Daily);
    }

    #[test]
    fn test_rotation() {
        assert_eq!("NEVER".parse::<LogRotation>().unwrap(), LogRotation::Never);
        assert!(matches!(Rotation::from(LogRotation::Hourly), Rotation::HOURLY));
    }

    #[test]
    fn test_trace_records_have_their_own_file() {
        let trace_log = COMPONENT_LOGS
            .iter()
            .find(|c| c.targets.contains(&CONFIG_TRACE_TARGET))
            .unwrap();
        assert_eq!(trace_log.file_name, "config-trace.log");
        assert!(COMPONENT_LOGS.iter().all(|c| c.file_name != ROOT_LOG_FILE));
    }
}
