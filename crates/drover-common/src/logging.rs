//! Logging configuration and initialization.
//!
//! Every drover binary initializes the global tracing subscriber through this
//! module so log output stays uniform across the workspace. Supports console
//! and daily-rotated file output, text or JSON formatting, and extra filter
//! directives for tuning individual crates (e.g. `sqlx=warn`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::error::{DroverError, Result};

/// Minimum level of log messages to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = DroverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DroverError::config(format!("invalid log level: {}", s))),
        }
    }
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
}

impl std::str::FromStr for LogOutput {
    type Err = DroverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            _ => Err(DroverError::config(format!("invalid log output: {}", s))),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = DroverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(DroverError::config(format!("invalid log format: {}", s))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum log level to display.
    pub level: LogLevel,

    /// Output target.
    pub output: LogOutput,

    /// Log format.
    pub format: LogFormat,

    /// Directory for log files (file output only).
    pub log_dir: PathBuf,

    /// Log file name prefix (e.g. "drover" -> "drover.2026-07-01.log").
    pub log_file_prefix: String,

    /// Additional filter directives (e.g. "sqlx=warn,tower_http=debug").
    pub filter_directives: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "drover".to_string(),
            filter_directives: None,
        }
    }
}

impl LogConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`,
    /// `LOG_DIR`, `LOG_FILE_PREFIX`, `LOG_FILTER`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.level = level.parse()?;
        }

        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            config.output = output.parse()?;
        }

        if let Ok(format) = std::env::var("LOG_FORMAT") {
            config.format = format.parse()?;
        }

        if let Ok(dir) = std::env::var("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        if let Ok(prefix) = std::env::var("LOG_FILE_PREFIX") {
            config.log_file_prefix = prefix;
        }

        if let Ok(filter) = std::env::var("LOG_FILTER") {
            config.filter_directives = Some(filter);
        }

        Ok(config)
    }

    /// Set the default file prefix and filter directives, keeping any values
    /// already present in the environment.
    pub fn with_defaults(mut self, prefix: &str, directives: &str) -> Self {
        if self.log_file_prefix == LogConfig::default().log_file_prefix {
            self.log_file_prefix = prefix.to_string();
        }
        if self.filter_directives.is_none() {
            self.filter_directives = Some(directives.to_string());
        }
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Must be called at most once per process, at startup.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut filter =
        EnvFilter::from_default_env().add_directive(config.level.to_tracing_level().into());

    if let Some(ref directives) = config.filter_directives {
        for directive in directives.split(',') {
            filter = filter.add_directive(directive.parse().map_err(|e| {
                DroverError::config(format!("bad log filter directive '{}': {}", directive, e))
            })?);
        }
    }

    match config.output {
        LogOutput::Console => {
            let fmt_layer = fmt::layer().with_writer(std::io::stdout).with_target(true);
            match config.format {
                LogFormat::Text => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init(),
                LogFormat::Json => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.json())
                    .try_init(),
            }
            .map_err(|e| DroverError::config(format!("failed to install subscriber: {}", e)))?;
        }
        LogOutput::File => {
            std::fs::create_dir_all(&config.log_dir)?;
            let appender =
                tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            // The guard flushes the writer on drop; keep it for the process lifetime.
            std::mem::forget(guard);

            let fmt_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false);
            match config.format {
                LogFormat::Text => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init(),
                LogFormat::Json => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.json())
                    .try_init(),
            }
            .map_err(|e| DroverError::config(format!("failed to install subscriber: {}", e)))?;
        }
    }

    Ok(())
}
