use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::sender::TransmitterConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// How sampled readings reach the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Durable local queue with batch delivery and crash recovery (default)
    #[default]
    Durable,
    /// Fire-and-forget single-shot delivery, no local queue
    Direct,
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Base URL of the remote collector (required)
    #[arg(long, env = "BACKEND_BASE_URL", default_value = "")]
    pub base_url: String,

    /// API key sent as X-API-Key on every ingest request (required)
    #[arg(long, env = "INGEST_API_KEY", default_value = "")]
    pub api_key: String,

    /// Path of the durable pending-readings file
    #[arg(long, env = "QUEUE_FILE", default_value = "pending_readings.json")]
    pub queue_file: PathBuf,

    /// Readings per batch request (floored to 1)
    #[arg(long, env = "BATCH_SIZE", default_value = "100")]
    pub batch_size: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "TIMEOUT_SECS", default_value = "5")]
    pub timeout_secs: u64,

    /// Maximum queued readings before the oldest are shed (floored to 1)
    #[arg(long, env = "MAX_PENDING", default_value = "5000")]
    pub max_pending: usize,

    /// Sampling interval in milliseconds
    #[arg(long, env = "SAMPLE_INTERVAL_MS", default_value = "1000")]
    pub sample_interval_ms: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Delivery mode (durable queue or direct single-shot)
    #[arg(long, env = "DELIVERY_MODE", default_value = "durable")]
    pub delivery_mode: DeliveryMode,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Derived fields (not CLI arguments)
    #[serde(skip)]
    #[arg(skip)]
    pub timeout: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub sample_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            queue_file: PathBuf::from("pending_readings.json"),
            batch_size: 100,
            timeout_secs: 5,
            max_pending: 5000,
            sample_interval_ms: 1000,
            log_level: LogLevel::Info,
            delivery_mode: DeliveryMode::Durable,
            config_file: None,
            timeout: Duration::from_secs(5),
            sample_interval: Duration::from_millis(1000),
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::parse_from(args);
        if let Some(config_file) = config.config_file.take() {
            config = Config::from_file(config_file)?;
        }
        config.post_process();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.post_process();
        config.validate()?;
        Ok(config)
    }

    /// Applies floors and converts raw integers into Durations.
    pub fn post_process(&mut self) {
        self.batch_size = self.batch_size.max(1);
        self.max_pending = self.max_pending.max(1);
        self.timeout = Duration::from_secs(self.timeout_secs);
        self.sample_interval = Duration::from_millis(self.sample_interval_ms);
    }

    /// Eager validation: a misconfiguration is fatal at startup, nothing
    /// else ever is.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "BACKEND_BASE_URL is required".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "INGEST_API_KEY is required".to_string(),
            ));
        }
        Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        Ok(())
    }

    pub fn transmitter_config(&self) -> TransmitterConfig {
        TransmitterConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            queue_file: self.queue_file.clone(),
            batch_size: self.batch_size,
            timeout: self.timeout,
            max_pending: self.max_pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "enviro-forwarder",
            "--base-url",
            "http://collector.local:8080",
            "--api-key",
            "secret",
        ]
    }

    #[test]
    fn defaults_match_contract() {
        let config = Config::from_args(base_args()).unwrap();
        assert_eq!(config.queue_file, PathBuf::from("pending_readings.json"));
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.max_pending, 5000);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.delivery_mode, DeliveryMode::Durable);
    }

    #[test]
    fn missing_base_url_is_fatal() {
        let result = Config::from_args(["enviro-forwarder", "--api-key", "secret"]);
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let result = Config::from_args([
            "enviro-forwarder",
            "--base-url",
            "http://collector.local:8080",
        ]);
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn unparseable_base_url_is_fatal() {
        let mut args = base_args();
        args[2] = "not a url";
        let result = Config::from_args(args);
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn batch_size_and_max_pending_are_floored() {
        let mut args = base_args();
        args.extend(["--batch-size", "0", "--max-pending", "0"]);
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.max_pending, 1);
    }

    #[test]
    fn from_file_accepts_partial_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"http://collector.local:8080\"\napi_key = \"secret\"\nbatch_size = 25\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.max_pending, 5000);
    }
}
