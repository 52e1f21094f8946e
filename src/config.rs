// Configuration File Support
//
// This module provides configuration loading for the TestRail MCP server.
// Supports TOML format with environment variable overrides.
// Configuration files are loaded from the XDG config directory: ~/.config/testrail-mcp/config.toml
// Environment variables always win, so a file is optional when the TESTRAIL_* variables are set.

use crate::testrail::retry::RetryConfig;
use crate::testrail::transport::{Credentials, TransportConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// TestRail connection settings
    pub testrail: TestRailConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Retry policy for transient TestRail failures
    pub retry: RetrySettings,
}

/// TestRail connection settings
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TestRailConfig {
    /// Instance base URL, e.g. https://example.testrail.io
    pub url: String,

    /// Account email or login
    pub username: String,

    /// API key (or password)
    pub api_key: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for TestRailConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            api_key: String::new(),
            timeout_ms: 10_000,
        }
    }
}

impl fmt::Debug for TestRailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRailConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt
    pub max_retries: usize,

    /// Delay before the first retry in milliseconds
    pub base_delay_ms: u64,

    /// Upper bound for a single delay in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location when `None`.
    ///
    /// A missing file is not an error; environment variables are applied on
    /// top either way and the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let default_path;
        let path = match path {
            Some(path) => path,
            None => {
                default_path = Self::config_path();
                &default_path
            }
        };
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load from `path` using `env` for variable lookups
    pub fn load_with_env<F>(path: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file from {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file from {:?}", path))?;
            tracing::debug!("Loaded configuration file {:?}", path);
            config
        } else {
            tracing::debug!("Config file not found at {:?}, using environment only", path);
            Config::default()
        };

        let mut config = config.apply_env_overrides(env)?;
        config.testrail.url = config.testrail.url.trim().trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/testrail-mcp/config.toml` on Linux
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("io", "testrail-mcp", "testrail-mcp") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            // Fallback if XDG dirs cannot be determined
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config").join("testrail-mcp").join("config.toml")
        }
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Environment variables take precedence over config file values:
    /// - TESTRAIL_URL
    /// - TESTRAIL_USERNAME
    /// - TESTRAIL_API_KEY
    /// - TESTRAIL_TIMEOUT_MS
    /// - TESTRAIL_MAX_RETRIES
    /// - LOG_LEVEL
    /// - LOG_FORMAT
    fn apply_env_overrides<F>(mut self, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env("TESTRAIL_URL") {
            self.testrail.url = url;
        }
        if let Some(username) = env("TESTRAIL_USERNAME") {
            self.testrail.username = username;
        }
        if let Some(api_key) = env("TESTRAIL_API_KEY") {
            self.testrail.api_key = api_key;
        }
        if let Some(timeout) = env("TESTRAIL_TIMEOUT_MS") {
            self.testrail.timeout_ms = timeout
                .trim()
                .parse()
                .with_context(|| format!("TESTRAIL_TIMEOUT_MS must be a positive integer, got {:?}", timeout))?;
        }
        if let Some(retries) = env("TESTRAIL_MAX_RETRIES") {
            self.retry.max_retries = retries
                .trim()
                .parse()
                .with_context(|| format!("TESTRAIL_MAX_RETRIES must be a non-negative integer, got {:?}", retries))?;
        }

        // Logging overrides
        if let Some(level) = env("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = env("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(self)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.testrail.url.is_empty() {
            anyhow::bail!("TESTRAIL_URL is required");
        }
        let url = url::Url::parse(&self.testrail.url)
            .with_context(|| format!("TESTRAIL_URL is not a valid URL: {}", self.testrail.url))?;
        match url.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!("TESTRAIL_URL must use http or https, got {}", other),
        }

        if self.testrail.username.trim().is_empty() {
            anyhow::bail!("TESTRAIL_USERNAME is required");
        }
        if self.testrail.api_key.trim().is_empty() {
            anyhow::bail!("TESTRAIL_API_KEY is required");
        }
        if self.testrail.timeout_ms == 0 {
            anyhow::bail!("TESTRAIL_TIMEOUT_MS must be > 0");
        }

        if self.retry.max_retries > 10 {
            anyhow::bail!("Retry budget must be <= 10");
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            anyhow::bail!("Retry base delay must not exceed max delay");
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}. Must be one of: trace, debug, info, warn, error", self.logging.level),
        }

        // Validate logging format
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => anyhow::bail!("Invalid log format: {}. Must be one of: json, pretty, compact", self.logging.format),
        }

        Ok(())
    }

    /// Convert log level string to tracing::Level
    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging.level.to_lowercase().parse()
            .map_err(|e| anyhow::anyhow!("Failed to parse log level: {}", e))
    }

    /// Transport settings derived from this configuration
    pub fn transport_config(&self) -> TransportConfig {
        let retry = RetryConfig::default()
            .max_retries(self.retry.max_retries)
            .base_delay(Duration::from_millis(self.retry.base_delay_ms))
            .max_delay(Duration::from_millis(self.retry.max_delay_ms));

        TransportConfig::new(
            self.testrail.url.clone(),
            Credentials {
                username: self.testrail.username.clone(),
                api_key: self.testrail.api_key.clone(),
            },
        )
        .with_timeout(Duration::from_millis(self.testrail.timeout_ms))
        .with_retry(retry)
    }
}
