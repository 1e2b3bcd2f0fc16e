//! Configuration types and loading

use serde::{Deserialize, Serialize};

use crate::pagination::PageSettings;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend API configuration
    pub api: ApiConfig,

    /// List screen behaviour
    pub lists: ListConfig,

    /// Filter model behaviour
    pub filters: FilterConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API, e.g. `http://localhost:3000/api`
    pub base_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListConfig {
    pub default_page_size: u64,
    pub page_size_options: Vec<u64>,
    /// Window in which refresh requests are coalesced into one fetch
    pub refresh_debounce_ms: u64,
}

impl Default for ListConfig {
    fn default() -> Self {
        let pages = PageSettings::default();
        Self {
            default_page_size: pages.default_page_size,
            page_size_options: pages.page_size_options,
            refresh_debounce_ms: 500,
        }
    }
}

impl ListConfig {
    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            default_page_size: self.default_page_size,
            page_size_options: self.page_size_options.clone(),
        }
    }

    pub fn refresh_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.refresh_debounce_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Text comparators match case-insensitively
    pub text_case_insensitive: bool,
    /// Optional YAML/JSON file overriding the comparator tables
    pub comparator_table_path: Option<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            text_case_insensitive: true,
            comparator_table_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON formatted events
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Config file error: {0}")]
    FileError(String),
}

impl From<ConfigError> for crate::error::GdError {
    fn from(err: ConfigError) -> Self {
        crate::error::GdError::Config(err.to_string())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_bool(v: &str) -> bool {
    matches!(v.trim(), "true" | "1" | "yes")
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup, defaults for absent keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("GODATA_API_URL") {
            config.api.base_url = url;
        }
        if let Some(timeout) = lookup("GODATA_API_TIMEOUT_SECONDS") {
            config.api.request_timeout_seconds = parse_env("GODATA_API_TIMEOUT_SECONDS", &timeout)?;
        }

        // Lists
        if let Some(options) = lookup("GODATA_PAGE_SIZE_OPTIONS") {
            config.lists.page_size_options = options
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse_env("GODATA_PAGE_SIZE_OPTIONS", s))
                .collect::<Result<_, _>>()?;
        }
        if let Some(size) = lookup("GODATA_PAGE_SIZE") {
            config.lists.default_page_size = parse_env("GODATA_PAGE_SIZE", &size)?;
        }
        if let Some(ms) = lookup("GODATA_REFRESH_DEBOUNCE_MS") {
            config.lists.refresh_debounce_ms = parse_env("GODATA_REFRESH_DEBOUNCE_MS", &ms)?;
        }

        // Filters
        if let Some(v) = lookup("GODATA_TEXT_CASE_INSENSITIVE") {
            config.filters.text_case_insensitive = parse_bool(&v);
        }
        if let Some(path) = lookup("GODATA_COMPARATOR_TABLE") {
            config.filters.comparator_table_path = Some(path);
        }

        // Logging
        if let Some(level) = lookup("GODATA_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(v) = lookup("GODATA_LOG_JSON") {
            config.logging.json = parse_bool(&v);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the list screens cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lists.default_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "lists.default_page_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.lists.page_size_options.contains(&0) {
            return Err(ConfigError::InvalidValue {
                key: "lists.page_size_options".to_string(),
                message: "page sizes must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
