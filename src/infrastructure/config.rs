//! Configuration infrastructure
//!
//! Contains configuration loading and management for market search.
//!
//! Configuration is organized into three tiers:
//! 1. User-tunable settings (limits, pacing, logging)
//! 2. Market settings (search endpoint and request headers)
//! 3. Advanced settings (transport limits and parsing selectors)

#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::services::RequestHeaders;
use crate::infrastructure::parsing::ParsingConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub market: MarketConfig,

    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Settings controlling how a query is paged through
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Products returned when the caller does not pass a limit
    pub default_limit: usize,

    /// Hard bound on pages fetched for one query
    pub max_pages: u32,

    /// Lower bound of the randomized delay before each page fetch
    pub request_delay_min_ms: u64,

    /// Upper bound of the randomized delay before each page fetch
    pub request_delay_max_ms: u64,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Search endpoint and the header set presented to it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub search_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
}

/// Settings that are in the config file but rarely need changing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    /// Timeout for HTTP requests in seconds
    pub request_timeout_seconds: u64,

    /// Shared request budget of the HTTP client
    pub max_requests_per_second: u32,

    /// Selectors and patterns used by the extraction pipeline
    pub parsing: ParsingConfig,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs in the log file
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log file name inside the log directory
    pub file_name: String,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            default_limit: defaults::DEFAULT_LIMIT,
            max_pages: defaults::MAX_PAGES,
            request_delay_min_ms: defaults::REQUEST_DELAY_MIN_MS,
            request_delay_max_ms: defaults::REQUEST_DELAY_MAX_MS,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            search_url: yandex_market::SEARCH_URL.to_string(),
            user_agent: yandex_market::USER_AGENT.to_string(),
            accept_language: yandex_market::ACCEPT_LANGUAGE.to_string(),
            referer: yandex_market::REFERER.to_string(),
        }
    }
}

impl MarketConfig {
    /// Header set for page requests
    pub fn request_headers(&self) -> RequestHeaders {
        RequestHeaders {
            user_agent: self.user_agent.clone(),
            accept_language: self.accept_language.clone(),
            referer: self.referer.clone(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            parsing: ParsingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("market-search");

        Ok(config_dir)
    }

    /// Create a configuration manager for the default location
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self::with_path(config_dir.join("market_search_config.json")))
    }

    /// Create a configuration manager for an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration parse error: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                // Keep the unreadable file around for inspection
                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                self.reset_to_defaults().await
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Update user configuration settings
    pub async fn update_user_config<F>(&self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut UserConfig),
    {
        let mut config = self.load_config().await?;
        updater(&mut config.user);
        self.save_config(&config).await
    }

    /// Reset configuration to defaults (useful for troubleshooting)
    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        info!("🔄 Resetting configuration to defaults");

        let default_config = AppConfig::default();
        self.save_config(&default_config).await?;

        Ok(default_config)
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Yandex Market endpoint and request identity
pub mod yandex_market {
    /// Search results endpoint; `text` and `page` are appended as query parameters
    pub const SEARCH_URL: &str = "https://market.yandex.ru/search";

    /// Browser-like identifier sent with every request
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/145.0.0.0 Safari/537.36";

    pub const ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";

    pub const REFERER: &str = "https://market.yandex.ru/";
}

/// Default configuration values
pub mod defaults {
    /// Default number of products per query
    pub const DEFAULT_LIMIT: usize = 5;

    /// Default maximum pages to fetch for one query
    pub const MAX_PAGES: u32 = 100;

    /// Default lower bound of the delay before a page fetch
    pub const REQUEST_DELAY_MIN_MS: u64 = 500;

    /// Default upper bound of the delay before a page fetch
    pub const REQUEST_DELAY_MAX_MS: u64 = 1500;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 15;

    /// Default shared request budget
    pub const MAX_REQUESTS_PER_SECOND: u32 = 5;

    /// Default server bind address
    pub const SERVER_ADDR: &str = "127.0.0.1:8000";

    // Log configuration defaults
    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = false;

    /// Default log file name
    pub const LOG_FILE_NAME: &str = "market-search.log";

    /// Default maximum log files to keep
    pub const LOG_MAX_FILES: u32 = 5;

    /// Default auto cleanup logs setting
    pub const LOG_AUTO_CLEANUP: bool = true;
}

/// URL building helper functions
pub mod utils {
    use anyhow::{Context, Result};
    use url::Url;

    /// Build the search URL for one page of a query
    pub fn search_page_url(search_url: &str, query: &str, page: u32) -> Result<String> {
        let mut url = Url::parse(search_url)
            .with_context(|| format!("Invalid search URL: {search_url}"))?;
        url.query_pairs_mut()
            .append_pair("text", query)
            .append_pair("page", &page.to_string());
        Ok(url.into())
    }
}
