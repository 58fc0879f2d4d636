//! Configuration management for the LIVE controller
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::catalog::CatalogScope;
use crate::utils::non_blank;

/// Default Services API base URL (version-pinned)
pub const DEFAULT_BASE_URL: &str = "https://api.planningcenteronline.com/services/v2";

/// Default number of future plans fetched per service type
pub const DEFAULT_PER_PAGE: u32 = 7;

/// Largest page size the Services API accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Services API access
    pub api: ApiConfig,

    /// Which service types and how many plans to load
    pub catalog: CatalogConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Services API access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API base URL
    pub base_url: String,

    /// Personal access token application id
    pub application_id: String,

    /// Personal access token secret
    pub secret_key: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Catalog scope configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Restrict plans to a single service type
    pub service_type_id: Option<String>,

    /// Restrict service types to a parent folder
    pub parent_folder: Option<String>,

    /// Number of future plans fetched per service type
    pub per_page: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            application_id: String::new(),
            secret_key: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            service_type_id: None,
            parent_folder: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl ApiConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url =
            std::env::var("PCO_BASE_URL").unwrap_or_else(|_| String::from(DEFAULT_BASE_URL));

        let application_id = std::env::var("PCO_APPLICATION_ID").unwrap_or_default();
        let secret_key = std::env::var("PCO_SECRET_KEY").unwrap_or_default();

        let request_timeout_secs = std::env::var("PCO_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.api.request_timeout_secs);

        let per_page = std::env::var("PCO_PER_PAGE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_PER_PAGE);

        let service_type_id = std::env::var("PCO_SERVICE_TYPE_ID").ok();
        let parent_folder = std::env::var("PCO_PARENT_FOLDER").ok();

        let level = std::env::var("PCO_LOG_LEVEL").unwrap_or(defaults.logging.level);
        let format = std::env::var("PCO_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            api: ApiConfig {
                base_url,
                application_id,
                secret_key,
                request_timeout_secs,
            },
            catalog: CatalogConfig {
                service_type_id,
                parent_folder,
                per_page,
            },
            logging: LoggingConfig { level, format },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Credentials are deliberately not checked here; a config without them
    /// loads fine and every request is refused locally instead.
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.api.base_url)
            .with_context(|| format!("base_url is not a valid URL: {}", self.api.base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("base_url cannot be used as a base URL: {}", self.api.base_url);
        }

        if self.api.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.catalog.per_page == 0 || self.catalog.per_page > MAX_PER_PAGE {
            anyhow::bail!("per_page must be between 1 and {MAX_PER_PAGE}");
        }

        Ok(())
    }

    /// Catalog scope derived from the restriction fields
    ///
    /// A service type id wins over a parent folder; blank values are ignored.
    pub fn scope(&self) -> CatalogScope {
        if let Some(id) = non_blank(self.catalog.service_type_id.as_deref()) {
            CatalogScope::ServiceType(id.to_string())
        } else if let Some(folder) = non_blank(self.catalog.parent_folder.as_deref()) {
            CatalogScope::ParentFolder(folder.to_string())
        } else {
            CatalogScope::All
        }
    }
}
