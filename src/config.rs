// src/config.rs
//
// Configuration file parsing. Supports TOML config files that tune the API
// endpoint, cache location, and ingestion paging.

use crate::connectors::gamma::{DEFAULT_TIMEOUT_SECS, GAMMA_API_BASE};
use crate::ingest::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use std::fs;
use std::path::Path;

// =============================================================================
// Configuration Types
// =============================================================================

/// Root configuration structure. Every field has a default so a partial
/// file still yields a working setup.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Gamma API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Gamma API settings.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the Gamma API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Cache settings.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CacheConfig {
    /// Cache file path. Empty means the default location under the home
    /// directory.
    #[serde(default)]
    pub path: String,
}

/// Ingestion settings.
#[derive(Clone, Debug, Deserialize)]
pub struct IngestConfig {
    /// Events requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Hard cap on pages fetched per run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

fn default_base_url() -> String {
    GAMMA_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| format!("Failed to parse config: {}", e))
    }
}

// =============================================================================
// Default Configuration
// =============================================================================

/// Returns a default configuration string for documentation.
pub fn default_config_template() -> &'static str {
    r#"# polyscout configuration
#
# Every setting is optional; missing values fall back to the defaults
# shown below.

[api]
# Gamma API base URL
base_url = "https://gamma-api.polymarket.com"

# Per-request timeout in seconds
timeout_secs = 10

[cache]
# Cache file path. Leave empty for ~/.polyscout/events-cache.json
path = ""

[ingest]
# Events requested per page during a refresh
page_size = 500

# Hard cap on pages fetched per refresh
max_pages = 10
"#
}

// =============================================================================
// Tests
// =============================================================================
