// src/connectors/gamma.rs
//
// HTTP connector for Polymarket's Gamma API, which serves event and market
// metadata as JSON over plain GET endpoints.

use crate::models::{GammaEvent, GammaMarket};
use crate::traits::ListingSource;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

pub const GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Client
// =============================================================================

/// Thin client over the Gamma REST endpoints. All fetching goes through the
/// `ListingSource` trait so callers never depend on this type directly.
pub struct GammaClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GammaClient {
    /// Creates a client against the production Gamma API.
    pub fn new() -> Self {
        Self::with_base_url(GAMMA_API_BASE, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client against an alternate base URL, e.g. from config.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, String> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("API returned status: {}", response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    }
}

#[async_trait]
impl ListingSource for GammaClient {
    async fn fetch_events_page(
        &self,
        limit: usize,
        offset: usize,
        active_only: bool,
    ) -> Result<Vec<GammaEvent>, String> {
        let url = format!("{}/events", self.base_url);
        let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if active_only {
            // Gamma filters on closed rather than active.
            query.push(("closed", "false".to_string()));
        }
        self.get_json(&url, &query).await
    }

    async fn fetch_event(&self, slug: &str) -> Result<GammaEvent, String> {
        let url = format!("{}/events/{}", self.base_url, slug);
        self.get_json(&url, &[]).await
    }

    async fn fetch_market(&self, slug: &str) -> Result<GammaMarket, String> {
        let url = format!("{}/markets/{}", self.base_url, slug);
        self.get_json(&url, &[]).await
    }
}
