// src/traits.rs

use crate::models::{GammaEvent, GammaMarket, Snapshot};
use async_trait::async_trait;

/// A paged source of prediction-market events, normally the Gamma API.
/// The ingestion pipeline only talks to this trait so tests can feed it
/// canned pages.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetches one page of events at the given offset. An empty page means
    /// the source is exhausted.
    async fn fetch_events_page(
        &self,
        limit: usize,
        offset: usize,
        active_only: bool,
    ) -> Result<Vec<GammaEvent>, String>;

    /// Fetches a single event by slug.
    async fn fetch_event(&self, slug: &str) -> Result<GammaEvent, String>;

    /// Fetches a single market by slug.
    async fn fetch_market(&self, slug: &str) -> Result<GammaMarket, String>;
}

/// Persistence for snapshots of ingested events.
pub trait SnapshotStore: Send + Sync {
    /// Loads the stored snapshot, or `None` when nothing usable exists.
    fn load(&self) -> Option<Snapshot>;

    /// Writes the snapshot, replacing whatever was stored before.
    fn save(&self, snapshot: &Snapshot) -> Result<(), String>;
}
