// src/ingest.rs
//
// Ingestion pipeline: walks the paged /events endpoint, normalizes the raw
// Gamma payloads into catalog types, and denormalizes event tags onto each
// listing so listing-level search has them at hand.

use crate::models::{
    decode_outcome_prices, decode_outcomes, Event, GammaEvent, GammaMarket, GammaTag, Listing,
    Snapshot, Tag,
};
use crate::traits::ListingSource;
use log::{info, warn};
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

pub const DEFAULT_PAGE_SIZE: usize = 500;
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Pause briefly after every N ingested events so a full refresh does not
/// hammer the API.
const EVENTS_PER_PAUSE: usize = 10;
const PAUSE_MS: u64 = 100;

const EVENT_URL_BASE: &str = "https://polymarket.com/event";

// =============================================================================
// Options and Callbacks
// =============================================================================

/// Tuning for a full ingestion run.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Events requested per page.
    pub page_size: usize,
    /// Hard cap on pages fetched in one run.
    pub max_pages: usize,
    /// When set, ask the API to exclude closed events.
    pub active_only: bool,
}

impl FetchOptions {
    /// Options for rebuilding the cache. Rebuilds ingest open events only.
    pub fn for_refresh(page_size: usize, max_pages: usize) -> Self {
        Self {
            page_size,
            max_pages,
            active_only: true,
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            active_only: false,
        }
    }
}

/// Progress callback: (events processed so far, running total estimate,
/// label of the event being processed). The estimate only covers pages seen
/// so far, so it grows as pagination advances.
pub type ProgressFn<'a> = dyn FnMut(usize, usize, &str) + Send + 'a;

// =============================================================================
// Pipeline
// =============================================================================

/// Fetches every event from the source, page by page, until a page comes
/// back empty or `max_pages` is reached.
///
/// Events with no listings are dropped. A fetch failure on the first page is
/// fatal; on later pages it logs a warning and returns what was ingested so
/// far.
pub async fn fetch_all(
    source: &dyn ListingSource,
    opts: &FetchOptions,
    mut on_progress: Option<&mut ProgressFn<'_>>,
) -> Result<Vec<Event>, String> {
    let mut events: Vec<Event> = Vec::new();

    for page in 0..opts.max_pages {
        let offset = page * opts.page_size;
        let batch = match source
            .fetch_events_page(opts.page_size, offset, opts.active_only)
            .await
        {
            Ok(batch) => batch,
            Err(e) if page == 0 => return Err(e),
            Err(e) => {
                warn!("Failed to fetch page {}: {}", page, e);
                break;
            }
        };

        if batch.is_empty() {
            break;
        }

        let batch_len = batch.len();
        for (i, raw) in batch.into_iter().enumerate() {
            // Events without listings have nothing to cache or rank.
            if raw.markets.is_empty() {
                continue;
            }

            if let Some(cb) = on_progress.as_mut() {
                let label = event_label(&raw);
                cb(events.len() + 1, events.len() + batch_len - i, &label);
            }

            events.push(convert_event(raw));

            if events.len() % EVENTS_PER_PAUSE == 0 {
                tokio::time::sleep(Duration::from_millis(PAUSE_MS)).await;
            }
        }
    }

    info!("Ingested {} events", events.len());
    Ok(events)
}

/// Runs a full ingestion and wraps the result in a versioned snapshot.
pub async fn build_snapshot(
    source: &dyn ListingSource,
    opts: &FetchOptions,
    on_progress: Option<&mut ProgressFn<'_>>,
) -> Result<Snapshot, String> {
    let events = fetch_all(source, opts, on_progress).await?;
    Ok(Snapshot::new(events))
}

/// Flattens events into their listings, preserving event order.
pub fn flatten(events: Vec<Event>) -> Vec<Listing> {
    events.into_iter().flat_map(|e| e.listings).collect()
}

// =============================================================================
// Normalization
// =============================================================================

/// Converts a raw Gamma event into a catalog event, filling the fallbacks
/// the API leaves open and stamping the ingestion time.
pub fn convert_event(raw: GammaEvent) -> Event {
    let tags: Vec<Tag> = raw.tags.iter().map(convert_tag).collect();
    let title = non_empty(raw.title.as_deref())
        .or_else(|| non_empty(raw.slug.as_deref()))
        .unwrap_or("Untitled Event")
        .to_string();
    let event_slug = non_empty(raw.slug.as_deref()).map(str::to_string);

    let listings: Vec<Listing> = raw
        .markets
        .into_iter()
        .map(|market| convert_market(market, event_slug.as_deref(), &tags))
        .collect();

    Event {
        id: raw.id.unwrap_or_default(),
        title,
        slug: event_slug.unwrap_or_default(),
        tags,
        active: raw.active.unwrap_or(true),
        listing_count: listings.len(),
        volume: raw.volume,
        liquidity: raw.liquidity,
        updated_at: chrono::Utc::now().to_rfc3339(),
        listings,
    }
}

/// Converts a raw Gamma market into a listing. `event_slug` and `tags` come
/// from the surrounding event; point lookups pass `None` and `&[]`.
pub fn convert_market(raw: GammaMarket, event_slug: Option<&str>, tags: &[Tag]) -> Listing {
    let slug = non_empty(raw.slug.as_deref())
        .or(event_slug)
        .unwrap_or_default()
        .to_string();
    let url = if slug.is_empty() {
        String::new()
    } else {
        format!("{}/{}", EVENT_URL_BASE, slug)
    };

    Listing {
        id: non_empty(raw.id.as_deref())
            .or(non_empty(raw.condition_id.as_deref()))
            .unwrap_or_default()
            .to_string(),
        question: non_empty(raw.question.as_deref())
            .or(non_empty(raw.group_item_title.as_deref()))
            .unwrap_or("Unknown market")
            .to_string(),
        slug,
        condition_id: raw.condition_id,
        end_date: raw.end_date_iso.filter(|s| !s.is_empty()).or(raw.end_date),
        outcomes: decode_outcomes(raw.outcomes.as_ref()),
        outcome_prices: decode_outcome_prices(raw.outcome_prices.as_ref()),
        volume: raw.volume_num.filter(|s| !s.is_empty()).or(raw.volume),
        volume_24hr: raw.volume_24hr,
        liquidity: raw.liquidity,
        url,
        description: raw.description,
        group_item_title: raw.group_item_title,
        tags: tags.to_vec(),
    }
}

fn convert_tag(raw: &GammaTag) -> Tag {
    Tag {
        id: raw.id.clone().unwrap_or_default(),
        label: raw.label.clone().unwrap_or_default(),
        slug: raw.slug.clone().unwrap_or_default(),
    }
}

fn event_label(event: &GammaEvent) -> String {
    non_empty(event.title.as_deref())
        .or_else(|| non_empty(event.slug.as_deref()))
        .unwrap_or("Untitled")
        .to_string()
}

/// Treats empty strings like missing values, mirroring how the upstream
/// payloads use both interchangeably.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
