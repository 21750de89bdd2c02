// tests/gamma_integration.rs
//
// Integration test for the Gamma connector and ingestion pipeline.
// Exercises real HTTP fetching, normalization, persistence, and search.
//
// Run with: cargo test --test gamma_integration -- --ignored --nocapture

use polyscout::connectors::gamma::GammaClient;
use polyscout::ingest::{self, FetchOptions};
use polyscout::models::{Event, SCHEMA_VERSION};
use polyscout::search;
use polyscout::store::DiskStore;
use polyscout::traits::{ListingSource, SnapshotStore};
use std::fs;

const TEST_OUTPUT_DIR: &str = "test_output";
const CACHE_FILE: &str = "events-cache.json";

/// Helper to ensure test output directory exists
fn setup_test_output_dir() -> String {
    let dir = format!("{}/gamma_integration", TEST_OUTPUT_DIR);
    fs::create_dir_all(&dir).expect("Failed to create test output directory");
    dir
}

/// Helper to clean up test output
fn cleanup_test_output(dir: &str) {
    let _ = fs::remove_dir_all(dir);
}

/// Sanity checks on one normalized event
fn validate_event(event: &Event) -> Result<(), String> {
    if event.title.is_empty() {
        return Err("Event has an empty title".to_string());
    }
    if event.listings.is_empty() {
        return Err(format!("Event '{}' has no listings", event.title));
    }
    if event.listing_count != event.listings.len() {
        return Err(format!(
            "listing_count {} does not match {} listings",
            event.listing_count,
            event.listings.len()
        ));
    }
    for listing in &event.listings {
        if listing.question.is_empty() {
            return Err(format!("Listing {} has an empty question", listing.id));
        }
        if !listing.url.is_empty() && !listing.url.starts_with("https://polymarket.com/") {
            return Err(format!("Listing URL looks wrong: {}", listing.url));
        }
    }
    Ok(())
}

/// Main integration test: fetches live events, validates and persists them,
/// then searches the reloaded cache
#[tokio::test]
#[ignore] // This test requires network access
async fn test_gamma_full_refresh_cycle() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    let output_dir = setup_test_output_dir();
    let cache_path = format!("{}/{}", output_dir, CACHE_FILE);

    println!("\n=== Gamma Refresh Cycle Test ===");
    println!("Cache: {}", cache_path);
    println!();

    // Step 1: Fetch a couple of pages of live events
    println!("Step 1: Fetching events from Gamma...");
    let client = GammaClient::new();
    let opts = FetchOptions {
        page_size: 25,
        max_pages: 2,
        active_only: true,
    };

    let mut progress_calls = 0usize;
    let mut last_done = 0usize;
    let mut on_progress = |done: usize, _total: usize, label: &str| {
        progress_calls += 1;
        assert!(
            done >= last_done,
            "Progress went backwards: {} < {}",
            done,
            last_done
        );
        assert!(!label.is_empty(), "Progress label should never be empty");
        last_done = done;
    };

    let snapshot = ingest::build_snapshot(&client, &opts, Some(&mut on_progress))
        .await
        .expect("Fetching events should succeed");

    println!("  Ingested {} events", snapshot.events.len());
    println!("  Progress callbacks: {}", progress_calls);
    assert!(!snapshot.events.is_empty(), "Gamma should return events");
    assert!(progress_calls > 0, "Progress should have been reported");

    // Step 2: Validate normalized events
    println!("Step 2: Validating events...");
    for event in &snapshot.events {
        if let Err(e) = validate_event(event) {
            panic!("Invalid event: {}", e);
        }
    }
    println!("  All events pass validation");

    // Step 3: Persist and reload
    println!("Step 3: Persisting snapshot...");
    let store = DiskStore::new(&cache_path);
    store
        .save(&snapshot)
        .expect("Saving the snapshot should succeed");

    let loaded = store.load().expect("Snapshot should load back");
    assert_eq!(loaded.schema_version, SCHEMA_VERSION);
    assert_eq!(loaded.events.len(), snapshot.events.len());
    println!("  Reloaded {} events from disk", loaded.events.len());

    // Step 4: Search the cache for a word taken from a live title
    println!("Step 4: Searching the cache...");
    let needle = snapshot.events[0]
        .title
        .split_whitespace()
        .find(|w| w.len() > 3)
        .unwrap_or("the")
        .to_lowercase();
    let hits = search::search_events(&loaded, &needle);
    println!("  Query '{}' matched {} events", needle, hits.len());
    assert!(
        !hits.is_empty(),
        "Search should find the event the query came from"
    );

    println!();
    println!("=== Test Completed Successfully ===");
    println!("  Events ingested: {}", snapshot.events.len());
    println!("  Events persisted: {}", loaded.events.len());

    cleanup_test_output(&output_dir);
}

/// Test that slug lookups resolve against live data
#[tokio::test]
#[ignore]
async fn test_gamma_point_lookups() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    println!("\n=== Gamma Point Lookup Test ===");

    let client = GammaClient::new();

    // Grab a live page to get slugs worth querying
    let page = client
        .fetch_events_page(5, 0, true)
        .await
        .expect("First page should fetch");
    assert!(!page.is_empty(), "Gamma should return events");

    let event_slug = page
        .iter()
        .find_map(|e| e.slug.clone())
        .expect("At least one event should carry a slug");

    println!("Looking up event '{}'...", event_slug);
    let raw_event = client
        .fetch_event(&event_slug)
        .await
        .expect("Event lookup should succeed");
    assert_eq!(raw_event.slug.as_deref(), Some(event_slug.as_str()));

    let event = ingest::convert_event(raw_event);
    println!("  {} ({} listings)", event.title, event.listing_count);

    // A market slug from the event payload should resolve too
    let market_slug = event
        .listings
        .iter()
        .map(|l| l.slug.clone())
        .find(|s| !s.is_empty() && *s != event.slug);

    match market_slug {
        Some(slug) => {
            println!("Looking up market '{}'...", slug);
            let raw_market = client
                .fetch_market(&slug)
                .await
                .expect("Market lookup should succeed");
            let listing = ingest::convert_market(raw_market, None, &[]);
            println!(
                "  {} outcomes: {}",
                listing.question,
                listing.outcomes.join(" / ")
            );
            assert!(!listing.question.is_empty());
            assert!(!listing.outcomes.is_empty());
        }
        None => println!("No distinct market slug on this event, skipping market lookup"),
    }

    println!("=== Lookup Test Passed ===");
}

/// Test that offset paging walks forward without repeating events
#[tokio::test]
#[ignore]
async fn test_gamma_pagination_advances() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .is_test(true)
        .try_init();

    println!("\n=== Gamma Pagination Test ===");

    let client = GammaClient::new();

    let first = client
        .fetch_events_page(5, 0, true)
        .await
        .expect("Offset 0 should fetch");
    let second = client
        .fetch_events_page(5, 5, true)
        .await
        .expect("Offset 5 should fetch");

    assert!(!first.is_empty(), "First page should have events");
    assert!(!second.is_empty(), "Second page should have events");

    let first_ids: Vec<String> = first.iter().filter_map(|e| e.id.clone()).collect();
    let second_ids: Vec<String> = second.iter().filter_map(|e| e.id.clone()).collect();
    println!("  Page 1 ids: {:?}", first_ids);
    println!("  Page 2 ids: {:?}", second_ids);

    assert!(
        second_ids.iter().all(|id| !first_ids.contains(id)),
        "Offset paging should not repeat events across pages"
    );

    println!("=== Pagination Test Passed ===");
}
