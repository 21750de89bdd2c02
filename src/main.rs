// src/main.rs
//
// Command line front end for the listings catalog. Modes either work from
// the on-disk cache (search, stats, tags) or fetch live from the Gamma API
// (refresh, find, trending, ending, event, market).

use clap::Parser;
use polyscout::config::{default_config_template, Config};
use polyscout::connectors::gamma::GammaClient;
use polyscout::ingest::{self, FetchOptions};
use polyscout::models::{Listing, Snapshot, SnapshotStats};
use polyscout::rank;
use polyscout::search;
use polyscout::store::DiskStore;
use polyscout::traits::{ListingSource, SnapshotStore};
use std::io::Write;

/// Trending and ending modes only need the busiest slice of the catalog.
const RANK_MAX_PAGES: usize = 4;
const RANK_PRINT_LIMIT: usize = 10;
const SEARCH_PRINT_LIMIT: usize = 20;
const PROGRESS_LABEL_WIDTH: usize = 50;

#[derive(Parser)]
#[command(name = "polyscout")]
#[command(about = "Fetch, cache, search, and rank Polymarket prediction-market listings")]
struct Args {
    /// Mode of operation
    #[arg(long, default_value = "search")]
    mode: String,

    /// Search query, or slug for the event and market modes
    query: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(long, short)]
    config: Option<String>,

    /// Override the cache file location
    #[arg(long)]
    cache_path: Option<String>,

    /// Maximum results to print
    #[arg(long)]
    limit: Option<usize>,

    /// Window in days for ending mode
    #[arg(long, default_value = "7")]
    days: i64,

    /// Include closed events when fetching live
    #[arg(long)]
    include_closed: bool,

    /// Generate a default configuration file
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    // Handle config generation
    if args.generate_config {
        println!("{}", default_config_template());
        return;
    }

    let config = load_config(&args);
    let client = GammaClient::with_base_url(&config.api.base_url, config.api.timeout_secs);
    let store = resolve_store(&args, &config);

    match args.mode.as_str() {
        "refresh" => run_refresh(&client, &store, &config).await,
        "search" => run_search(&args, &client, &store, &config).await,
        "find" => run_find(&args, &client, &config).await,
        "trending" => run_trending(&args, &client, &config).await,
        "ending" => run_ending(&args, &client, &config).await,
        "event" => run_event(&args, &client).await,
        "market" => run_market(&args, &client).await,
        "stats" => run_stats(&store),
        "tags" => run_tags(&args, &store),
        _ => {
            eprintln!(
                "Unknown mode: {}. Use: refresh, search, find, trending, ending, event, market, stats, or tags",
                args.mode
            );
            std::process::exit(1);
        }
    }
}

// =============================================================================
// Refresh Mode: Rebuild the cache from the API
// =============================================================================

async fn run_refresh(client: &GammaClient, store: &DiskStore, config: &Config) {
    println!("Refreshing event cache...");

    let opts = FetchOptions::for_refresh(config.ingest.page_size, config.ingest.max_pages);

    let mut on_progress = |done: usize, total: usize, label: &str| {
        print!(
            "\r  [{}/{}] {:<width$}",
            done,
            total,
            truncate_label(label, PROGRESS_LABEL_WIDTH),
            width = PROGRESS_LABEL_WIDTH
        );
        let _ = std::io::stdout().flush();
    };

    let snapshot = match ingest::build_snapshot(client, &opts, Some(&mut on_progress)).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("\nFailed to refresh events: {}", e);
            std::process::exit(1);
        }
    };
    println!();

    if let Err(e) = store.save(&snapshot) {
        eprintln!("Failed to save cache: {}", e);
        std::process::exit(1);
    }

    print_stats(&snapshot.stats());
    println!("Cache written to {}", store.path().display());
}

// =============================================================================
// Search Mode: Event-level search against the cache
// =============================================================================

async fn run_search(args: &Args, client: &GammaClient, store: &DiskStore, config: &Config) {
    let query = require_query(args, "search mode needs a query, e.g. --mode search bitcoin");

    let snapshot = match store.load() {
        Some(snapshot) => snapshot,
        None => {
            // First run, or a cache too stale in schema to use.
            println!("No usable cache found, building one first...");
            let opts =
                FetchOptions::for_refresh(config.ingest.page_size, config.ingest.max_pages);
            let snapshot = match ingest::build_snapshot(client, &opts, None).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    eprintln!("Failed to fetch events: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = store.save(&snapshot) {
                eprintln!("Failed to save cache: {}", e);
                std::process::exit(1);
            }
            snapshot
        }
    };

    let hits = search::search_events(&snapshot, &query);
    if hits.is_empty() {
        println!("No events matching '{}'", query);
        return;
    }

    let limit = args.limit.unwrap_or(SEARCH_PRINT_LIMIT);
    println!("Found {} events matching '{}':", hits.len(), query);
    for (i, event) in hits.iter().take(limit).enumerate() {
        println!(
            "{:>3}. {} ({} listings)",
            i + 1,
            event.title,
            event.listing_count
        );
    }
    println!("Cache from {}", snapshot.last_updated);
}

// =============================================================================
// Find Mode: Listing-level search against live data
// =============================================================================

async fn run_find(args: &Args, client: &GammaClient, config: &Config) {
    let query = require_query(args, "find mode needs a query, e.g. --mode find \"rate cut\"");

    let opts = FetchOptions {
        page_size: config.ingest.page_size,
        max_pages: config.ingest.max_pages,
        active_only: !args.include_closed,
    };

    println!("Searching live listings for '{}'...", query);
    let listings = fetch_listings_or_exit(client, &opts).await;

    let limit = args.limit.unwrap_or(SEARCH_PRINT_LIMIT);
    let hits = search::search_listings(&listings, &query, limit);
    if hits.is_empty() {
        println!("No listings matching '{}'", query);
        return;
    }

    println!("Found {} listings matching '{}':", hits.len(), query);
    for (i, listing) in hits.iter().enumerate() {
        println!("{:>3}. {}", i + 1, listing.question);
        print_listing_details(listing);
    }
}

// =============================================================================
// Trending and Ending Modes: Ranked live listings
// =============================================================================

async fn run_trending(args: &Args, client: &GammaClient, config: &Config) {
    let opts = rank_fetch_options(config);

    println!("Fetching trending listings...");
    let listings = fetch_listings_or_exit(client, &opts).await;

    let limit = args.limit.unwrap_or(RANK_PRINT_LIMIT);
    let ranked = rank::trending(&listings, limit);
    if ranked.is_empty() {
        println!("No listings found");
        return;
    }

    println!("Top {} listings by 24h volume:", ranked.len());
    for (i, listing) in ranked.iter().enumerate() {
        let volume = rank::parse_volume(listing.volume_24hr.as_deref());
        println!("{:>3}. {} (${:.0})", i + 1, listing.question, volume);
        if !listing.url.is_empty() {
            println!("     {}", listing.url);
        }
    }
}

async fn run_ending(args: &Args, client: &GammaClient, config: &Config) {
    let opts = rank_fetch_options(config);

    println!("Fetching listings ending within {} days...", args.days);
    let listings = fetch_listings_or_exit(client, &opts).await;

    let limit = args.limit.unwrap_or(RANK_PRINT_LIMIT);
    let ranked = rank::ending_soon(&listings, args.days, limit);
    if ranked.is_empty() {
        println!("No listings ending within {} days", args.days);
        return;
    }

    println!("{} listings ending soonest:", ranked.len());
    for (i, listing) in ranked.iter().enumerate() {
        println!("{:>3}. {}", i + 1, listing.question);
        println!("     Ends: {}", listing.end_date.as_deref().unwrap_or("?"));
        if !listing.url.is_empty() {
            println!("     {}", listing.url);
        }
    }
}

fn rank_fetch_options(config: &Config) -> FetchOptions {
    FetchOptions {
        page_size: config.ingest.page_size,
        max_pages: config.ingest.max_pages.min(RANK_MAX_PAGES),
        active_only: true,
    }
}

// =============================================================================
// Event and Market Modes: Point lookups by slug
// =============================================================================

async fn run_event(args: &Args, client: &GammaClient) {
    let slug = require_query(args, "event mode needs a slug, e.g. --mode event us-election");

    let raw = match client.fetch_event(&slug).await {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Failed to fetch event '{}': {}", slug, e);
            std::process::exit(1);
        }
    };
    let event = ingest::convert_event(raw);

    println!("{}", event.title);
    println!("  Slug:     {}", event.slug);
    println!("  Active:   {}", event.active);
    if let Some(volume) = &event.volume {
        println!("  Volume:   {}", volume);
    }
    if !event.tags.is_empty() {
        let labels: Vec<&str> = event.tags.iter().map(|t| t.label.as_str()).collect();
        println!("  Tags:     {}", labels.join(", "));
    }
    println!("  Listings: {}", event.listing_count);
    for listing in &event.listings {
        println!("    - {}", listing.question);
    }
}

async fn run_market(args: &Args, client: &GammaClient) {
    let slug = require_query(
        args,
        "market mode needs a slug, e.g. --mode market will-btc-hit-100k",
    );

    let raw = match client.fetch_market(&slug).await {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Failed to fetch market '{}': {}", slug, e);
            std::process::exit(1);
        }
    };
    let listing = ingest::convert_market(raw, None, &[]);

    println!("{}", listing.question);
    println!("  Slug:      {}", listing.slug);
    if let Some(condition_id) = &listing.condition_id {
        println!("  Condition: {}", condition_id);
    }
    if let Some(end) = &listing.end_date {
        println!("  Ends:      {}", end);
    }
    match &listing.outcome_prices {
        Some(prices) => {
            for (outcome, price) in listing.outcomes.iter().zip(prices.iter()) {
                println!("  {:<9} {}", format!("{}:", outcome), price);
            }
        }
        None => println!("  Outcomes:  {}", listing.outcomes.join(" / ")),
    }
    if let Some(volume) = &listing.volume {
        println!("  Volume:    {}", volume);
    }
    if !listing.url.is_empty() {
        println!("  {}", listing.url);
    }
}

// =============================================================================
// Stats and Tags Modes: Cache inspection
// =============================================================================

fn run_stats(store: &DiskStore) {
    let snapshot = load_or_exit(store);
    print_stats(&snapshot.stats());
    println!("Cache file: {}", store.path().display());
}

fn run_tags(args: &Args, store: &DiskStore) {
    let snapshot = load_or_exit(store);
    let tags = snapshot.all_tags();
    if tags.is_empty() {
        println!("No tags in cache");
        return;
    }

    let limit = args.limit.unwrap_or(tags.len());
    println!("{} tags:", tags.len());
    for tag in tags.iter().take(limit) {
        println!("  {:>4}  {} ({})", tag.count, tag.label, tag.slug);
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn load_config(args: &Args) -> Config {
    match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                eprintln!("Use --generate-config to create a template.");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    }
}

fn resolve_store(args: &Args, config: &Config) -> DiskStore {
    if let Some(path) = &args.cache_path {
        DiskStore::new(path)
    } else if !config.cache.path.is_empty() {
        DiskStore::new(&config.cache.path)
    } else {
        DiskStore::default_location()
    }
}

fn require_query(args: &Args, usage: &str) -> String {
    match &args.query {
        Some(q) if !q.trim().is_empty() => q.clone(),
        _ => {
            eprintln!("{}", usage);
            std::process::exit(1);
        }
    }
}

async fn fetch_listings_or_exit(client: &GammaClient, opts: &FetchOptions) -> Vec<Listing> {
    match ingest::fetch_all(client, opts, None).await {
        Ok(events) => ingest::flatten(events),
        Err(e) => {
            eprintln!("Failed to fetch events: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_or_exit(store: &DiskStore) -> Snapshot {
    match store.load() {
        Some(snapshot) => snapshot,
        None => {
            eprintln!(
                "No cache found at {}. Run --mode refresh first.",
                store.path().display()
            );
            std::process::exit(1);
        }
    }
}

fn print_stats(stats: &SnapshotStats) {
    println!("Events:       {}", stats.total_events);
    println!("Listings:     {}", stats.total_listings);
    println!("Unique tags:  {}", stats.unique_tags);
    println!("Last updated: {}", stats.last_updated);
}

fn print_listing_details(listing: &Listing) {
    if let Some(volume) = &listing.volume_24hr {
        println!("     24h volume: {}", volume);
    }
    if let Some(end) = &listing.end_date {
        println!("     Ends: {}", end);
    }
    if !listing.url.is_empty() {
        println!("     {}", listing.url);
    }
}

fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let cut: String = label.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        label.to_string()
    }
}
