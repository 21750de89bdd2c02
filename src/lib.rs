// src/lib.rs

// 1. Data Structures (The "Nouns")
// explicit 'pub' makes them available to main.rs
pub mod models;

// 2. Interfaces (The "Contract")
pub mod traits;

// 3. Adapters (The "Plumbing")
pub mod connectors;

// 4. Ingestion Pipeline (The "Feed")
pub mod ingest;

// 5. Disk Persistence (The "Cache")
pub mod store;

// 6. Matching (The "Filter")
pub mod search;

// 7. Ranking (The "Order")
pub mod rank;

// 8. Configuration (The "Knobs")
pub mod config;
