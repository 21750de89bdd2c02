// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// =============================================================================
// Catalog Types
// =============================================================================

/// Schema version stamped into every snapshot we write. Caches written under
/// a different version are discarded and rebuilt rather than reinterpreted.
pub const SCHEMA_VERSION: &str = "2.0.0";

/// A topical tag attached to an event. Tags are denormalized onto each of the
/// event's listings during ingestion so listing-level search can match them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: String,
    pub slug: String,
}

/// A single tradeable listing ("Will X happen?") inside an event.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub question: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub outcomes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome_prices: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_24hr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_item_title: Option<String>,
    /// Copied from the parent event during ingestion.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// An event grouping one or more listings under a shared title and tag set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub active: bool,
    pub listing_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<String>,
    pub updated_at: String,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

/// The full cache payload: every ingested event plus freshness metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: String,
    pub last_updated: String,
    pub events: Vec<Event>,
}

impl Snapshot {
    /// Wraps freshly ingested events with the current schema version and
    /// an RFC 3339 timestamp.
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            last_updated: chrono::Utc::now().to_rfc3339(),
            events,
        }
    }

    /// Summary counters over the snapshot contents.
    pub fn stats(&self) -> SnapshotStats {
        let unique_labels: HashSet<&str> = self
            .events
            .iter()
            .flat_map(|e| e.tags.iter().map(|t| t.label.as_str()))
            .collect();
        SnapshotStats {
            total_events: self.events.len(),
            total_listings: self.events.iter().map(|e| e.listing_count).sum(),
            last_updated: self.last_updated.clone(),
            unique_tags: unique_labels.len(),
        }
    }

    /// Every tag in the snapshot with the number of events carrying it,
    /// most used first. Ties keep slug order so output is deterministic.
    pub fn all_tags(&self) -> Vec<TagCount> {
        let mut by_slug: BTreeMap<&str, TagCount> = BTreeMap::new();
        for event in &self.events {
            for tag in &event.tags {
                by_slug
                    .entry(tag.slug.as_str())
                    .and_modify(|t| t.count += 1)
                    .or_insert_with(|| TagCount {
                        label: tag.label.clone(),
                        slug: tag.slug.clone(),
                        count: 1,
                    });
            }
        }
        let mut tags: Vec<TagCount> = by_slug.into_values().collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count));
        tags
    }
}

/// Counters reported for a snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct SnapshotStats {
    pub total_events: usize,
    pub total_listings: usize,
    pub last_updated: String,
    pub unique_tags: usize,
}

/// A tag with the number of events carrying it.
#[derive(Clone, Debug, Serialize)]
pub struct TagCount {
    pub label: String,
    pub slug: String,
    pub count: usize,
}

// --- Raw Gamma API Types (Used for JSON parsing only) ---
// Gamma is loose about types: ids and volumes arrive as strings or numbers
// depending on the endpoint, and outcome arrays are often JSON encoded
// inside a string. Everything is optional here; normalization happens at
// ingestion time.

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaTag {
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub group_item_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub end_date_iso: Option<String>,
    /// JSON-encoded string or plain array depending on the endpoint.
    #[serde(default)]
    pub outcomes: Option<serde_json::Value>,
    #[serde(default)]
    pub outcome_prices: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub volume: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub volume_num: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub volume_24hr: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub liquidity: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaEvent {
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub volume: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub liquidity: Option<String>,
    #[serde(default, deserialize_with = "de_vec_or_null")]
    pub tags: Vec<GammaTag>,
    #[serde(default, deserialize_with = "de_vec_or_null")]
    pub markets: Vec<GammaMarket>,
}

// =============================================================================
// Field Decoding
// =============================================================================

/// Decodes a Gamma `outcomes` field. Accepts a plain JSON array or a
/// JSON-encoded string like `"[\"Yes\", \"No\"]"`; anything unreadable
/// falls back to the binary default.
pub fn decode_outcomes(raw: Option<&serde_json::Value>) -> Vec<String> {
    raw.and_then(decode_string_list)
        .unwrap_or_else(|| vec!["Yes".to_string(), "No".to_string()])
}

/// Decodes a Gamma `outcomePrices` field the same way, but keeps absence
/// (and undecodable values) as `None`.
pub fn decode_outcome_prices(raw: Option<&serde_json::Value>) -> Option<Vec<String>> {
    raw.and_then(decode_string_list)
}

fn decode_string_list(value: &serde_json::Value) -> Option<Vec<String>> {
    let value = match value {
        serde_json::Value::String(s) => serde_json::from_str(s).ok()?,
        other => other.clone(),
    };
    serde_json::from_value::<Vec<String>>(value.clone())
        .ok()
        .or_else(|| {
            serde_json::from_value::<Vec<f64>>(value)
                .ok()
                .map(|nums| nums.iter().map(|n| n.to_string()).collect())
        })
}

fn de_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Str(String),
        F64(f64),
        I64(i64),
        U64(u64),
        Null(Option<()>),
    }

    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Str(s) => Some(s),
        Value::F64(n) => Some(n.to_string()),
        Value::I64(n) => Some(n.to_string()),
        Value::U64(n) => Some(n.to_string()),
        Value::Null(_) => None,
    })
}

// The serde default only covers missing fields; Gamma also sends explicit
// nulls where a list is expected.
fn de_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
