// src/search.rs
//
// Text matching over listings and events. Short queries ("eth", "fed") use
// word-boundary matching so they hit "Ethereum" but not "whether"; longer
// queries fall back to plain case-insensitive substring search.

use crate::models::{Event, Listing, Snapshot};
use regex::Regex;

/// Queries this many characters or fewer match at word boundaries only.
pub const STRICT_QUERY_LEN: usize = 3;

/// A compiled query. Build once, test against many texts.
pub struct QueryMatcher {
    query: String,
    boundary: Option<Regex>,
}

impl QueryMatcher {
    pub fn new(query: &str) -> Self {
        let query = query.trim().to_lowercase();
        let boundary = if query.chars().count() <= STRICT_QUERY_LEN {
            Regex::new(&format!(r"\b{}", regex::escape(&query))).ok()
        } else {
            None
        };
        Self { query, boundary }
    }

    pub fn is_match(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        match &self.boundary {
            Some(re) => re.is_match(&text),
            None => text.contains(&self.query),
        }
    }
}

/// The text a listing is matched against: question, description, group
/// title, then tag labels and slugs, space joined.
pub fn searchable_text(listing: &Listing) -> String {
    let tag_text = listing
        .tags
        .iter()
        .map(|t| format!("{} {}", t.label, t.slug))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{} {} {} {}",
        listing.question,
        listing.description.as_deref().unwrap_or(""),
        listing.group_item_title.as_deref().unwrap_or(""),
        tag_text
    )
}

/// Filters listings matching the query, keeping input order, up to `limit`.
pub fn search_listings(listings: &[Listing], query: &str, limit: usize) -> Vec<Listing> {
    let matcher = QueryMatcher::new(query);
    listings
        .iter()
        .filter(|l| matcher.is_match(&searchable_text(l)))
        .take(limit)
        .cloned()
        .collect()
}

/// Event-level search over a cached snapshot: case-insensitive substring
/// against event titles and tag labels/slugs, regardless of query length.
pub fn search_events<'a>(snapshot: &'a Snapshot, query: &str) -> Vec<&'a Event> {
    let query = query.trim().to_lowercase();
    snapshot
        .events
        .iter()
        .filter(|event| {
            event.title.to_lowercase().contains(&query)
                || event.tags.iter().any(|t| {
                    t.label.to_lowercase().contains(&query)
                        || t.slug.to_lowercase().contains(&query)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;

    fn listing(question: &str) -> Listing {
        Listing {
            question: question.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_short_query_matches_word_start_only() {
        let matcher = QueryMatcher::new("eth");
        assert!(matcher.is_match("Ethereum above $5k?"));
        assert!(matcher.is_match("Will ETH hit a new high"));
        assert!(!matcher.is_match("whether it rains tomorrow"));
    }

    #[test]
    fn test_long_query_uses_substring() {
        // One character past the strict threshold flips to substring mode.
        assert!(QueryMatcher::new("heth").is_match("whether"));
        assert!(!QueryMatcher::new("eth").is_match("whether"));
        assert!(QueryMatcher::new("ELECTION").is_match("Presidential election 2028"));
    }

    #[test]
    fn test_searchable_text_covers_description_group_and_tags() {
        let mut l = listing("Will turnout exceed 60%?");
        l.description = Some("State-by-state turnout".to_string());
        l.group_item_title = Some("Turnout".to_string());
        l.tags = vec![Tag {
            id: "1".to_string(),
            label: "US Politics".to_string(),
            slug: "us-politics".to_string(),
        }];

        let text = searchable_text(&l);
        assert!(text.contains("Will turnout exceed 60%?"));
        assert!(text.contains("State-by-state turnout"));
        assert!(text.contains("Turnout"));
        assert!(text.contains("US Politics"));
        assert!(text.contains("us-politics"));
    }

    #[test]
    fn test_search_listings_keeps_order_and_limit() {
        let listings = vec![
            listing("Bitcoin above 100k?"),
            listing("Rain in London?"),
            listing("Bitcoin below 50k?"),
            listing("Bitcoin ETF approved?"),
        ];

        let hits = search_listings(&listings, "bitcoin", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].question, "Bitcoin above 100k?");
        assert_eq!(hits[1].question, "Bitcoin below 50k?");
    }

    #[test]
    fn test_search_listings_matches_on_tag_slug() {
        let mut l = listing("Who wins the primary?");
        l.tags = vec![Tag {
            id: "1".to_string(),
            label: "Elections".to_string(),
            slug: "elections-2028".to_string(),
        }];

        let hits = search_listings(&[l], "elections-2028", 10);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_search_events_is_always_substring() {
        let snapshot = Snapshot::new(vec![
            Event {
                title: "Whether forecast challenge".to_string(),
                ..Default::default()
            },
            Event {
                title: "Ethereum above $5k".to_string(),
                ..Default::default()
            },
            Event {
                title: "Fed rate decision".to_string(),
                ..Default::default()
            },
        ]);

        // Event search never applies the word-boundary rule, so a 3-char
        // query hits mid-word too.
        let hits = search_events(&snapshot, "eth");
        assert_eq!(hits.len(), 2);

        let none = search_events(&snapshot, "no-such-topic");
        assert!(none.is_empty());
    }

    #[test]
    fn test_search_events_matches_tags() {
        let snapshot = Snapshot::new(vec![Event {
            title: "Quiet title".to_string(),
            tags: vec![Tag {
                id: "9".to_string(),
                label: "Crypto".to_string(),
                slug: "crypto".to_string(),
            }],
            ..Default::default()
        }]);

        assert_eq!(search_events(&snapshot, "crypto").len(), 1);
        assert_eq!(search_events(&snapshot, "CRYPTO").len(), 1);
    }
}
