// src/rank.rs
//
// Ordering helpers over listings: trending by 24h volume, and ending-soon
// within a day window.

use crate::models::Listing;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;

/// Parses a volume field, treating anything missing or unreadable as zero.
pub fn parse_volume(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parses an end date in the formats Gamma emits: RFC 3339, a naive
/// timestamp, or a bare date (which counts as the end of that day).
pub fn parse_end_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt.and_utc());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.3f") {
        return Some(ndt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(23, 59, 59)?.and_utc());
    }
    None
}

/// Listings ranked by 24h volume, highest first. The sort is stable, so
/// equal volumes keep their input order.
pub fn trending(listings: &[Listing], limit: usize) -> Vec<Listing> {
    let mut ranked = listings.to_vec();
    ranked.sort_by(|a, b| {
        let va = parse_volume(a.volume_24hr.as_deref());
        let vb = parse_volume(b.volume_24hr.as_deref());
        vb.partial_cmp(&va).unwrap_or(Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}

/// Listings ending within the next `days_ahead` days, soonest first.
/// Listings without a parseable end date are excluded.
pub fn ending_soon(listings: &[Listing], days_ahead: i64, limit: usize) -> Vec<Listing> {
    ending_soon_at(listings, Utc::now(), days_ahead, limit)
}

/// Same as [`ending_soon`] with an explicit reference time. The window is
/// inclusive at both ends.
pub fn ending_soon_at(
    listings: &[Listing],
    now: DateTime<Utc>,
    days_ahead: i64,
    limit: usize,
) -> Vec<Listing> {
    let window_end = now + Duration::days(days_ahead);

    let mut in_window: Vec<(DateTime<Utc>, Listing)> = listings
        .iter()
        .filter_map(|l| {
            let end = parse_end_date(l.end_date.as_deref()?)?;
            if end >= now && end <= window_end {
                Some((end, l.clone()))
            } else {
                None
            }
        })
        .collect();

    in_window.sort_by_key(|(end, _)| *end);
    in_window.into_iter().take(limit).map(|(_, l)| l).collect()
}
