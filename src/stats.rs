//! Aggregate statistics over a derived view.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::Event;

/// Counts shown in the overview panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total_events: usize,
    /// Events whose minimum price is exactly `"Free"`
    pub free_events: usize,
    pub sold_out_events: usize,
    /// Events starting strictly after `now`
    pub upcoming_events: usize,
    /// Category (or `"other"`) to count
    pub category_counts: BTreeMap<String, usize>,
}

impl EventStats {
    /// Compute statistics for an already-filtered event list.
    #[must_use]
    pub fn from_events(events: &[Event], now: NaiveDateTime) -> Self {
        let mut stats = Self {
            total_events: events.len(),
            ..Self::default()
        };

        for event in events {
            if event.is_free() {
                stats.free_events += 1;
            }
            if event.is_sold_out() {
                stats.sold_out_events += 1;
            }
            if event.start > now {
                stats.upcoming_events += 1;
            }
            *stats
                .category_counts
                .entry(event.category_key().to_string())
                .or_insert(0) += 1;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog::Catalog;
    use crate::models::OTHER_CATEGORY;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_bundled_stats() {
        let catalog = Catalog::bundled().unwrap();
        let stats = EventStats::from_events(catalog.events(), now());

        assert_eq!(stats.total_events, 25);
        assert_eq!(stats.free_events, 4);
        // Bulls vs. Lakers and Comic-Con
        assert_eq!(stats.sold_out_events, 2);
        // Everything after Jun 15 noon, including the SF Jazz Festival that evening
        assert_eq!(stats.upcoming_events, 13);
        assert_eq!(stats.category_counts["music"], 5);
        assert_eq!(stats.category_counts["sports"], 7);
        assert_eq!(stats.category_counts["arts"], 6);
        assert_eq!(stats.category_counts["food"], 4);
        assert_eq!(stats.category_counts["tech"], 3);
        assert_eq!(stats.category_counts.values().sum::<usize>(), 25);
    }

    #[test]
    fn test_empty_view() {
        let stats = EventStats::from_events(&[], now());
        assert_eq!(stats, EventStats::default());
    }

    #[test]
    fn test_uncategorized_counted_as_other() {
        let catalog = Catalog::bundled().unwrap();
        let mut event = catalog.events()[0].clone();
        event.category = None;
        event.tickets = None;

        let stats = EventStats::from_events(&[event], now());
        assert_eq!(stats.category_counts[OTHER_CATEGORY], 1);
        assert_eq!(stats.sold_out_events, 1);
        assert_eq!(stats.free_events, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(EventStats::default()).unwrap();
        assert!(value.get("totalEvents").is_some());
        assert!(value.get("soldOutEvents").is_some());
        assert!(value.get("categoryCounts").is_some());
    }
}
