//! Event filtering and sorting.
//!
//! [`derive_view`] turns the catalog plus the current [`Criteria`] into the
//! ordered list of events to display. Stages run in a fixed order, each one
//! narrowing the output of the previous: text search, category, date bucket,
//! city radius. The result is sorted by distance when a city is selected and
//! by the chosen [`SortKey`] otherwise.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{self, ALL_CATEGORIES};
use crate::geo::{self, Coordinates};
use crate::models::{Category, Event, FREE_PRICE};

/// Calendar bucket relative to the current moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBucket {
    #[default]
    All,
    Today,
    Tomorrow,
    /// Current Monday-started week
    Week,
    /// Current calendar month
    Month,
}

impl DateBucket {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Check if `start` falls in this bucket as seen from `now`.
    #[must_use]
    pub fn contains(self, start: NaiveDateTime, now: NaiveDateTime) -> bool {
        let day = start.date();
        let today = now.date();
        match self {
            Self::All => true,
            Self::Today => day == today,
            Self::Tomorrow => today.succ_opt() == Some(day),
            Self::Week => week_start(day) == week_start(today),
            Self::Month => day.year() == today.year() && day.month() == today.month(),
        }
    }
}

/// Monday on or before `day`.
fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

impl FromStr for DateBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(format!(
                "unknown date filter: {s} (expected: all, today, tomorrow, week, month)"
            )),
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order applied when no city is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Name,
    Price,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Name => "name",
            Self::Price => "price",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "date" => Ok(Self::Date),
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            _ => Err(format!("unknown sort key: {s} (expected: date, name, price)")),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category selector value: everything, or one concrete category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => event.category == Some(category),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == ALL_CATEGORIES {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_CATEGORIES),
            Self::Only(category) => f.write_str(category.as_str()),
        }
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// User-selected filter criteria.
///
/// Also the query-string schema of `/api/view`, so every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    /// Selected state code
    pub state: Option<String>,
    /// Selected city code
    pub city: Option<String>,
    pub category: CategoryFilter,
    /// Free-text search, tokens separated by whitespace
    pub search: String,
    #[serde(rename = "date")]
    pub date_bucket: DateBucket,
    #[serde(rename = "sort")]
    pub sort_by: SortKey,
}

impl Criteria {
    /// Coordinates of the selected city, if one is selected and known.
    #[must_use]
    pub fn city_center(&self) -> Option<Coordinates> {
        let code = self.city.as_deref().filter(|c| !c.is_empty())?;
        match catalog::find_city(code) {
            Some(city) => Some(city.coordinates),
            None => {
                warn!("unknown city '{}', ignoring city filter", code);
                None
            }
        }
    }
}

/// Derive the displayed event list from the catalog and criteria.
///
/// Returns a fresh vector; `events` is never reordered. `now` anchors the
/// date buckets so the result is deterministic for a given input.
#[must_use]
pub fn derive_view(events: &[Event], criteria: &Criteria, now: NaiveDateTime) -> Vec<Event> {
    let tokens = search_tokens(&criteria.search);

    let mut filtered: Vec<&Event> = events
        .iter()
        .filter(|e| matches_search(e, &tokens))
        .filter(|e| criteria.category.matches(e))
        .filter(|e| criteria.date_bucket.contains(e.start, now))
        .collect();

    match criteria.city_center() {
        Some(center) => {
            let mut by_distance: Vec<(f64, &Event)> = filtered
                .into_iter()
                .filter(|e| geo::within_city_radius(&center, &e.venue.coordinates))
                .map(|e| (center.distance_km(&e.venue.coordinates), e))
                .collect();
            // Vec::sort_by is stable: equal distances keep catalog order
            by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
            filtered = by_distance.into_iter().map(|(_, e)| e).collect();
        }
        None => sort_events(&mut filtered, criteria.sort_by),
    }

    debug!(
        "derived view: {} of {} events (search={:?}, category={}, date={}, city={:?}, sort={})",
        filtered.len(),
        events.len(),
        criteria.search,
        criteria.category,
        criteria.date_bucket,
        criteria.city,
        criteria.sort_by
    );

    filtered.into_iter().cloned().collect()
}

/// Lowercased whitespace-separated search tokens; empty for a blank query.
fn search_tokens(search: &str) -> Vec<String> {
    search.split_whitespace().map(str::to_lowercase).collect()
}

/// Every token must appear somewhere in the event's searchable text.
fn matches_search(event: &Event, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let text = event.search_text();
    tokens.iter().all(|t| text.contains(t.as_str()))
}

/// Stable sort by the fallback key.
fn sort_events(events: &mut [&Event], key: SortKey) {
    match key {
        SortKey::Date => events.sort_by(|a, b| a.start.cmp(&b.start)),
        SortKey::Name => events.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::Price => {
            events.sort_by(|a, b| compare_prices(a.price_display(), b.price_display()));
        }
    }
}

/// Case-insensitive comparison, falling back to exact order for ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Numeric value of a price display string.
///
/// `"Free"` is zero. Reads the first number in the string, skipping a
/// leading currency symbol and thousands separators, so `"$45-$60"` is 45.
/// Returns `None` when no number can be read.
#[must_use]
pub fn price_value(display: &str) -> Option<f64> {
    let display = display.trim();
    if display.eq_ignore_ascii_case(FREE_PRICE) {
        return Some(0.0);
    }
    let start = display.find(|c: char| c.is_ascii_digit())?;
    let digits: String = display[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    digits.parse().ok()
}

/// Ascending by numeric price; unreadable prices go last, ordered as text.
fn compare_prices(a: &str, b: &str) -> Ordering {
    match (price_value(a), price_value(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
