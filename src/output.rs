//! Output formatters for events.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats, plus the
//! small display helpers (status badge, relative date, category icon) shared
//! with the web UI.

use std::io::{self, Write};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::catalog::{self, STATES};
use crate::models::{Category, Event};
use crate::stats::EventStats;

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[92m";
const MAGENTA: &str = "\x1b[95m";
const WHITE: &str = "\x1b[97m";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// How soon an event starts, in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventStatus {
    Past,
    Today,
    Tomorrow,
    ThisWeek,
    Upcoming,
}

impl EventStatus {
    /// Classify `start` relative to `now`.
    #[must_use]
    pub fn classify(start: NaiveDateTime, now: NaiveDateTime) -> Self {
        match days_until(start, now) {
            d if d < 0 => Self::Past,
            0 => Self::Today,
            1 => Self::Tomorrow,
            d if d < 7 => Self::ThisWeek,
            _ => Self::Upcoming,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Past => "Past",
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::ThisWeek => "This Week",
            Self::Upcoming => "Upcoming",
        }
    }

    const fn color(self) -> &'static str {
        match self {
            Self::Past => DIM,
            Self::Today => GREEN,
            Self::Tomorrow => CYAN,
            Self::ThisWeek => YELLOW,
            Self::Upcoming => MAGENTA,
        }
    }
}

fn days_until(start: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (start.date() - now.date()).num_days()
}

/// Format a start time relative to `now`.
///
/// `"Today, 7:00 PM"`, `"Tomorrow, 9:00 AM"`, a weekday within the coming
/// week, otherwise `"Jun 15, 7:00 PM"`.
#[must_use]
pub fn format_event_date(start: NaiveDateTime, now: NaiveDateTime) -> String {
    match days_until(start, now) {
        0 => start.format("Today, %-I:%M %p").to_string(),
        1 => start.format("Tomorrow, %-I:%M %p").to_string(),
        2..=6 => start.format("%A, %-I:%M %p").to_string(),
        _ => start.format("%b %d, %-I:%M %p").to_string(),
    }
}

/// Icon shown next to a category, 📅 for uncategorized events.
#[must_use]
pub fn category_icon(category: Option<Category>) -> &'static str {
    match category {
        Some(Category::Music) => "🎵",
        Some(Category::Tech) => "💻",
        Some(Category::Sports) => "⚽",
        Some(Category::Food) => "🍕",
        Some(Category::Arts) => "🎨",
        None => "📅",
    }
}

/// Map marker color for a category.
#[must_use]
pub fn marker_color(category: Option<Category>) -> &'static str {
    match category {
        Some(Category::Music) => "#ec4899",
        Some(Category::Tech) => "#3b82f6",
        Some(Category::Sports) => "#22c55e",
        Some(Category::Food) => "#f97316",
        Some(Category::Arts) => "#a855f7",
        None => "#6366f1",
    }
}

/// Write events in human-readable format with colors.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, events: &[Event], now: NaiveDateTime) -> io::Result<()> {
    if events.is_empty() {
        writeln!(writer, "{DIM}No events found. Try adjusting your filters.{RESET}")?;
        return Ok(());
    }

    for event in events {
        let status = EventStatus::classify(event.start, now);
        let when = format_event_date(event.start, now);
        let icon = category_icon(event.category);
        let badge_color = if event.is_sold_out() { RED } else { GREEN };

        writeln!(
            writer,
            "{icon} {BOLD}{name}{RESET} {color}[{label}]{RESET}\n   \
             {DIM}◷{RESET} {when} │ {DIM}⊕{RESET} {venue}, {address}\n   \
             {badge_color}{badge}{RESET} │ {DIM}{url}{RESET}",
            name = event.name,
            color = status.color(),
            label = status.label(),
            venue = event.venue.name,
            address = event.venue.address,
            badge = event.ticket_badge(),
            url = event.url,
        )?;
    }
    Ok(())
}

/// Write events as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, events: &[Event]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(events)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// Each event is written as a single line of JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, events: &[Event]) -> io::Result<()> {
    for event in events {
        let json = serde_json::to_string(event)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(
    writer: &mut W,
    events: &[Event],
    format: Format,
    now: NaiveDateTime,
) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, events, now),
        Format::Json => write_json(writer, events),
        Format::Ndjson => write_ndjson(writer, events),
    }
}

/// Write the overview statistics.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_stats<W: Write>(writer: &mut W, stats: &EventStats, format: Format) -> io::Result<()> {
    if format != Format::Human {
        let json = serde_json::to_string(stats)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        return writeln!(writer, "{json}");
    }

    writeln!(writer, "{BOLD}Event Overview{RESET}")?;
    writeln!(writer, "  Total:     {CYAN}{}{RESET}", stats.total_events)?;
    writeln!(writer, "  Free:      {GREEN}{}{RESET}", stats.free_events)?;
    writeln!(writer, "  Upcoming:  {MAGENTA}{}{RESET}", stats.upcoming_events)?;
    writeln!(writer, "  Sold Out:  {RED}{}{RESET}", stats.sold_out_events)?;
    writeln!(writer, "{BOLD}Events by Category{RESET}")?;
    for (key, count) in &stats.category_counts {
        let icon = category_icon(key.parse().ok());
        writeln!(writer, "  {icon} {key:<8} {WHITE}{count}{RESET}")?;
    }
    Ok(())
}

/// Write the state/city and category catalogs.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_locations<W: Write>(writer: &mut W) -> io::Result<()> {
    for state in STATES {
        writeln!(writer, "{BOLD}{}{RESET} {DIM}{}{RESET}", state.label, state.code)?;
        for city in state.cities {
            writeln!(
                writer,
                "  {:<4} {:<16} {DIM}{:>9.4}, {:>9.4}{RESET}",
                city.code, city.label, city.coordinates.latitude, city.coordinates.longitude
            )?;
        }
    }
    writeln!(writer, "{BOLD}Categories{RESET}")?;
    for option in catalog::category_options() {
        writeln!(writer, "  {:<7} {}", option.value, option.label)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog::Catalog;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_event_status() {
        // Sunday the 15th
        let now = at(15, 12, 0);
        assert_eq!(EventStatus::classify(at(14, 23, 0), now), EventStatus::Past);
        assert_eq!(EventStatus::classify(at(15, 8, 0), now), EventStatus::Today);
        assert_eq!(EventStatus::classify(at(16, 8, 0), now), EventStatus::Tomorrow);
        assert_eq!(EventStatus::classify(at(21, 8, 0), now), EventStatus::ThisWeek);
        assert_eq!(EventStatus::classify(at(22, 8, 0), now), EventStatus::Upcoming);
    }

    #[test]
    fn test_format_event_date() {
        let now = at(15, 12, 0);
        assert_eq!(format_event_date(at(15, 19, 0), now), "Today, 7:00 PM");
        assert_eq!(format_event_date(at(16, 9, 30), now), "Tomorrow, 9:30 AM");
        assert_eq!(format_event_date(at(18, 20, 0), now), "Wednesday, 8:00 PM");
        assert_eq!(format_event_date(at(28, 10, 0), now), "Jun 28, 10:00 AM");
    }

    #[test]
    fn test_write_json_keeps_wire_format() {
        let catalog = Catalog::bundled().unwrap();
        let mut buf = Vec::new();
        write_json(&mut buf, &catalog.events()[..2]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["name"]["text"], "Los Angeles Tech Summit");
    }

    #[test]
    fn test_write_ndjson_one_line_per_event() {
        let catalog = Catalog::bundled().unwrap();
        let mut buf = Vec::new();
        write_ndjson(&mut buf, &catalog.events()[..3]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_write_human_empty() {
        let mut buf = Vec::new();
        write_human(&mut buf, &[], at(15, 12, 0)).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("No events found"));
    }

    #[test]
    fn test_write_human_shows_badges() {
        let catalog = Catalog::bundled().unwrap();
        let mut buf = Vec::new();
        // Bulls vs. Lakers is sold out
        write_human(&mut buf, &catalog.events()[3..4], at(15, 12, 0)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Chicago Bulls vs. Lakers"));
        assert!(text.contains("Sold Out"));
        assert!(text.contains("Past"));
    }
}
