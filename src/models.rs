//! Data models for the event catalog.
//!
//! The JSON wire format nests most fields one level deep (`name.text`,
//! `start.local`, `venue.address.localized_address_display`). Events are
//! read through [`RawEvent`] and converted into [`Event`], which carries
//! parsed coordinates, timestamp and category. Serializing an [`Event`]
//! produces the wire format again.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::EventMapError;
use crate::geo::Coordinates;

/// Price display value used for events without a charge.
pub const FREE_PRICE: &str = "Free";

/// Key used for events without a category in aggregate counts.
pub const OTHER_CATEGORY: &str = "other";

/// Format of the `start.local` field.
const START_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Music,
    Tech,
    Sports,
    Food,
    Arts,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 5] = [Self::Music, Self::Tech, Self::Sports, Self::Food, Self::Arts];

    /// Wire value for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Tech => "tech",
            Self::Sports => "sports",
            Self::Food => "food",
            Self::Arts => "arts",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Music => "Music",
            Self::Tech => "Technology",
            Self::Sports => "Sports",
            Self::Food => "Food & Drink",
            Self::Arts => "Arts & Culture",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Exact match: category values are case-sensitive
        match s {
            "music" => Ok(Self::Music),
            "tech" => Ok(Self::Tech),
            "sports" => Ok(Self::Sports),
            "food" => Ok(Self::Food),
            "arts" => Ok(Self::Arts),
            _ => Err(format!(
                "unknown category: {s} (expected: music, tech, sports, food, arts)"
            )),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single event from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub struct Event {
    /// Unique event ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Free-form description (empty when absent)
    pub description: String,

    /// Local start time, no timezone attached
    pub start: NaiveDateTime,

    /// Event page URL
    pub url: String,

    /// Category, `None` means "other"
    pub category: Option<Category>,

    pub venue: Venue,

    /// Ticket information, absent for some sources
    pub tickets: Option<TicketAvailability>,
}

/// Where an event takes place.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
}

/// Ticket availability for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketAvailability {
    pub has_available_tickets: bool,

    /// Display string such as `"$45"` or `"Free"`
    pub minimum_price: Option<String>,
}

impl Event {
    /// Category key for aggregation, `"other"` when uncategorized.
    #[must_use]
    pub fn category_key(&self) -> &'static str {
        self.category.map_or(OTHER_CATEGORY, Category::as_str)
    }

    /// Minimum price as displayed, defaulting to `"Free"` when none is listed.
    #[must_use]
    pub fn price_display(&self) -> &str {
        self.tickets
            .as_ref()
            .and_then(|t| t.minimum_price.as_deref())
            .unwrap_or(FREE_PRICE)
    }

    /// Whether the listed minimum price is exactly `"Free"`.
    ///
    /// Unlike [`Event::price_display`], a missing price does not count.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.tickets
            .as_ref()
            .and_then(|t| t.minimum_price.as_deref())
            == Some(FREE_PRICE)
    }

    /// Whether no tickets can be bought, including when availability is unknown.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        !self.tickets.as_ref().is_some_and(|t| t.has_available_tickets)
    }

    /// Ticket badge text shown next to the event.
    #[must_use]
    pub fn ticket_badge(&self) -> String {
        if self.is_sold_out() {
            "Sold Out".to_string()
        } else {
            format!("From {}", self.price_display())
        }
    }

    /// Lowercased text that free-text search runs against.
    #[must_use]
    pub fn search_text(&self) -> String {
        [
            self.name.as_str(),
            self.venue.name.as_str(),
            self.venue.address.as_str(),
            self.description.as_str(),
            self.category.map_or("", Category::as_str),
        ]
        .join(" ")
        .to_lowercase()
    }
}

/// Parse a `start.local` value.
///
/// Accepts a full local date-time or a bare date (midnight).
///
/// # Errors
///
/// Returns [`EventMapError::Validation`] if no accepted format matches.
pub fn parse_start(s: &str) -> Result<NaiveDateTime, EventMapError> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, START_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN)))
        .map_err(|e| EventMapError::Validation(format!("invalid start time '{s}': {e}")))
}

fn parse_coordinate(field: &str, value: &str) -> Result<f64, EventMapError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| EventMapError::Validation(format!("invalid {field} '{value}': {e}")))
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Event as it appears in the JSON catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub name: TextField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<TextField>,
    pub start: StartField,
    pub url: String,
    pub venue: RawVenue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_availability: Option<RawTicketAvailability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextField {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartField {
    pub local: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVenue {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub address: RawAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAddress {
    pub localized_address_display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTicketAvailability {
    pub has_available_tickets: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_ticket_price: Option<RawPrice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPrice {
    pub display: String,
}

impl TryFrom<RawEvent> for Event {
    type Error = EventMapError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err(EventMapError::Validation("empty event ID".into()));
        }

        let coordinates = Coordinates::new(
            parse_coordinate("latitude", &raw.venue.latitude)?,
            parse_coordinate("longitude", &raw.venue.longitude)?,
        );
        if !coordinates.is_valid() {
            return Err(EventMapError::Validation(format!(
                "event {}: coordinates ({}, {}) out of range",
                raw.id, coordinates.latitude, coordinates.longitude
            )));
        }

        let start = parse_start(&raw.start.local)?;

        let category = raw
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::parse::<Category>)
            .transpose()
            .map_err(|e| EventMapError::Validation(format!("event {}: {e}", raw.id)))?;

        Ok(Self {
            id: raw.id,
            name: raw.name.text,
            description: raw.description.map(|d| d.text).unwrap_or_default(),
            start,
            url: raw.url,
            category,
            venue: Venue {
                name: raw.venue.name,
                address: raw.venue.address.localized_address_display,
                coordinates,
            },
            tickets: raw.ticket_availability.map(|t| TicketAvailability {
                has_available_tickets: t.has_available_tickets,
                minimum_price: t.minimum_ticket_price.map(|p| p.display),
            }),
        })
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            name: TextField { text: event.name },
            description: Some(TextField {
                text: event.description,
            }),
            start: StartField {
                local: event.start.format(START_FORMAT).to_string(),
            },
            url: event.url,
            venue: RawVenue {
                name: event.venue.name,
                latitude: event.venue.coordinates.latitude.to_string(),
                longitude: event.venue.coordinates.longitude.to_string(),
                address: RawAddress {
                    localized_address_display: event.venue.address,
                },
            },
            ticket_availability: event.tickets.map(|t| RawTicketAvailability {
                has_available_tickets: t.has_available_tickets,
                minimum_ticket_price: t.minimum_price.map(|display| RawPrice { display }),
            }),
            category: event.category.map(|c| c.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "1",
        "name": { "text": "San Francisco Jazz Festival" },
        "description": { "text": "Annual jazz celebration featuring world-class musicians." },
        "start": { "local": "2025-06-15T19:00:00" },
        "url": "https://example.com/event/1",
        "venue": {
            "name": "SFJAZZ Center",
            "latitude": "37.7749",
            "longitude": "-122.4194",
            "address": { "localized_address_display": "201 Franklin St, San Francisco, CA" }
        },
        "ticket_availability": {
            "has_available_tickets": true,
            "minimum_ticket_price": { "display": "$45" }
        },
        "category": "music"
    }"#;

    fn sample() -> serde_json::Value {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_event() {
        let event: Event = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(event.id, "1");
        assert_eq!(event.name, "San Francisco Jazz Festival");
        assert_eq!(event.category, Some(Category::Music));
        assert!((event.venue.coordinates.latitude - 37.7749).abs() < 1e-9);
        assert!((event.venue.coordinates.longitude - (-122.4194)).abs() < 1e-9);
        assert_eq!(event.start.format("%Y-%m-%d %H:%M").to_string(), "2025-06-15 19:00");
        assert_eq!(event.price_display(), "$45");
        assert!(!event.is_free());
        assert!(!event.is_sold_out());
        assert_eq!(event.ticket_badge(), "From $45");
    }

    #[test]
    fn test_serialize_keeps_wire_shape() {
        let event: Event = serde_json::from_str(SAMPLE).unwrap();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["name"]["text"], "San Francisco Jazz Festival");
        assert_eq!(value["start"]["local"], "2025-06-15T19:00:00");
        assert_eq!(value["venue"]["latitude"], "37.7749");
        assert_eq!(
            value["ticket_availability"]["minimum_ticket_price"]["display"],
            "$45"
        );
        assert_eq!(value["category"], "music");
    }

    #[test]
    fn test_optional_fields() {
        let mut value = sample();
        let obj = value.as_object_mut().unwrap();
        obj.remove("category");
        obj.remove("ticket_availability");
        obj.remove("description");

        let event: Event = serde_json::from_value(value).unwrap();
        assert_eq!(event.category, None);
        assert_eq!(event.category_key(), OTHER_CATEGORY);
        assert_eq!(event.description, "");
        assert!(event.is_sold_out());
        assert!(!event.is_free());
        assert_eq!(event.price_display(), FREE_PRICE);
        assert_eq!(event.ticket_badge(), "Sold Out");
    }

    #[test]
    fn test_free_is_case_sensitive() {
        let mut value = sample();
        value["ticket_availability"]["minimum_ticket_price"]["display"] = "free".into();
        let event: Event = serde_json::from_value(value.clone()).unwrap();
        assert!(!event.is_free());

        value["ticket_availability"]["minimum_ticket_price"]["display"] = "Free".into();
        let event: Event = serde_json::from_value(value).unwrap();
        assert!(event.is_free());
        assert_eq!(event.ticket_badge(), "From Free");
    }

    #[test]
    fn test_rejects_invalid_events() {
        let mut value = sample();
        value["venue"]["latitude"] = "north".into();
        assert!(serde_json::from_value::<Event>(value).is_err());

        let mut value = sample();
        value["venue"]["latitude"] = "123.0".into();
        assert!(serde_json::from_value::<Event>(value).is_err());

        let mut value = sample();
        value["start"]["local"] = "next friday".into();
        assert!(serde_json::from_value::<Event>(value).is_err());

        let mut value = sample();
        value["category"] = "Music".into();
        assert!(serde_json::from_value::<Event>(value).is_err());

        let mut value = sample();
        value["id"] = "".into();
        assert!(serde_json::from_value::<Event>(value).is_err());
    }

    #[test]
    fn test_parse_start_date_only() {
        let start = parse_start("2025-06-15").unwrap();
        assert_eq!(start.format(START_FORMAT).to_string(), "2025-06-15T00:00:00");
    }

    #[test]
    fn test_search_text() {
        let event: Event = serde_json::from_str(SAMPLE).unwrap();
        let text = event.search_text();
        assert!(text.contains("jazz festival"));
        assert!(text.contains("sfjazz center"));
        assert!(text.contains("franklin st"));
        assert!(text.contains("world-class"));
        assert!(text.ends_with("music"));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("arts".parse::<Category>().unwrap(), Category::Arts);
        assert!("ARTS".parse::<Category>().is_err());
        assert!("all".parse::<Category>().is_err());
    }
}
