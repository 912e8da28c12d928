//! Static reference data: states, cities, categories and the event catalog.
//!
//! Locations and categories are compile-time tables. The event catalog is
//! parsed once from JSON (the bundled dataset or a user-supplied file),
//! validated, and then only read.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::EventMapError;
use crate::geo::{self, Coordinates};
use crate::models::{Category, Event};

/// Bundled mock dataset.
const BUNDLED_EVENTS: &str = include_str!("../data/events.json");

/// A city that can be selected to narrow events by distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub code: &'static str,
    pub label: &'static str,
    pub coordinates: Coordinates,
}

/// A state grouping an ordered list of cities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct State {
    pub code: &'static str,
    pub label: &'static str,
    pub cities: &'static [City],
}

/// An entry of the category selector, including the `all` pseudo-category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn city(code: &'static str, label: &'static str, lat: f64, lng: f64) -> City {
    City {
        code,
        label,
        coordinates: Coordinates::new(lat, lng),
    }
}

/// All selectable states with their cities.
pub const STATES: &[State] = &[
    State {
        code: "CA",
        label: "California",
        cities: &[
            city("SF", "San Francisco", 37.7749, -122.4194),
            city("LA", "Los Angeles", 34.0522, -118.2437),
            city("SD", "San Diego", 32.7157, -117.1611),
            city("SJ", "San Jose", 37.3382, -121.8863),
        ],
    },
    State {
        code: "NY",
        label: "New York",
        cities: &[
            city("NYC", "New York City", 40.7128, -74.006),
            city("BUF", "Buffalo", 42.8864, -78.8784),
            city("ROC", "Rochester", 43.1566, -77.6088),
        ],
    },
    State {
        code: "TX",
        label: "Texas",
        cities: &[
            city("HOU", "Houston", 29.7604, -95.3698),
            city("AUS", "Austin", 30.2672, -97.7431),
            city("DAL", "Dallas", 32.7767, -96.797),
        ],
    },
    State {
        code: "IL",
        label: "Illinois",
        cities: &[
            city("CHI", "Chicago", 41.8781, -87.6298),
            city("SPI", "Springfield", 39.7817, -89.6501),
        ],
    },
    State {
        code: "FL",
        label: "Florida",
        cities: &[
            city("MIA", "Miami", 25.7617, -80.1918),
            city("ORL", "Orlando", 28.5383, -81.3792),
            city("TPA", "Tampa", 27.9506, -82.4572),
        ],
    },
    State {
        code: "WA",
        label: "Washington",
        cities: &[
            city("SEA", "Seattle", 47.6062, -122.3321),
            city("TAC", "Tacoma", 47.2529, -122.4443),
        ],
    },
    State {
        code: "NV",
        label: "Nevada",
        cities: &[
            city("LV", "Las Vegas", 36.1699, -115.1398),
            city("RNO", "Reno", 39.5296, -119.8138),
        ],
    },
];

/// Value of the category selector meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Category selector entries, `all` first.
#[must_use]
pub fn category_options() -> Vec<CategoryOption> {
    std::iter::once(CategoryOption {
        value: ALL_CATEGORIES,
        label: "All Categories",
    })
    .chain(Category::ALL.iter().map(|c| CategoryOption {
        value: c.as_str(),
        label: c.label(),
    }))
    .collect()
}

/// Look up a state by code.
#[must_use]
pub fn find_state(code: &str) -> Option<&'static State> {
    STATES.iter().find(|s| s.code == code)
}

/// Look up a city by code across all states.
#[must_use]
pub fn find_city(code: &str) -> Option<&'static City> {
    STATES
        .iter()
        .flat_map(|s| s.cities.iter())
        .find(|c| c.code == code)
}

/// The read-only event catalog.
///
/// Cloning is cheap; all clones share the same event storage.
#[derive(Debug, Clone)]
pub struct Catalog {
    events: Arc<[Event]>,
}

impl Catalog {
    /// Build a catalog from already-parsed events.
    ///
    /// # Errors
    ///
    /// Returns [`EventMapError::Validation`] if two events share an ID.
    pub fn new(events: Vec<Event>) -> Result<Self, EventMapError> {
        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if !seen.insert(event.id.as_str()) {
                return Err(EventMapError::Validation(format!(
                    "duplicate event ID '{}'",
                    event.id
                )));
            }
        }

        debug!("catalog holds {} events", events.len());
        Ok(Self {
            events: events.into(),
        })
    }

    /// Parse a catalog from a JSON array of events.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any event fails validation.
    pub fn from_json(json: &str) -> Result<Self, EventMapError> {
        let events: Vec<Event> = serde_json::from_str(json)?;
        Self::new(events)
    }

    /// The dataset compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled dataset fails validation.
    pub fn bundled() -> Result<Self, EventMapError> {
        Self::from_json(BUNDLED_EVENTS)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, EventMapError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        info!("loaded {} events from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Load from `path` when given, otherwise use the bundled dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or validation fails.
    pub fn load_or_bundled(path: Option<&Path>) -> Result<Self, EventMapError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        }
    }

    /// All events in catalog order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events whose venue is within the degree-space proximity threshold of
    /// `center`, in catalog order.
    ///
    /// This is the flat approximation served by `/api/events`, not the
    /// haversine radius used by the city filter.
    #[must_use]
    pub fn nearby(&self, center: Coordinates) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| geo::within_nearby_threshold(&center, &e.venue.coordinates))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
