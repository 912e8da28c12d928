//! Interactive session state.
//!
//! A [`Session`] holds what the user has picked: filter criteria, the one
//! selected event, and the map camera. Derived data is never stored here;
//! [`Session::view`] recomputes it from the catalog each time.
//!
//! The web page keeps selection and pan/zoom client-side; [`Session`] is the
//! model of those transitions, and what the CLI and `/api/view` build their
//! criteria and camera through.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{self, Catalog};
use crate::errors::EventMapError;
use crate::filters::{self, CategoryFilter, Criteria, DateBucket, SortKey};
use crate::geo::Coordinates;
use crate::models::Event;
use crate::stats::EventStats;

/// Zoom level used when the camera jumps to a location.
pub const DEFAULT_ZOOM: f64 = 13.0;

/// Initial map center (San Francisco).
pub const DEFAULT_CENTER: Coordinates = Coordinates::new(37.7749, -122.4194);

/// Map camera position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_CENTER.latitude,
            longitude: DEFAULT_CENTER.longitude,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Camera {
    fn center_on(&mut self, point: Coordinates) {
        self.latitude = point.latitude;
        self.longitude = point.longitude;
    }
}

/// Filtered events plus their statistics.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedView {
    pub events: Vec<Event>,
    pub stats: EventStats,
}

/// User session: criteria, selection and camera.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    criteria: Criteria,
    selected_event: Option<String>,
    camera: Camera,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a session by applying `criteria` through the regular setters.
    ///
    /// # Errors
    ///
    /// Returns an error if the state or city code is unknown.
    pub fn from_criteria(criteria: Criteria) -> Result<Self, EventMapError> {
        let mut session = Self::new();
        session.select_state(criteria.state.as_deref().unwrap_or_default())?;
        session.select_city(criteria.city.as_deref().unwrap_or_default())?;
        session.set_category(criteria.category);
        session.set_search(criteria.search);
        session.set_date_bucket(criteria.date_bucket);
        session.set_sort(criteria.sort_by);
        Ok(session)
    }

    #[must_use]
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Camera to sync the map to, `None` while no location is selected.
    #[must_use]
    pub fn location_camera(&self) -> Option<Camera> {
        self.criteria.state.as_ref().map(|_| self.camera)
    }

    #[must_use]
    pub fn selected_event(&self) -> Option<&str> {
        self.selected_event.as_deref()
    }

    /// Select a state, clearing any selected city.
    ///
    /// The camera moves to the state's first city. An empty code clears the
    /// state selection and leaves the camera alone.
    ///
    /// # Errors
    ///
    /// Returns [`EventMapError::UnknownState`] for codes not in the catalog.
    pub fn select_state(&mut self, code: &str) -> Result<(), EventMapError> {
        self.criteria.city = None;

        if code.is_empty() {
            self.criteria.state = None;
            return Ok(());
        }

        let state =
            catalog::find_state(code).ok_or_else(|| EventMapError::UnknownState(code.into()))?;
        self.criteria.state = Some(state.code.to_string());
        if let Some(first) = state.cities.first() {
            self.camera.center_on(first.coordinates);
        }
        debug!("selected state {}", state.code);
        Ok(())
    }

    /// Select a city and move the camera to it.
    ///
    /// The owning state becomes the selected state. An empty code clears the
    /// city selection.
    ///
    /// # Errors
    ///
    /// Returns [`EventMapError::UnknownCity`] for codes not in the catalog.
    pub fn select_city(&mut self, code: &str) -> Result<(), EventMapError> {
        if code.is_empty() {
            self.criteria.city = None;
            return Ok(());
        }

        let (state, city) = catalog::STATES
            .iter()
            .find_map(|s| s.cities.iter().find(|c| c.code == code).map(|c| (s, c)))
            .ok_or_else(|| EventMapError::UnknownCity(code.into()))?;

        self.criteria.state = Some(state.code.to_string());
        self.criteria.city = Some(city.code.to_string());
        self.camera.center_on(city.coordinates);
        debug!("selected city {} ({})", city.code, state.code);
        Ok(())
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.criteria.category = category;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
    }

    pub fn set_date_bucket(&mut self, bucket: DateBucket) {
        self.criteria.date_bucket = bucket;
    }

    pub fn set_sort(&mut self, sort_by: SortKey) {
        self.criteria.sort_by = sort_by;
    }

    /// Select an event, replacing any previous selection.
    pub fn select_event(&mut self, id: impl Into<String>) {
        self.selected_event = Some(id.into());
    }

    pub fn deselect_event(&mut self) {
        self.selected_event = None;
    }

    /// Free camera movement from pan/zoom. Kept until the next location change.
    pub fn move_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Compute the filtered events and their statistics.
    #[must_use]
    pub fn view(&self, catalog: &Catalog, now: NaiveDateTime) -> DerivedView {
        let events = filters::derive_view(catalog.events(), &self.criteria, now);
        let stats = EventStats::from_events(&events, now);
        DerivedView { events, stats }
    }
}
