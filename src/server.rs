//! Web server for the eventmap UI.
//!
//! Provides:
//! - `GET /api/events?lat=&lng=` proximity lookup over the full catalog
//! - `GET /api/view` filtered, sorted events with statistics and camera
//! - `GET /api/locations` states, cities and categories
//! - `GET /` single-page list + map UI (Leaflet)

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::catalog::{self, Catalog, CategoryOption, State as UsState};
use crate::errors::EventMapError;
use crate::filters::Criteria;
use crate::geo::Coordinates;
use crate::models::Event;
use crate::output::{self, EventStatus};
use crate::session::{Camera, Session};
use crate::stats::EventStats;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Read-only event catalog
    catalog: Catalog,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

/// Errors returned by the JSON API as `{ "message": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Latitude and longitude are required")]
    MissingCoordinates,

    #[error("Latitude and longitude must be valid numbers")]
    InvalidCoordinates,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<EventMapError> for ApiError {
    fn from(err: EventMapError) -> Self {
        match err {
            EventMapError::UnknownCity(_) | EventMapError::UnknownState(_) => {
                Self::BadRequest(err.to_string())
            }
            EventMapError::Io(_) | EventMapError::Parse(_) | EventMapError::Validation(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingCoordinates | Self::InvalidCoordinates | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Internal(message) if message.trim().is_empty() => "Server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("rejected request: {}", self);
        }
        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/events", get(nearby_handler))
        .route("/api/view", get(view_handler))
        .route("/api/locations", get(locations_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(config: ServerConfig, catalog: Catalog) -> anyhow::Result<()> {
    let state = AppState::new(catalog);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("eventmap UI starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Query parameters of the proximity lookup.
///
/// Kept as strings so missing and malformed values get distinct messages.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl NearbyParams {
    fn coordinates(&self) -> Result<Coordinates, ApiError> {
        let (Some(lat), Some(lng)) = (
            self.lat.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            self.lng.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        ) else {
            return Err(ApiError::MissingCoordinates);
        };

        let parse = |s: &str| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(ApiError::InvalidCoordinates)
        };
        Ok(Coordinates::new(parse(lat)?, parse(lng)?))
    }
}

/// `GET /api/events?lat=&lng=`
///
/// Events within the degree-space proximity threshold of the given point.
async fn nearby_handler(
    State(state): State<AppState>,
    query: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(params) = query?;
    tracing::debug!("nearby lookup: lat={:?} lng={:?}", params.lat, params.lng);

    let center = params.coordinates()?;
    let events = state.catalog.nearby(center);
    tracing::info!("found {} nearby events", events.len());

    let events = serde_json::to_value(events).map_err(EventMapError::from)?;
    Ok(Json(json!({ "events": events })))
}

/// An event plus its precomputed display fields.
#[derive(Debug, Serialize)]
pub struct EventCard {
    #[serde(flatten)]
    pub event: Event,
    pub status: &'static str,
    pub when: String,
    pub badge: String,
    pub icon: &'static str,
    pub color: &'static str,
}

impl EventCard {
    fn new(event: Event, now: NaiveDateTime) -> Self {
        Self {
            status: EventStatus::classify(event.start, now).label(),
            when: output::format_event_date(event.start, now),
            badge: event.ticket_badge(),
            icon: output::category_icon(event.category),
            color: output::marker_color(event.category),
            event,
        }
    }
}

/// Body of `GET /api/view`.
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub criteria: Criteria,
    pub events: Vec<EventCard>,
    pub stats: EventStats,
    /// `null` while no location is selected; the map stays where it is
    pub camera: Option<Camera>,
}

/// `GET /api/view?state=&city=&category=&search=&date=&sort=`
async fn view_handler(
    State(state): State<AppState>,
    query: Result<Query<Criteria>, QueryRejection>,
) -> Result<Json<ViewResponse>, ApiError> {
    let Query(criteria) = query?;
    Ok(Json(build_view(&state.catalog, criteria, local_now())?))
}

fn build_view(
    catalog: &Catalog,
    criteria: Criteria,
    now: NaiveDateTime,
) -> Result<ViewResponse, EventMapError> {
    let session = Session::from_criteria(criteria)?;
    let view = session.view(catalog, now);

    Ok(ViewResponse {
        criteria: session.criteria().clone(),
        events: view
            .events
            .into_iter()
            .map(|e| EventCard::new(e, now))
            .collect(),
        stats: view.stats,
        camera: session.location_camera(),
    })
}

/// Body of `GET /api/locations`.
#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub states: &'static [UsState],
    pub categories: Vec<CategoryOption>,
}

/// `GET /api/locations`
async fn locations_handler() -> Json<LocationsResponse> {
    Json(LocationsResponse {
        states: catalog::STATES,
        categories: catalog::category_options(),
    })
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

/// Serve the main HTML page.
async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}

/// Single-page UI: filter controls, overview, event list and map.
const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Event Finder</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>
        :root {
            --bg: #f5f7ff;
            --surface: rgba(255,255,255,0.85);
            --text: #111827;
            --muted: #6b7280;
            --accent: #4f46e5;
            --border: #e5e7eb;
        }
        * { box-sizing: border-box; }
        body {
            margin: 0;
            font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
            background: linear-gradient(135deg, #eef2ff, #ffffff 50%, #eff6ff);
            color: var(--text);
        }
        header { text-align: center; padding: 32px 16px 16px; }
        header h1 {
            font-size: 3rem; margin: 0 0 8px;
            background: linear-gradient(90deg, #4f46e5, #9333ea, #2563eb);
            -webkit-background-clip: text; background-clip: text; color: transparent;
        }
        header p { color: var(--muted); margin: 0; }
        .panel {
            background: var(--surface); border-radius: 20px; padding: 20px;
            box-shadow: 0 10px 30px rgba(0,0,0,0.08); margin-bottom: 20px;
        }
        .container { max-width: 1400px; margin: 0 auto; padding: 16px; }
        .controls { display: grid; grid-template-columns: repeat(4, 1fr); gap: 16px; }
        .controls.second { grid-template-columns: 2fr 1fr; margin-top: 16px; }
        label { display: block; font-size: 0.85rem; font-weight: 600; margin-bottom: 6px; }
        select, input {
            width: 100%; padding: 10px; border-radius: 10px;
            border: 2px solid var(--border); background: #fff; font-size: 0.95rem;
        }
        select:disabled { background: #f3f4f6; color: #9ca3af; }
        .layout { display: flex; gap: 20px; }
        .left { width: 40%; }
        .right { width: 60%; }
        #map { height: 800px; border-radius: 20px; }
        .stats { display: grid; grid-template-columns: repeat(4, 1fr); gap: 10px; }
        .stat { text-align: center; padding: 12px; border-radius: 12px; background: #eef2ff; }
        .stat .value { font-size: 1.5rem; font-weight: 700; color: var(--accent); }
        .stat .name { font-size: 0.8rem; color: var(--muted); }
        .cats { display: grid; grid-template-columns: repeat(3, 1fr); gap: 8px; margin-top: 12px; }
        .cat { display: flex; justify-content: space-between; padding: 8px; background: #f9fafb; border-radius: 8px; text-transform: capitalize; }
        #list { max-height: 600px; overflow-y: auto; }
        .card {
            padding: 16px; border: 1px solid var(--border); border-radius: 14px;
            margin-bottom: 12px; cursor: pointer; background: #fff;
        }
        .card.selected { border-color: var(--accent); background: #eef2ff; }
        .card h3 { margin: 0 0 6px; font-size: 1.05rem; }
        .row { display: flex; justify-content: space-between; align-items: center; gap: 8px; }
        .muted { color: var(--muted); font-size: 0.85rem; }
        .pill { display: inline-block; padding: 2px 10px; border-radius: 999px; font-size: 0.75rem; background: #e0e7ff; }
        .pill.sold { background: #fee2e2; color: #991b1b; }
        .pill.avail { background: #dcfce7; color: #166534; }
        .empty { text-align: center; padding: 48px 0; color: var(--muted); }
        .marker { width: 22px; height: 22px; border-radius: 50%; border: 3px solid #fff; box-shadow: 0 2px 6px rgba(0,0,0,0.3); }
        a.details { color: #fff; background: var(--accent); padding: 6px 12px; border-radius: 10px; text-decoration: none; font-size: 0.85rem; }
        @media (max-width: 1000px) {
            .layout { flex-direction: column; }
            .left, .right { width: 100%; }
            .controls { grid-template-columns: 1fr 1fr; }
        }
    </style>
</head>
<body>
    <header>
        <h1>Event Explorer</h1>
        <p>Discover amazing events happening around you</p>
    </header>
    <div class="container">
        <div class="panel">
            <div class="controls">
                <div><label for="state">State</label><select id="state"><option value="">All States</option></select></div>
                <div><label for="city">City</label><select id="city" disabled><option value="">All Cities</option></select></div>
                <div><label for="category">Category</label><select id="category"></select></div>
                <div><label for="date">Date Range</label>
                    <select id="date">
                        <option value="all">All Dates</option>
                        <option value="today">Today</option>
                        <option value="tomorrow">Tomorrow</option>
                        <option value="week">This Week</option>
                        <option value="month">This Month</option>
                    </select>
                </div>
            </div>
            <div class="controls second">
                <div><label for="search">Search Events</label><input id="search" type="text" placeholder="Search by name, venue, or description..."></div>
                <div><label for="sort">Sort By</label>
                    <select id="sort">
                        <option value="date">Date</option>
                        <option value="name">Name</option>
                        <option value="price">Price</option>
                    </select>
                </div>
            </div>
        </div>
        <div class="layout">
            <div class="left">
                <div class="panel">
                    <h3 style="margin-top:0">Event Overview</h3>
                    <div class="stats">
                        <div class="stat"><div class="value" id="s-total">0</div><div class="name">Total Events</div></div>
                        <div class="stat"><div class="value" id="s-free">0</div><div class="name">Free Events</div></div>
                        <div class="stat"><div class="value" id="s-upcoming">0</div><div class="name">Upcoming</div></div>
                        <div class="stat"><div class="value" id="s-sold">0</div><div class="name">Sold Out</div></div>
                    </div>
                    <h4>Events by Category</h4>
                    <div class="cats" id="s-cats"></div>
                </div>
                <div class="panel">
                    <h2 style="margin-top:0">Events <span id="count" style="color:var(--accent)">(0)</span></h2>
                    <div id="list"></div>
                </div>
            </div>
            <div class="right"><div id="map"></div></div>
        </div>
    </div>
    <script>
        const ICONS = { music: '🎵', tech: '💻', sports: '⚽', food: '🍕', arts: '🎨' };
        const $ = (id) => document.getElementById(id);
        const esc = (s) => String(s ?? '').replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));

        let states = [];
        let events = [];
        let selectedId = null;
        let lastLocation = '|';
        const markers = new Map();

        const map = L.map('map').setView([37.7749, -122.4194], 13);
        L.tileLayer('https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png', {
            attribution: '&copy; OpenStreetMap &copy; CARTO'
        }).addTo(map);
        const userMarker = L.circleMarker([37.7749, -122.4194], {
            radius: 9, color: '#fff', weight: 3, fillColor: '#3b82f6', fillOpacity: 1
        }).addTo(map);

        function popupHtml(e) {
            const sold = !(e.ticket_availability && e.ticket_availability.has_available_tickets);
            return `<div style="max-width:260px">
                <div class="row"><strong>${esc(e.name.text)}</strong>
                ${e.category ? `<span class="pill">${esc(e.category)}</span>` : ''}</div>
                <div class="muted">${esc(e.when)}</div>
                <div><strong>${esc(e.venue.name)}</strong><div class="muted">${esc(e.venue.address.localized_address_display)}</div></div>
                ${e.ticket_availability ? `<p><span class="pill ${sold ? 'sold' : 'avail'}">${esc(e.badge)}</span></p>` : ''}
                <a class="details" href="${esc(e.url)}" target="_blank" rel="noopener noreferrer">View Details →</a>
            </div>`;
        }

        function select(id) {
            selectedId = id;
            renderList();
            const m = markers.get(id);
            if (m) m.openPopup();
        }

        function deselect() {
            selectedId = null;
            renderList();
        }

        function renderMarkers() {
            markers.forEach(m => m.remove());
            markers.clear();
            for (const e of events) {
                const icon = L.divIcon({
                    className: '',
                    html: `<div class="marker" title="${esc(e.name.text)}" style="background:${e.color}"></div>`,
                    iconSize: [22, 22]
                });
                const m = L.marker([Number(e.venue.latitude), Number(e.venue.longitude)], { icon })
                    .bindPopup(popupHtml(e), { offset: [0, -10], maxWidth: 300 })
                    .on('click', () => select(e.id))
                    .addTo(map);
                m.getPopup().on('remove', () => { if (selectedId === e.id) deselect(); });
                markers.set(e.id, m);
            }
        }

        function renderList() {
            $('count').textContent = `(${events.length})`;
            if (events.length === 0) {
                $('list').innerHTML = '<div class="empty"><p><strong>No events found</strong></p><p>Try adjusting your filters</p></div>';
                return;
            }
            $('list').innerHTML = events.map(e => {
                const sold = !(e.ticket_availability && e.ticket_availability.has_available_tickets);
                return `<div class="card ${e.id === selectedId ? 'selected' : ''}" data-id="${esc(e.id)}">
                    <div class="row"><h3>${esc(e.name.text)}</h3><span class="pill">${esc(e.status)}</span></div>
                    <div class="muted">◷ ${esc(e.when)}</div>
                    <div><strong>${esc(e.venue.name)}</strong> <span class="muted">${esc(e.venue.address.localized_address_display)}</span></div>
                    <div class="row" style="margin-top:8px">
                        <div>${e.category ? `<span class="pill">${esc(e.icon)} ${esc(e.category)}</span>` : ''}
                        ${e.ticket_availability ? `<span class="pill ${sold ? 'sold' : 'avail'}">${esc(e.badge)}</span>` : ''}</div>
                        <a class="details" href="${esc(e.url)}" target="_blank" rel="noopener noreferrer">View Details →</a>
                    </div>
                </div>`;
            }).join('');
            document.querySelectorAll('.card').forEach(el => {
                el.addEventListener('click', (ev) => {
                    if (ev.target.closest('a')) return;
                    select(el.dataset.id);
                });
            });
        }

        function renderStats(stats) {
            $('s-total').textContent = stats.totalEvents;
            $('s-free').textContent = stats.freeEvents;
            $('s-upcoming').textContent = stats.upcomingEvents;
            $('s-sold').textContent = stats.soldOutEvents;
            $('s-cats').innerHTML = Object.entries(stats.categoryCounts).map(([cat, n]) =>
                `<div class="cat"><span>${ICONS[cat] || '📅'} ${esc(cat)}</span><strong>${n}</strong></div>`
            ).join('');
        }

        async function refresh() {
            const params = new URLSearchParams({
                state: $('state').value,
                city: $('city').value,
                category: $('category').value,
                search: $('search').value,
                date: $('date').value,
                sort: $('sort').value
            });
            const res = await fetch(`/api/view?${params}`);
            const body = await res.json();
            if (!res.ok) {
                console.error(body.message);
                return;
            }
            events = body.events;
            if (selectedId && !events.some(e => e.id === selectedId)) selectedId = null;

            // Recenter on every state/city change; pans survive other filter changes
            const location = `${body.criteria.state ?? ''}|${body.criteria.city ?? ''}`;
            if (location !== lastLocation) {
                lastLocation = location;
                if (body.camera) {
                    map.setView([body.camera.latitude, body.camera.longitude], map.getZoom());
                    userMarker.setLatLng([body.camera.latitude, body.camera.longitude]);
                }
            }

            renderStats(body.stats);
            renderMarkers();
            renderList();
        }

        function fillCities() {
            const state = states.find(s => s.code === $('state').value);
            $('city').innerHTML = '<option value="">All Cities</option>' +
                (state ? state.cities.map(c => `<option value="${esc(c.code)}">${esc(c.label)}</option>`).join('') : '');
            $('city').disabled = !state;
        }

        async function init() {
            const res = await fetch('/api/locations');
            const body = await res.json();
            states = body.states;
            $('state').innerHTML += states.map(s => `<option value="${esc(s.code)}">${esc(s.label)}</option>`).join('');
            $('category').innerHTML = body.categories.map(c => `<option value="${esc(c.value)}">${esc(c.label)}</option>`).join('');

            $('state').addEventListener('change', () => { fillCities(); refresh(); });
            ['city', 'category', 'date', 'sort'].forEach(id => $(id).addEventListener('change', refresh));
            let timer = null;
            $('search').addEventListener('input', () => {
                clearTimeout(timer);
                timer = setTimeout(refresh, 150);
            });
            refresh();
        }

        init();
    </script>
</body>
</html>
"##;
