//! HTTP routes.
//!
//! ### Locations
//! - POST /locations - Register a location
//! - GET /locations?active_only= - List locations
//! - GET /locations/:id - Get a location
//! - PATCH /locations/:id - Update a location
//! - POST /locations/:id/ping - Heartbeat
//!
//! ### Events
//! - POST /events - Report a detection (event + alert)
//! - GET /events?location_id=&status=&limit=&offset= - List events
//! - GET /events/:id - Get an event with its alerts
//! - PUT|PATCH /events/:id - Update an event
//!
//! ### Alerts
//! - GET /alerts?location_id=&status=&limit= - List alerts
//! - GET /alerts/:id - Get an alert
//! - PATCH /alerts/:id - Update or acknowledge an alert
//!
//! Every route is also served under `/api/hardware`.

pub mod alerts;
pub mod events;
pub mod extract;
pub mod health;
pub mod locations;
pub mod response;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

fn hardware_routes() -> Router<AppState> {
    Router::new()
        .route("/locations", post(locations::register).get(locations::list))
        .route(
            "/locations/:id",
            get(locations::get).patch(locations::update),
        )
        .route("/locations/:id/ping", post(locations::ping))
        .route("/events", post(events::report).get(events::list))
        .route(
            "/events/:id",
            get(events::get).put(events::update).patch(events::update),
        )
        .route("/alerts", get(alerts::list))
        .route("/alerts/:id", get(alerts::get).patch(alerts::update))
}

pub fn create_router(state: AppState) -> Router {
    let hardware = hardware_routes();

    Router::new()
        .route("/health", get(health::health_check))
        .merge(hardware.clone())
        .nest("/api/hardware", hardware)
        .with_state(state)
}
