//! Ingestion and lifecycle service for waste-monitoring cameras.
//!
//! Devices register their monitoring locations, send heartbeats and report detections;
//! each detection becomes a stored [`models::WasteEvent`] plus a `waste_detected`
//! [`models::Alert`]. Operators move events and alerts through their statuses.

pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod patch;
pub mod server;
pub mod services;
pub mod state;

pub use api::create_router;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
