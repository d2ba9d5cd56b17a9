use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AlertSummary, Coordinates, EventStatus};
use crate::patch::JsonObject;

/// A detection reported by a camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteEvent {
    pub id: Uuid,
    pub location_id: String,
    /// Snapshot of the location name taken at creation.
    pub location_name: String,
    pub event_type: String,
    pub coordinates: Option<Coordinates>,
    pub confidence_score: f64,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub status: EventStatus,
    pub metadata: JsonObject,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WasteEvent {
    pub fn brief(&self) -> EventBrief {
        EventBrief {
            location_id: self.location_id.clone(),
            location_name: self.location_name.clone(),
            event_type: self.event_type.clone(),
            coordinates: self.coordinates,
        }
    }
}

/// Event as returned by `GET /events/{id}`, with its alerts joined in.
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: WasteEvent,
    pub alerts: Vec<AlertSummary>,
}

/// The event columns embedded in alert responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBrief {
    pub location_id: String,
    pub location_name: String,
    pub event_type: String,
    pub coordinates: Option<Coordinates>,
}

/// Outstanding work handed back to a device on heartbeat.
#[derive(Debug, Clone, Serialize)]
pub struct PendingEvent {
    pub id: Uuid,
    pub event_type: String,
    pub status: EventStatus,
}

impl From<&WasteEvent> for PendingEvent {
    fn from(event: &WasteEvent) -> Self {
        Self {
            id: event.id,
            event_type: event.event_type.clone(),
            status: event.status,
        }
    }
}
