use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CameraStatus, Coordinates};
use crate::patch::JsonObject;

/// A registered camera site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringLocation {
    /// Assigned by the device at registration, never changed afterwards.
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub camera_status: CameraStatus,
    /// Open settings; heartbeats write under `settings.telemetry`.
    pub settings: JsonObject,
    pub last_ping: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
