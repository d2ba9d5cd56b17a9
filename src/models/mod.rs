pub mod alert;
pub mod event;
pub mod location;
pub mod status;

pub use alert::{Alert, AlertDetail, AlertSummary};
pub use event::{EventBrief, EventDetail, PendingEvent, WasteEvent};
pub use location::MonitoringLocation;
pub use status::{AlertStatus, CameraStatus, Enumerated, EventStatus};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Accepts an object whose `lat` and `lng` are JSON numbers.
    pub fn from_value(value: &Value) -> Option<Self> {
        let lat = value.get("lat").and_then(Value::as_f64)?;
        let lng = value.get("lng").and_then(Value::as_f64)?;
        Some(Self { lat, lng })
    }
}
