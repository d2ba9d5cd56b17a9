use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AlertStatus, EventBrief};
use crate::patch::JsonObject;

pub const WASTE_DETECTED: &str = "waste_detected";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    /// Event that raised the alert; always set.
    pub event_id: Uuid,
    pub alert_type: String,
    pub message: String,
    pub status: AlertStatus,
    pub metadata: JsonObject,
    pub sent_at: DateTime<Utc>,
}

impl Alert {
    pub fn pending(
        event_id: Uuid,
        alert_type: impl Into<String>,
        message: impl Into<String>,
        metadata: JsonObject,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            alert_type: alert_type.into(),
            message: message.into(),
            status: AlertStatus::Pending,
            metadata,
            sent_at: now,
        }
    }

    /// Delivery is recorded synchronously with creation.
    pub fn mark_sent(&mut self, now: DateTime<Utc>) {
        self.status = AlertStatus::Sent;
        self.sent_at = now;
    }

    pub fn summary(&self) -> AlertSummary {
        AlertSummary {
            id: self.id,
            alert_type: self.alert_type.clone(),
            status: self.status,
            sent_at: self.sent_at,
        }
    }
}

/// Alert joined with the event that raised it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertDetail {
    #[serde(flatten)]
    pub alert: Alert,
    pub waste_event: Option<EventBrief>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub id: Uuid,
    pub alert_type: String,
    pub status: AlertStatus,
    pub sent_at: DateTime<Utc>,
}
