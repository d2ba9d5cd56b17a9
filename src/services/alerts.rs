use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::{parse_id, RequestContext};
use crate::clock;
use crate::config::Fallbacks;
use crate::db::{AlertFilter, Store};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Alert, AlertDetail, AlertStatus};
use crate::patch::{parse_timestamp, Fields, JsonObject, Patch};

const UPDATABLE_FIELDS: &[&str] = &["status", "alert_type", "message", "sent_at", "metadata"];

const ACKNOWLEDGED_AT: &str = "acknowledged_at";
const ACKNOWLEDGED_BY: &str = "acknowledged_by";

/// An alert to raise for an existing event.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub event_id: Uuid,
    pub alert_type: String,
    pub message: String,
    pub metadata: JsonObject,
}

pub struct AlertManager {
    store: Arc<dyn Store>,
    fallbacks: Fallbacks,
}

impl AlertManager {
    pub fn new(store: Arc<dyn Store>, fallbacks: Fallbacks) -> Self {
        Self { store, fallbacks }
    }

    /// Persists the alert already marked as sent; delivery is not tracked separately.
    pub async fn create_for_event(&self, new: NewAlert) -> ServiceResult<Alert> {
        if new.event_id.is_nil() {
            return Err(ServiceError::validation(
                "missing required field: event_id",
            ));
        }
        if new.alert_type.trim().is_empty() {
            return Err(ServiceError::validation(
                "missing required field: alert_type",
            ));
        }

        let now = clock::now();
        let mut alert = Alert::pending(
            new.event_id,
            new.alert_type,
            new.message,
            new.metadata,
            now,
        );
        alert.mark_sent(now);

        self.store.insert_alert(&alert).await?;
        info!("Raised alert {} for event {}", alert.id, alert.event_id);
        Ok(alert)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<AlertDetail> {
        let alert_id = parse_id("alert", id)?;
        self.store
            .get_alert(alert_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("alert", id))
    }

    pub async fn list(&self, filter: &AlertFilter) -> ServiceResult<Vec<AlertDetail>> {
        Ok(self.store.list_alerts(filter).await?)
    }

    /// Applies a patch. Moving to `acknowledged` stamps who and when into `metadata`,
    /// after the caller's own metadata merge.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        body: JsonObject,
    ) -> ServiceResult<AlertDetail> {
        let fields = Fields::new(body);
        fields.require_any(UPDATABLE_FIELDS)?;

        let status = fields.enumerated::<AlertStatus>("status")?;
        let alert_type = fields.string("alert_type")?;
        let message = fields.string("message")?;
        let sent_at = match fields.timestamp("sent_at")? {
            Patch::Null => return Err(ServiceError::validation("sent_at is not a valid timestamp")),
            other => other,
        };
        let metadata = fields.object("metadata")?;
        let acknowledged_by = fields
            .nullable_string(ACKNOWLEDGED_BY)
            .ok()
            .and_then(Patch::into_set)
            .filter(|by| !by.trim().is_empty());

        let mut detail = self.get(id).await?;
        let alert = &mut detail.alert;

        if let Patch::Set(status) = status {
            alert.status = status;
        }
        if let Patch::Set(alert_type) = alert_type {
            alert.alert_type = alert_type;
        }
        if let Patch::Set(message) = message {
            alert.message = message;
        }
        if let Patch::Set(sent_at) = sent_at {
            alert.sent_at = sent_at;
        }
        match metadata {
            Patch::Set(patch) => alert.metadata.merge(&patch),
            Patch::Null => alert.metadata = JsonObject::new(),
            Patch::Absent => {}
        }

        if status == Patch::Set(AlertStatus::Acknowledged) {
            let previous = alert
                .metadata
                .get(ACKNOWLEDGED_AT)
                .and_then(|v| v.as_str())
                .and_then(parse_timestamp);
            let at = match previous {
                Some(previous) => clock::now_after(previous),
                None => clock::now(),
            };
            let by = acknowledged_by
                .or_else(|| ctx.device_id.clone())
                .unwrap_or_else(|| self.fallbacks.acknowledger.clone());

            alert.metadata.insert(ACKNOWLEDGED_AT, clock::stamp(at));
            alert.metadata.insert(ACKNOWLEDGED_BY, by);
        }

        if !self.store.update_alert(alert).await? {
            return Err(ServiceError::not_found("alert", id));
        }
        info!("Updated alert {} (status {})", alert.id, alert.status);
        Ok(detail)
    }
}
