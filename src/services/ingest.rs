use std::sync::Arc;
use tracing::{error, info};

use super::{AlertManager, EventManager, NewAlert, RequestContext};
use crate::error::{ServiceError, ServiceResult};
use crate::models::alert::WASTE_DETECTED;
use crate::models::{Alert, WasteEvent};
use crate::patch::JsonObject;

/// Result of one detection report.
#[derive(Debug, Clone)]
pub struct Detection {
    pub event: WasteEvent,
    pub alert: Alert,
}

/// Entry point for device detections: records the event, then raises its alert.
///
/// The two writes are independent. If the alert cannot be stored the event stays and the
/// failure is logged under the `reconcile` target with the event id.
pub struct IngestionFacade {
    events: Arc<EventManager>,
    alerts: Arc<AlertManager>,
}

impl IngestionFacade {
    pub fn new(events: Arc<EventManager>, alerts: Arc<AlertManager>) -> Self {
        Self { events, alerts }
    }

    pub async fn report(&self, ctx: &RequestContext, body: JsonObject) -> ServiceResult<Detection> {
        let event = self.events.create(ctx, body).await?;

        let mut metadata = JsonObject::new();
        metadata.insert("location_id", event.location_id.clone());
        metadata.insert("confidence_score", event.confidence_score);

        let new_alert = NewAlert {
            event_id: event.id,
            alert_type: WASTE_DETECTED.to_string(),
            message: format!("{} detected at {}", event.event_type, event.location_name),
            metadata,
        };

        match self.alerts.create_for_event(new_alert).await {
            Ok(alert) => {
                info!("Ingested detection {} with alert {}", event.id, alert.id);
                Ok(Detection { event, alert })
            }
            Err(ServiceError::Store(source)) => {
                error!(
                    target: "reconcile",
                    event_id = %event.id,
                    location_id = %event.location_id,
                    error = %source,
                    "event persisted without alert"
                );
                Err(ServiceError::OrphanedEvent {
                    event_id: event.id,
                    source,
                })
            }
            Err(e) => Err(e),
        }
    }
}
