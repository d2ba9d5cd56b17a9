use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{parse_id, LocationRegistry, RequestContext, HARDWARE_SOURCE};
use crate::clock;
use crate::config::Fallbacks;
use crate::db::{EventFilter, Store};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{EventDetail, EventStatus, WasteEvent};
use crate::patch::{Fields, JsonObject, Patch};

/// Score recorded when a device does not report one.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

const UPDATABLE_FIELDS: &[&str] = &[
    "status",
    "resolved_at",
    "confidence_score",
    "image_url",
    "video_url",
    "coordinates",
    "metadata",
];

pub struct EventManager {
    store: Arc<dyn Store>,
    locations: Arc<LocationRegistry>,
    fallbacks: Fallbacks,
}

impl EventManager {
    pub fn new(
        store: Arc<dyn Store>,
        locations: Arc<LocationRegistry>,
        fallbacks: Fallbacks,
    ) -> Self {
        Self {
            store,
            locations,
            fallbacks,
        }
    }

    /// Records a detection. The location does not have to be registered yet; its name is
    /// snapshotted when it is.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        body: JsonObject,
    ) -> ServiceResult<WasteEvent> {
        let fields = Fields::new(body);

        let location_id = fields.required_text("location_id")?;
        let event_type = fields.required_text("event_type")?;
        let coordinates = fields
            .coordinates("coordinates")?
            .into_set()
            .ok_or_else(|| ServiceError::validation("missing required field: coordinates"))?;
        let confidence_score = fields
            .unit_interval("confidence_score")?
            .into_set()
            .unwrap_or(DEFAULT_CONFIDENCE);
        let image_url = fields.nullable_string("image_url")?.into_set();
        let video_url = fields.nullable_string("video_url")?.into_set();
        let mut metadata = fields.object("metadata")?.into_set().unwrap_or_default();

        metadata.insert("source", HARDWARE_SOURCE);
        metadata.insert("device_id", ctx.device_id_or(&self.fallbacks.device_id));

        let location_name = match self.locations.find(&location_id).await? {
            Some(location) => location.name,
            None => {
                warn!("Event reported for unregistered location {}", location_id);
                self.fallbacks.location_name.clone()
            }
        };

        let now = clock::now();
        let event = WasteEvent {
            id: Uuid::new_v4(),
            location_id,
            location_name,
            event_type,
            coordinates: Some(coordinates),
            confidence_score,
            image_url,
            video_url,
            status: EventStatus::Active,
            metadata,
            detected_at: now,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_event(&event).await?;
        info!(
            "Created event {} ({}) at {}",
            event.id, event.event_type, event.location_id
        );
        Ok(event)
    }

    /// The event together with a summary of every alert it raised.
    pub async fn get(&self, id: &str) -> ServiceResult<EventDetail> {
        let event = self.find_required(id).await?;
        let alerts = self
            .store
            .alerts_for_event(event.id)
            .await?
            .iter()
            .map(|a| a.summary())
            .collect();
        Ok(EventDetail { event, alerts })
    }

    pub async fn list(&self, filter: &EventFilter) -> ServiceResult<Vec<WasteEvent>> {
        Ok(self.store.list_events(filter).await?)
    }

    pub async fn update(&self, id: &str, body: JsonObject) -> ServiceResult<WasteEvent> {
        let fields = Fields::new(body);
        fields.require_any(UPDATABLE_FIELDS)?;

        let status = fields.enumerated::<EventStatus>("status")?;
        let resolved_at = fields.timestamp("resolved_at")?;
        let confidence_score = match fields.unit_interval("confidence_score")? {
            Patch::Null => {
                return Err(ServiceError::validation(
                    "confidence_score must be a number between 0 and 1",
                ))
            }
            other => other,
        };
        let image_url = fields.nullable_string("image_url")?;
        let video_url = fields.nullable_string("video_url")?;
        let coordinates = fields.coordinates("coordinates")?;
        let metadata = fields.object("metadata")?;

        let mut event = self.find_required(id).await?;
        let now = clock::now();

        if let Patch::Set(status) = status {
            event.status = status;
            if status == EventStatus::Resolved && resolved_at.is_absent() {
                event.resolved_at = Some(now);
            }
        }
        resolved_at.apply_to(&mut event.resolved_at);
        if let Patch::Set(score) = confidence_score {
            event.confidence_score = score;
        }
        image_url.apply_to(&mut event.image_url);
        video_url.apply_to(&mut event.video_url);
        coordinates.apply_to(&mut event.coordinates);
        match metadata {
            Patch::Set(patch) => event.metadata.merge(&patch),
            Patch::Null => event.metadata = JsonObject::new(),
            Patch::Absent => {}
        }
        event.updated_at = now;

        if !self.store.update_event(&event).await? {
            return Err(ServiceError::not_found("event", id));
        }
        info!("Updated event {} (status {})", event.id, event.status);
        Ok(event)
    }

    async fn find_required(&self, id: &str) -> ServiceResult<WasteEvent> {
        let event_id = parse_id("event", id)?;
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("event", id))
    }
}
