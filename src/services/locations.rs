use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::{RequestContext, HARDWARE_SOURCE};
use crate::clock;
use crate::config::Fallbacks;
use crate::db::{EventFilter, Store, StoreError};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{CameraStatus, EventStatus, MonitoringLocation, PendingEvent};
use crate::patch::{Fields, JsonObject, Patch, TELEMETRY_KEY};

const UPDATABLE_FIELDS: &[&str] = &["name", "address", "coordinates", "camera_status", "settings"];
const PENDING_EVENTS_LIMIT: i64 = 10;

/// What a device gets back from a heartbeat.
#[derive(Debug, Clone, Serialize)]
pub struct Heartbeat {
    pub location: MonitoringLocation,
    pub pending_events: Vec<PendingEvent>,
    pub server_time: DateTime<Utc>,
}

pub struct LocationRegistry {
    store: Arc<dyn Store>,
    fallbacks: Fallbacks,
}

impl LocationRegistry {
    pub fn new(store: Arc<dyn Store>, fallbacks: Fallbacks) -> Self {
        Self { store, fallbacks }
    }

    pub async fn register(
        &self,
        ctx: &RequestContext,
        body: JsonObject,
    ) -> ServiceResult<MonitoringLocation> {
        let fields = Fields::new(body);

        let id = fields.required_text("id")?;
        let name = fields.required_text("name")?;
        let coordinates = fields
            .coordinates("coordinates")?
            .into_set()
            .ok_or_else(|| ServiceError::validation("missing required field: coordinates"))?;
        let address = fields.nullable_string("address")?.into_set();
        let camera_status = fields
            .enumerated::<CameraStatus>("camera_status")?
            .into_set()
            .unwrap_or(CameraStatus::Active);
        let mut settings = fields.object("settings")?.into_set().unwrap_or_default();

        settings.insert("registered_by", HARDWARE_SOURCE);
        settings.insert("device_id", ctx.device_id_or(&self.fallbacks.device_id));

        let now = clock::now();
        let location = MonitoringLocation {
            id,
            name,
            address,
            coordinates: Some(coordinates),
            camera_status,
            settings,
            last_ping: now,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert_location(&location).await {
            Ok(()) => {}
            Err(StoreError::Duplicate { id, .. }) => {
                return Err(ServiceError::Conflict(format!(
                    "location {} already exists",
                    id
                )))
            }
            Err(e) => return Err(e.into()),
        }

        info!("Registered location {} ({})", location.id, location.name);
        Ok(location)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<MonitoringLocation> {
        self.find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("location", id))
    }

    /// Lookup that treats absence as a normal outcome.
    pub async fn find(&self, id: &str) -> ServiceResult<Option<MonitoringLocation>> {
        Ok(self.store.get_location(id).await?)
    }

    pub async fn list(&self, active_only: bool) -> ServiceResult<Vec<MonitoringLocation>> {
        Ok(self.store.list_locations(active_only).await?)
    }

    pub async fn update(&self, id: &str, body: JsonObject) -> ServiceResult<MonitoringLocation> {
        let fields = Fields::new(body);
        fields.require_any(UPDATABLE_FIELDS)?;

        let name = fields.string("name")?;
        let address = fields.nullable_string("address")?;
        let coordinates = fields.coordinates("coordinates")?;
        let camera_status = fields.enumerated::<CameraStatus>("camera_status")?;
        let settings = match fields.object("settings")? {
            Patch::Null => return Err(ServiceError::validation("settings must be an object")),
            other => other,
        };

        let mut location = self.get(id).await?;

        if let Patch::Set(name) = name {
            location.name = name;
        }
        address.apply_to(&mut location.address);
        coordinates.apply_to(&mut location.coordinates);
        if let Patch::Set(status) = camera_status {
            location.camera_status = status;
        }
        if let Patch::Set(patch) = settings {
            location.settings.merge(&patch);
        }
        location.updated_at = clock::now();

        self.write_back(&location).await?;
        info!("Updated location {}", location.id);
        Ok(location)
    }

    /// Records a device heartbeat. Always advances `last_ping`, even for an empty body.
    pub async fn heartbeat(
        &self,
        ctx: &RequestContext,
        id: &str,
        body: JsonObject,
    ) -> ServiceResult<Heartbeat> {
        let fields = Fields::new(body);
        let camera_status = fields.enumerated::<CameraStatus>("camera_status")?;
        let settings = fields.object("settings")?;
        let telemetry = fields.object("metadata")?;

        let mut location = self.get(id).await?;

        let now = clock::now_after(location.last_ping);
        location.last_ping = now;
        location.updated_at = now;

        if let Patch::Set(status) = camera_status {
            location.camera_status = status;
        }
        if let Patch::Set(patch) = settings {
            location.settings.merge(&patch);
        }
        if let Patch::Set(mut telemetry) = telemetry {
            telemetry.insert("last_heartbeat_at", clock::stamp(now));
            if let Some(device_id) = &ctx.device_id {
                telemetry.insert("device_id", device_id.as_str());
            }
            location.settings.merge_nested(TELEMETRY_KEY, &telemetry);
        }

        self.write_back(&location).await?;
        debug!("Heartbeat from location {}", location.id);

        let pending_events = self
            .store
            .list_events(&EventFilter {
                location_id: Some(location.id.clone()),
                status: Some(EventStatus::Active),
                limit: PENDING_EVENTS_LIMIT,
                offset: 0,
            })
            .await?
            .iter()
            .map(PendingEvent::from)
            .collect();

        Ok(Heartbeat {
            location,
            pending_events,
            server_time: clock::now(),
        })
    }

    async fn write_back(&self, location: &MonitoringLocation) -> ServiceResult<()> {
        if self.store.update_location(location).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found("location", &location.id))
        }
    }
}
