use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use super::{queries, AlertFilter, DbPool, EventFilter, Store, StoreError, StoreResult};
use crate::models::{
    Alert, AlertDetail, AlertStatus, CameraStatus, Coordinates, Enumerated, EventBrief,
    EventStatus, MonitoringLocation, WasteEvent,
};
use crate::patch::JsonObject;

const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed store.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the tables and indexes if they are missing.
    pub async fn init_schema(&self) -> StoreResult<()> {
        for statement in queries::SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

fn parse_column<E: Enumerated>(raw: &str) -> StoreResult<E> {
    E::parse(raw).map_err(|_| StoreError::Serialization(format!("{} {:?}", E::FIELD, raw)))
}

fn location_from_row(row: &PgRow) -> StoreResult<MonitoringLocation> {
    let camera_status: String = row.try_get("camera_status")?;
    let coordinates: Option<Json<Coordinates>> = row.try_get("coordinates")?;
    let settings: Json<JsonObject> = row.try_get("settings")?;

    Ok(MonitoringLocation {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        coordinates: coordinates.map(|c| c.0),
        camera_status: parse_column::<CameraStatus>(&camera_status)?,
        settings: settings.0,
        last_ping: row.try_get("last_ping")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn event_from_row(row: &PgRow) -> StoreResult<WasteEvent> {
    let status: String = row.try_get("status")?;
    let coordinates: Option<Json<Coordinates>> = row.try_get("coordinates")?;
    let metadata: Json<JsonObject> = row.try_get("metadata")?;

    Ok(WasteEvent {
        id: row.try_get("id")?,
        location_id: row.try_get("location_id")?,
        location_name: row.try_get("location_name")?,
        event_type: row.try_get("event_type")?,
        coordinates: coordinates.map(|c| c.0),
        confidence_score: row.try_get("confidence_score")?,
        image_url: row.try_get("image_url")?,
        video_url: row.try_get("video_url")?,
        status: parse_column::<EventStatus>(&status)?,
        metadata: metadata.0,
        detected_at: row.try_get("detected_at")?,
        resolved_at: row.try_get("resolved_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn alert_from_row(row: &PgRow) -> StoreResult<Alert> {
    let status: String = row.try_get("status")?;
    let metadata: Json<JsonObject> = row.try_get("metadata")?;

    Ok(Alert {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        alert_type: row.try_get("alert_type")?,
        message: row.try_get("message")?,
        status: parse_column::<AlertStatus>(&status)?,
        metadata: metadata.0,
        sent_at: row.try_get("sent_at")?,
    })
}

fn alert_detail_from_row(row: &PgRow) -> StoreResult<AlertDetail> {
    let alert = alert_from_row(row)?;
    let location_id: Option<String> = row.try_get("event_location_id")?;

    let waste_event = match location_id {
        Some(location_id) => {
            let coordinates: Option<Json<Coordinates>> = row.try_get("event_coordinates")?;
            Some(EventBrief {
                location_id,
                location_name: row.try_get("event_location_name")?,
                event_type: row.try_get("event_event_type")?,
                coordinates: coordinates.map(|c| c.0),
            })
        }
        None => None,
    };

    Ok(AlertDetail { alert, waste_event })
}

#[async_trait]
impl Store for PgStore {
    async fn insert_location(&self, location: &MonitoringLocation) -> StoreResult<()> {
        let result = sqlx::query(queries::INSERT_LOCATION)
            .bind(&location.id)
            .bind(&location.name)
            .bind(&location.address)
            .bind(location.coordinates.as_ref().map(Json))
            .bind(location.camera_status.as_str())
            .bind(Json(&location.settings))
            .bind(location.last_ping)
            .bind(location.created_at)
            .bind(location.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate {
                entity: "location",
                id: location.id.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_location(&self, id: &str) -> StoreResult<Option<MonitoringLocation>> {
        let row = sqlx::query(queries::SELECT_LOCATION)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(location_from_row).transpose()
    }

    async fn list_locations(&self, active_only: bool) -> StoreResult<Vec<MonitoringLocation>> {
        let rows = sqlx::query(queries::SELECT_LOCATIONS)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(location_from_row).collect()
    }

    async fn update_location(&self, location: &MonitoringLocation) -> StoreResult<bool> {
        let result = sqlx::query(queries::UPDATE_LOCATION)
            .bind(&location.id)
            .bind(&location.name)
            .bind(&location.address)
            .bind(location.coordinates.as_ref().map(Json))
            .bind(location.camera_status.as_str())
            .bind(Json(&location.settings))
            .bind(location.last_ping)
            .bind(location.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_event(&self, event: &WasteEvent) -> StoreResult<()> {
        sqlx::query(queries::INSERT_EVENT)
            .bind(event.id)
            .bind(&event.location_id)
            .bind(&event.location_name)
            .bind(&event.event_type)
            .bind(event.coordinates.as_ref().map(Json))
            .bind(event.confidence_score)
            .bind(&event.image_url)
            .bind(&event.video_url)
            .bind(event.status.as_str())
            .bind(Json(&event.metadata))
            .bind(event.detected_at)
            .bind(event.resolved_at)
            .bind(event.created_at)
            .bind(event.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<WasteEvent>> {
        let row = sqlx::query(queries::SELECT_EVENT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(event_from_row).transpose()
    }

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<WasteEvent>> {
        let rows = sqlx::query(queries::SELECT_EVENTS)
            .bind(filter.location_id.as_deref())
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn update_event(&self, event: &WasteEvent) -> StoreResult<bool> {
        let result = sqlx::query(queries::UPDATE_EVENT)
            .bind(event.id)
            .bind(event.coordinates.as_ref().map(Json))
            .bind(event.confidence_score)
            .bind(&event.image_url)
            .bind(&event.video_url)
            .bind(event.status.as_str())
            .bind(Json(&event.metadata))
            .bind(event.resolved_at)
            .bind(event.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_alert(&self, alert: &Alert) -> StoreResult<()> {
        sqlx::query(queries::INSERT_ALERT)
            .bind(alert.id)
            .bind(alert.event_id)
            .bind(&alert.alert_type)
            .bind(&alert.message)
            .bind(alert.status.as_str())
            .bind(Json(&alert.metadata))
            .bind(alert.sent_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_alert(&self, id: Uuid) -> StoreResult<Option<AlertDetail>> {
        let row = sqlx::query(queries::SELECT_ALERT_DETAIL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(alert_detail_from_row).transpose()
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> StoreResult<Vec<AlertDetail>> {
        let rows = sqlx::query(queries::SELECT_ALERT_DETAILS)
            .bind(filter.location_id.as_deref())
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(alert_detail_from_row).collect()
    }

    async fn alerts_for_event(&self, event_id: Uuid) -> StoreResult<Vec<Alert>> {
        let rows = sqlx::query(queries::SELECT_ALERTS_FOR_EVENT)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(alert_from_row).collect()
    }

    async fn update_alert(&self, alert: &Alert) -> StoreResult<bool> {
        let result = sqlx::query(queries::UPDATE_ALERT)
            .bind(alert.id)
            .bind(&alert.alert_type)
            .bind(&alert.message)
            .bind(alert.status.as_str())
            .bind(Json(&alert.metadata))
            .bind(alert.sent_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
