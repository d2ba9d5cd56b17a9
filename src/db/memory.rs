use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AlertFilter, EventFilter, Store, StoreError, StoreResult};
use crate::models::{Alert, AlertDetail, CameraStatus, MonitoringLocation, WasteEvent};

#[derive(Default)]
struct Tables {
    // Kept in insertion order; scans walk them backwards so ties sort newest-first.
    locations: Vec<MonitoringLocation>,
    events: Vec<WasteEvent>,
    alerts: Vec<Alert>,
}

impl Tables {
    fn detail(&self, alert: &Alert) -> AlertDetail {
        AlertDetail {
            alert: alert.clone(),
            waste_event: self
                .events
                .iter()
                .find(|e| e.id == alert.event_id)
                .map(WasteEvent::brief),
        }
    }
}

/// In-process store with the same ordering and filtering as [`super::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_alert_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `insert_alert` fail with a database error.
    pub fn fail_alert_inserts(&self, fail: bool) {
        self.fail_alert_inserts.store(fail, Ordering::SeqCst);
    }

    pub async fn alert_count(&self) -> usize {
        self.tables.read().await.alerts.len()
    }

    pub async fn event_count(&self) -> usize {
        self.tables.read().await.events.len()
    }
}

fn clamp(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_location(&self, location: &MonitoringLocation) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.locations.iter().any(|l| l.id == location.id) {
            return Err(StoreError::Duplicate {
                entity: "location",
                id: location.id.clone(),
            });
        }
        tables.locations.push(location.clone());
        Ok(())
    }

    async fn get_location(&self, id: &str) -> StoreResult<Option<MonitoringLocation>> {
        let tables = self.tables.read().await;
        Ok(tables.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn list_locations(&self, active_only: bool) -> StoreResult<Vec<MonitoringLocation>> {
        let tables = self.tables.read().await;
        let mut locations: Vec<_> = tables
            .locations
            .iter()
            .rev()
            .filter(|l| !active_only || l.camera_status == CameraStatus::Active)
            .cloned()
            .collect();
        locations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(locations)
    }

    async fn update_location(&self, location: &MonitoringLocation) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.locations.iter_mut().find(|l| l.id == location.id) {
            Some(stored) => {
                let created_at = stored.created_at;
                *stored = location.clone();
                stored.created_at = created_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_event(&self, event: &WasteEvent) -> StoreResult<()> {
        self.tables.write().await.events.push(event.clone());
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<WasteEvent>> {
        let tables = self.tables.read().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<WasteEvent>> {
        let tables = self.tables.read().await;
        let mut events: Vec<_> = tables
            .events
            .iter()
            .rev()
            .filter(|e| {
                filter
                    .location_id
                    .as_deref()
                    .map_or(true, |id| e.location_id == id)
            })
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events
            .into_iter()
            .skip(clamp(filter.offset))
            .take(clamp(filter.limit))
            .collect())
    }

    async fn update_event(&self, event: &WasteEvent) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.events.iter_mut().find(|e| e.id == event.id) {
            Some(stored) => {
                // location, type and detection time are fixed at creation
                stored.coordinates = event.coordinates;
                stored.confidence_score = event.confidence_score;
                stored.image_url = event.image_url.clone();
                stored.video_url = event.video_url.clone();
                stored.status = event.status;
                stored.metadata = event.metadata.clone();
                stored.resolved_at = event.resolved_at;
                stored.updated_at = event.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_alert(&self, alert: &Alert) -> StoreResult<()> {
        if self.fail_alert_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Database("alert insert rejected".to_string()));
        }
        self.tables.write().await.alerts.push(alert.clone());
        Ok(())
    }

    async fn get_alert(&self, id: Uuid) -> StoreResult<Option<AlertDetail>> {
        let tables = self.tables.read().await;
        Ok(tables
            .alerts
            .iter()
            .find(|a| a.id == id)
            .map(|a| tables.detail(a)))
    }

    async fn list_alerts(&self, filter: &AlertFilter) -> StoreResult<Vec<AlertDetail>> {
        let tables = self.tables.read().await;
        let mut alerts: Vec<_> = tables
            .alerts
            .iter()
            .rev()
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .map(|a| tables.detail(a))
            .filter(|d| match filter.location_id.as_deref() {
                Some(id) => d.waste_event.as_ref().map_or(false, |e| e.location_id == id),
                None => true,
            })
            .collect();
        alerts.sort_by(|a, b| b.alert.sent_at.cmp(&a.alert.sent_at));
        alerts.truncate(clamp(filter.limit));
        Ok(alerts)
    }

    async fn alerts_for_event(&self, event_id: Uuid) -> StoreResult<Vec<Alert>> {
        let tables = self.tables.read().await;
        let mut alerts: Vec<_> = tables
            .alerts
            .iter()
            .rev()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(alerts)
    }

    async fn update_alert(&self, alert: &Alert) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.alerts.iter_mut().find(|a| a.id == alert.id) {
            Some(stored) => {
                let event_id = stored.event_id;
                *stored = alert.clone();
                stored.event_id = event_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
