//! Collection store behind the lifecycle services.
//!
//! The services only need single-record reads and writes plus a few filtered scans; no
//! operation spans more than one record atomically.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{AppConfig, StoreBackend};
use crate::models::{
    Alert, AlertDetail, AlertStatus, EventStatus, MonitoringLocation, WasteEvent,
};

pub mod memory;
pub mod postgres;
pub mod queries;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type DbPool = Pool<Postgres>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {entity} with id {id}")]
    Duplicate { entity: &'static str, id: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("could not decode stored {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filters for `GET /events`, newest first.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub location_id: Option<String>,
    pub status: Option<EventStatus>,
    pub limit: i64,
    pub offset: i64,
}

/// Filters for `GET /alerts`; `location_id` is matched through the alert's event.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub location_id: Option<String>,
    pub status: Option<AlertStatus>,
    pub limit: i64,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the id is taken.
    async fn insert_location(&self, location: &MonitoringLocation) -> StoreResult<()>;

    async fn get_location(&self, id: &str) -> StoreResult<Option<MonitoringLocation>>;

    /// Newest registration first.
    async fn list_locations(&self, active_only: bool) -> StoreResult<Vec<MonitoringLocation>>;

    /// Writes the mutable columns back; `false` when the row is gone.
    async fn update_location(&self, location: &MonitoringLocation) -> StoreResult<bool>;

    async fn insert_event(&self, event: &WasteEvent) -> StoreResult<()>;

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<WasteEvent>>;

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<WasteEvent>>;

    async fn update_event(&self, event: &WasteEvent) -> StoreResult<bool>;

    async fn insert_alert(&self, alert: &Alert) -> StoreResult<()>;

    async fn get_alert(&self, id: Uuid) -> StoreResult<Option<AlertDetail>>;

    /// Newest `sent_at` first.
    async fn list_alerts(&self, filter: &AlertFilter) -> StoreResult<Vec<AlertDetail>>;

    async fn alerts_for_event(&self, event_id: Uuid) -> StoreResult<Vec<Alert>>;

    async fn update_alert(&self, alert: &Alert) -> StoreResult<bool>;
}

pub async fn init_pool(database_url: &str, max_connections: u32) -> StoreResult<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Opens the backend selected by `STORE_BACKEND`.
pub async fn open_store(config: &AppConfig) -> StoreResult<Arc<dyn Store>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let pool = init_pool(&config.database_url, config.db_max_connections)
                .await?;
            let store = PgStore::new(pool);
            store.init_schema().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
