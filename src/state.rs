//! Application state shared by the HTTP handlers.

use std::sync::Arc;

use crate::config::{Fallbacks, StoreBackend};
use crate::db::Store;
use crate::services::{AlertManager, EventManager, IngestionFacade, LocationRegistry};

#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<LocationRegistry>,
    pub events: Arc<EventManager>,
    pub alerts: Arc<AlertManager>,
    pub ingestion: Arc<IngestionFacade>,
    pub backend: StoreBackend,
    pub version: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, fallbacks: Fallbacks, backend: StoreBackend) -> Self {
        let locations = Arc::new(LocationRegistry::new(store.clone(), fallbacks.clone()));
        let events = Arc::new(EventManager::new(
            store.clone(),
            locations.clone(),
            fallbacks.clone(),
        ));
        let alerts = Arc::new(AlertManager::new(store, fallbacks));
        let ingestion = Arc::new(IngestionFacade::new(events.clone(), alerts.clone()));

        Self {
            locations,
            events,
            alerts,
            ingestion,
            backend,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
