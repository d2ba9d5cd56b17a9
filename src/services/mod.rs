//! Lifecycle services for locations, events and alerts.
//!
//! Every operation is a read-modify-write against the [`crate::db::Store`]: fetch the
//! record, apply the validated patch in memory, write it back. Nothing here holds state
//! between requests.

pub mod alerts;
pub mod events;
pub mod ingest;
pub mod locations;

pub use alerts::{AlertManager, NewAlert};
pub use events::EventManager;
pub use ingest::IngestionFacade;
pub use locations::{Heartbeat, LocationRegistry};

use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// Provenance written into records created by devices.
pub const HARDWARE_SOURCE: &str = "hardware_device";

/// Per-request attribution taken from the `x-device-id` header.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub device_id: Option<String>,
}

impl RequestContext {
    pub fn device(device_id: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
        }
    }

    pub fn device_id_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.device_id.as_deref().unwrap_or(fallback)
    }
}

/// Generated ids are UUIDs; anything else cannot name a stored record.
pub(crate) fn parse_id(entity: &'static str, raw: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::not_found(entity, raw))
}
