//! Operation errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::db::StoreError;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed body, missing field, or a field failing its shape/enum/range check.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    /// Request body over the configured size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The event was persisted but its alert was not.
    #[error("event {event_id} stored without alert: {source}")]
    OrphanedEvent {
        event_id: Uuid,
        #[source]
        source: StoreError,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::Store(_) | ServiceError::OrphanedEvent { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ServiceError::Store(e) => {
                error!("store failure: {}", e);
                "internal server error".to_string()
            }
            ServiceError::OrphanedEvent { event_id, .. } => {
                format!("event {} was recorded but its alert could not be created", event_id)
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_status_codes() {
        let down = || StoreError::Database("down".into());

        assert_eq!(
            ServiceError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::not_found("location", "loc_001").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::Store(down()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::OrphanedEvent {
                event_id: Uuid::new_v4(),
                source: down(),
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::PayloadTooLarge("too big".into()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    async fn body_of(err: ServiceError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn store_failure_hides_cause() {
        let err = ServiceError::Store(StoreError::Database(
            "relation \"waste_events\" does not exist".into(),
        ));

        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "internal server error");
        assert!(!body.to_string().contains("waste_events"));
    }

    #[tokio::test]
    async fn orphaned_event_names_the_event() {
        let event_id = Uuid::new_v4();
        let err = ServiceError::OrphanedEvent {
            event_id,
            source: StoreError::Database("connection reset".into()),
        };

        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains(&event_id.to_string()));
        assert!(!message.contains("connection reset"));
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = ServiceError::not_found("alert", "abc");
        assert_eq!(err.to_string(), "alert abc not found");
    }
}
