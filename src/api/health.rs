use axum::extract::State;
use serde::Serialize;

use super::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub store: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: state.version.clone(),
        store: state.backend.as_str().to_string(),
    })
}
