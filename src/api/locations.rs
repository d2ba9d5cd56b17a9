//! Monitoring location endpoints

use axum::extract::{Path, State};
use serde::Deserialize;

use super::extract::{JsonBody, QueryParams};
use super::response::ApiResponse;
use crate::error::ServiceResult;
use crate::models::MonitoringLocation;
use crate::services::{Heartbeat, RequestContext};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListLocationsQuery {
    pub active_only: Option<String>,
}

/// Register a location
pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(body): JsonBody,
) -> ServiceResult<ApiResponse<MonitoringLocation>> {
    let location = state.locations.register(&ctx, body).await?;
    let response = ApiResponse::created(location);
    Ok(response.with_message("location registered"))
}

pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListLocationsQuery>,
) -> ServiceResult<ApiResponse<Vec<MonitoringLocation>>> {
    let active_only = query.active_only.as_deref() == Some("true");
    let locations = state.locations.list(active_only).await?;
    Ok(ApiResponse::ok(locations))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<MonitoringLocation>> {
    let location = state.locations.get(&id).await?;
    Ok(ApiResponse::ok(location))
}

/// Partial update; `settings` is merged into the stored value
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> ServiceResult<ApiResponse<MonitoringLocation>> {
    let location = state.locations.update(&id, body).await?;
    Ok(ApiResponse::ok(location).with_message("location updated"))
}

/// Device heartbeat
pub async fn ping(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
    JsonBody(body): JsonBody,
) -> ServiceResult<ApiResponse<Heartbeat>> {
    let heartbeat = state.locations.heartbeat(&ctx, &id, body).await?;
    let response = ApiResponse::ok(heartbeat);
    Ok(response.with_message("heartbeat recorded"))
}
