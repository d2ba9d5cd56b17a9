//! Alert endpoints

use axum::extract::{Path, State};
use serde::Deserialize;

use super::extract::{parse_limit, JsonBody, QueryParams};
use super::response::ApiResponse;
use crate::db::AlertFilter;
use crate::error::ServiceResult;
use crate::models::{AlertDetail, AlertStatus, Enumerated};
use crate::services::RequestContext;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    pub location_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListAlertsQuery>,
) -> ServiceResult<ApiResponse<Vec<AlertDetail>>> {
    let filter = AlertFilter {
        location_id: query.location_id.filter(|id| !id.is_empty()),
        status: match query.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(AlertStatus::parse(raw)?),
        },
        limit: parse_limit(query.limit.as_deref(), DEFAULT_LIMIT, MAX_LIMIT)?,
    };

    let alerts = state.alerts.list(&filter).await?;
    Ok(ApiResponse::ok(alerts))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<AlertDetail>> {
    let alert = state.alerts.get(&id).await?;
    Ok(ApiResponse::ok(alert))
}

/// Patch an alert; `{"status": "acknowledged"}` acknowledges it
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ctx: RequestContext,
    JsonBody(body): JsonBody,
) -> ServiceResult<ApiResponse<AlertDetail>> {
    let alert = state.alerts.update(&ctx, &id, body).await?;
    Ok(ApiResponse::ok(alert).with_message("alert updated"))
}
