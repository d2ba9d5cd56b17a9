//! Waste event endpoints

use axum::extract::{Path, State};
use serde::Deserialize;

use super::extract::{parse_limit, parse_offset, JsonBody, QueryParams};
use super::response::ApiResponse;
use crate::db::EventFilter;
use crate::error::ServiceResult;
use crate::models::{Enumerated, EventDetail, EventStatus, WasteEvent};
use crate::services::RequestContext;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub location_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Device detection report: stores the event and raises its alert
pub async fn report(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(body): JsonBody,
) -> ServiceResult<ApiResponse<WasteEvent>> {
    let detection = state.ingestion.report(&ctx, body).await?;
    let response = ApiResponse::created(detection.event);
    Ok(response.with_message("event reported"))
}

pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListEventsQuery>,
) -> ServiceResult<ApiResponse<Vec<WasteEvent>>> {
    let filter = EventFilter {
        location_id: query.location_id.filter(|id| !id.is_empty()),
        status: match query.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(EventStatus::parse(raw)?),
        },
        limit: parse_limit(query.limit.as_deref(), DEFAULT_LIMIT, MAX_LIMIT)?,
        offset: parse_offset(query.offset.as_deref())?,
    };

    let events = state.events.list(&filter).await?;
    Ok(ApiResponse::ok(events))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<EventDetail>> {
    let detail = state.events.get(&id).await?;
    Ok(ApiResponse::ok(detail))
}

/// Status transition and field patch
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> ServiceResult<ApiResponse<WasteEvent>> {
    let event = state.events.update(&id, body).await?;
    Ok(ApiResponse::ok(event).with_message("event updated"))
}
