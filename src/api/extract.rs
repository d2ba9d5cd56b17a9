//! Request extractors that report failures through [`ServiceError`].

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::convert::Infallible;

use crate::error::{ServiceError, ServiceResult};
use crate::patch::JsonObject;
use crate::services::RequestContext;

pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// A JSON object body. An empty body reads as `{}`.
pub struct JsonBody(pub JsonObject);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ServiceError::PayloadTooLarge(e.body_text())
                } else {
                    ServiceError::validation(e.body_text())
                }
            })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(JsonObject::new()));
        }

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::validation(format!("request body must be JSON: {}", e)))?;
        JsonObject::from_value("request body", &value).map(JsonBody)
    }
}

/// Query string parameters. A string that does not deserialize into `T` is a validation error.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ServiceError::validation(e.body_text()))?;
        Ok(QueryParams(params))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let device_id = parts
            .headers
            .get(DEVICE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(RequestContext { device_id })
    }
}

/// Parses an optional positive `limit` query value, capped at `max`.
pub fn parse_limit(raw: Option<&str>, default: i64, max: i64) -> ServiceResult<i64> {
    match raw {
        None | Some("") => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if (1..=max).contains(&n) => Ok(n),
            _ => Err(ServiceError::validation(format!(
                "limit must be an integer between 1 and {}",
                max
            ))),
        },
    }
}

pub fn parse_offset(raw: Option<&str>) -> ServiceResult<i64> {
    match raw {
        None | Some("") => Ok(0),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 0 => Ok(n),
            _ => Err(ServiceError::validation(
                "offset must be a non-negative integer",
            )),
        },
    }
}
