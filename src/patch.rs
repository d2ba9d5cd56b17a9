//! Merge-patch engine.
//!
//! Request bodies arrive as loosely typed JSON objects. [`Fields`] reads them one field at a
//! time, keeping "absent" apart from an explicit `null`, and [`JsonObject`] holds the
//! open-ended `metadata`/`settings` columns together with the shallow merge applied when a
//! caller patches them.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};
use crate::models::{Coordinates, Enumerated};

/// Key under `settings` that heartbeats write device telemetry into.
pub const TELEMETRY_KEY: &str = "telemetry";

/// A JSON object column (`metadata`, `settings`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonObject(Map<String, Value>);

impl JsonObject {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Interprets `value` as an object, naming `field` in the error otherwise.
    pub fn from_value(field: &str, value: &Value) -> ServiceResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map.clone())),
            _ => Err(ServiceError::validation(format!(
                "{} must be an object",
                field
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Shallow merge: every top-level key of `patch` overwrites, keys only in `self` survive.
    pub fn merge(&mut self, patch: &JsonObject) {
        for (key, value) in &patch.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Shallow merge of `patch` into the object stored under `key`.
    ///
    /// A missing or non-object value under `key` is replaced by `patch`.
    pub fn merge_nested(&mut self, key: &str, patch: &JsonObject) {
        let mut nested = match self.0.get(key) {
            Some(Value::Object(map)) => JsonObject(map.clone()),
            _ => JsonObject::new(),
        };
        nested.merge(patch);
        self.0.insert(key.to_string(), Value::Object(nested.0));
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// One field of a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Key not present in the body: leave the stored value alone.
    Absent,
    /// Explicit `null`.
    Null,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn into_set(self) -> Option<T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Writes into a nullable slot: `Null` clears it, `Absent` leaves it.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = None,
            Patch::Set(value) => *target = Some(value),
        }
    }
}

/// Typed access to the top-level fields of a JSON request body.
#[derive(Debug, Clone)]
pub struct Fields {
    body: JsonObject,
}

impl Fields {
    pub fn new(body: JsonObject) -> Self {
        Self { body }
    }

    /// Rejects a body carrying none of the `recognized` keys.
    pub fn require_any(&self, recognized: &[&str]) -> ServiceResult<()> {
        if recognized.iter().any(|key| self.body.contains_key(key)) {
            Ok(())
        } else {
            Err(ServiceError::validation(format!(
                "no updatable fields supplied (expected any of: {})",
                recognized.join(", ")
            )))
        }
    }

    fn raw(&self, name: &str) -> Patch<&Value> {
        match self.body.get(name) {
            None => Patch::Absent,
            Some(Value::Null) => Patch::Null,
            Some(value) => Patch::Set(value),
        }
    }

    /// A non-empty string that must be present.
    pub fn required_text(&self, name: &str) -> ServiceResult<String> {
        match self.raw(name) {
            Patch::Set(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            Patch::Set(Value::String(_)) | Patch::Absent | Patch::Null => Err(
                ServiceError::validation(format!("missing required field: {}", name)),
            ),
            Patch::Set(_) => Err(ServiceError::validation(format!(
                "{} must be a string",
                name
            ))),
        }
    }

    /// A string; `null` is rejected.
    pub fn string(&self, name: &str) -> ServiceResult<Patch<String>> {
        match self.raw(name) {
            Patch::Absent => Ok(Patch::Absent),
            Patch::Set(Value::String(s)) => Ok(Patch::Set(s.clone())),
            _ => Err(ServiceError::validation(format!(
                "{} must be a string",
                name
            ))),
        }
    }

    /// A string or `null`.
    pub fn nullable_string(&self, name: &str) -> ServiceResult<Patch<String>> {
        match self.raw(name) {
            Patch::Absent => Ok(Patch::Absent),
            Patch::Null => Ok(Patch::Null),
            Patch::Set(Value::String(s)) => Ok(Patch::Set(s.clone())),
            Patch::Set(_) => Err(ServiceError::validation(format!(
                "{} must be a string or null",
                name
            ))),
        }
    }

    /// An object or `null`.
    pub fn object(&self, name: &str) -> ServiceResult<Patch<JsonObject>> {
        match self.raw(name) {
            Patch::Absent => Ok(Patch::Absent),
            Patch::Null => Ok(Patch::Null),
            Patch::Set(value) => JsonObject::from_value(name, value).map(Patch::Set),
        }
    }

    /// A `{lat, lng}` pair or `null`.
    pub fn coordinates(&self, name: &str) -> ServiceResult<Patch<Coordinates>> {
        match self.raw(name) {
            Patch::Absent => Ok(Patch::Absent),
            Patch::Null => Ok(Patch::Null),
            Patch::Set(value) => Coordinates::from_value(value)
                .map(Patch::Set)
                .ok_or_else(|| {
                    ServiceError::validation(format!(
                        "{} must be an object with numeric lat and lng",
                        name
                    ))
                }),
        }
    }

    /// A number in `[0, 1]` or `null`.
    pub fn unit_interval(&self, name: &str) -> ServiceResult<Patch<f64>> {
        match self.raw(name) {
            Patch::Absent => Ok(Patch::Absent),
            Patch::Null => Ok(Patch::Null),
            Patch::Set(value) => match value.as_f64() {
                Some(n) if (0.0..=1.0).contains(&n) => Ok(Patch::Set(n)),
                _ => Err(ServiceError::validation(format!(
                    "{} must be a number between 0 and 1",
                    name
                ))),
            },
        }
    }

    /// A timestamp string or `null`.
    pub fn timestamp(&self, name: &str) -> ServiceResult<Patch<DateTime<Utc>>> {
        match self.raw(name) {
            Patch::Absent => Ok(Patch::Absent),
            Patch::Null => Ok(Patch::Null),
            Patch::Set(Value::String(s)) => parse_timestamp(s).map(Patch::Set).ok_or_else(|| {
                ServiceError::validation(format!("{} is not a valid timestamp", name))
            }),
            Patch::Set(_) => Err(ServiceError::validation(format!(
                "{} is not a valid timestamp",
                name
            ))),
        }
    }

    /// One of the values of `E`; `null` is rejected.
    pub fn enumerated<E: Enumerated>(&self, name: &str) -> ServiceResult<Patch<E>> {
        match self.raw(name) {
            Patch::Absent => Ok(Patch::Absent),
            Patch::Set(Value::String(s)) => E::parse(s).map(Patch::Set),
            _ => Err(E::rejection(
                &self.body.get(name).cloned().unwrap_or(Value::Null),
            )),
        }
    }
}

/// Accepts RFC 3339 plus the bare `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` forms
/// (read as UTC) that device firmware tends to send.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
