use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{ServiceError, ServiceResult};

/// A closed set of string values stored in a status column.
pub trait Enumerated: Sized + Copy + 'static {
    /// Entity and field names used in rejection messages.
    const ENTITY: &'static str;
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn rejection(value: &Value) -> ServiceError {
        ServiceError::validation(format!(
            "invalid {} {}: {} (expected one of: {})",
            Self::ENTITY,
            Self::FIELD,
            value,
            Self::allowed()
        ))
    }

    fn parse(raw: &str) -> ServiceResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == raw)
            .ok_or_else(|| Self::rejection(&Value::String(raw.to_string())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraStatus {
    Active,
    Inactive,
    Maintenance,
}

impl Enumerated for CameraStatus {
    const ENTITY: &'static str = "location";
    const FIELD: &'static str = "camera_status";
    const ALL: &'static [Self] = &[
        CameraStatus::Active,
        CameraStatus::Inactive,
        CameraStatus::Maintenance,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            CameraStatus::Active => "active",
            CameraStatus::Inactive => "inactive",
            CameraStatus::Maintenance => "maintenance",
        }
    }
}

/// `resolved` and `false_positive` are terminal by convention only; any move between the
/// four values is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Active,
    Investigating,
    Resolved,
    FalsePositive,
}

impl Enumerated for EventStatus {
    const ENTITY: &'static str = "event";
    const FIELD: &'static str = "status";
    const ALL: &'static [Self] = &[
        EventStatus::Active,
        EventStatus::Investigating,
        EventStatus::Resolved,
        EventStatus::FalsePositive,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Investigating => "investigating",
            EventStatus::Resolved => "resolved",
            EventStatus::FalsePositive => "false_positive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    Sent,
    Failed,
    Acknowledged,
}

impl Enumerated for AlertStatus {
    const ENTITY: &'static str = "alert";
    const FIELD: &'static str = "status";
    const ALL: &'static [Self] = &[
        AlertStatus::Pending,
        AlertStatus::Sent,
        AlertStatus::Failed,
        AlertStatus::Acknowledged,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Sent => "sent",
            AlertStatus::Failed => "failed",
            AlertStatus::Acknowledged => "acknowledged",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(CameraStatus, EventStatus, AlertStatus);
