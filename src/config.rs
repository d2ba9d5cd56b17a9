use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

/// Device id recorded when a request carries no `x-device-id` header.
pub const FALLBACK_DEVICE_ID: &str = "unknown";
/// Acknowledger recorded when neither the body nor the header names one.
pub const FALLBACK_ACKNOWLEDGER: &str = "edge_device";
/// Name snapshotted onto events whose location is not registered yet.
pub const UNKNOWN_LOCATION_NAME: &str = "Unknown location";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Identifiers substituted when a request does not supply its own.
#[derive(Debug, Deserialize, Clone)]
pub struct Fallbacks {
    pub device_id: String,
    pub acknowledger: String,
    pub location_name: String,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            device_id: FALLBACK_DEVICE_ID.to_string(),
            acknowledger: FALLBACK_ACKNOWLEDGER.to_string(),
            location_name: UNKNOWN_LOCATION_NAME.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub http_host: String,
    pub http_port: u16,
    pub enable_cors: bool,
    pub store_backend: StoreBackend,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: String,
    pub fallbacks: Fallbacks,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let http_host = env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);
        let enable_cors = env::var("ENABLE_CORS")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            _ => StoreBackend::Postgres,
        };

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
                let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
                let db_name =
                    env::var("DB_DATABASE").unwrap_or_else(|_| "waste_monitor".to_string());
                let db_user = env::var("DB_USER").unwrap_or_else(|_| "waste".to_string());
                let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "waste".to_string());

                format!(
                    "postgres://{}:{}@{}:{}/{}",
                    db_user, db_pwd, db_host, db_port, db_name
                )
            }
        };
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let fallbacks = Fallbacks {
            device_id: env::var("FALLBACK_DEVICE_ID")
                .unwrap_or_else(|_| FALLBACK_DEVICE_ID.to_string()),
            acknowledger: env::var("FALLBACK_ACKNOWLEDGER")
                .unwrap_or_else(|_| FALLBACK_ACKNOWLEDGER.to_string()),
            location_name: env::var("UNKNOWN_LOCATION_NAME")
                .unwrap_or_else(|_| UNKNOWN_LOCATION_NAME.to_string()),
        };

        Ok(Self {
            http_host,
            http_port,
            enable_cors,
            store_backend,
            database_url,
            db_max_connections,
            log_level,
            fallbacks,
        })
    }
}
