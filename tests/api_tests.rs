//! End-to-end tests for the hardware API over the in-memory store.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use waste_ingest::config::{Fallbacks, StoreBackend};
use waste_ingest::db::MemoryStore;
use waste_ingest::patch::parse_timestamp;
use waste_ingest::{create_router, AppState};

fn device(id: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-device-id"),
        HeaderValue::from_static(id),
    )
}

fn create_test_server() -> TestServer {
    create_test_server_with(Arc::new(MemoryStore::new()))
}

fn create_test_server_with(store: Arc<MemoryStore>) -> TestServer {
    let state = AppState::new(store, Fallbacks::default(), StoreBackend::Memory);
    TestServer::new(create_router(state)).unwrap()
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    parse_timestamp(value.as_str().unwrap()).unwrap()
}

async fn register_location(server: &TestServer, id: &str) -> Value {
    let response = server
        .post("/locations")
        .json(&json!({
            "id": id,
            "name": "Riverside bins",
            "address": "1 River Rd",
            "coordinates": {"lat": 31.23, "lng": 120.97},
            "settings": {"fps": 15}
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

async fn report_event(server: &TestServer, location_id: &str) -> Value {
    let response = server
        .post("/events")
        .json(&json!({
            "location_id": location_id,
            "event_type": "illegal_dumping",
            "coordinates": {"lat": 31.23, "lng": 120.97}
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

async fn first_alert_id(server: &TestServer, location_id: &str) -> String {
    let body: Value = server
        .get(&format!("/alerts?location_id={}", location_id))
        .await
        .json();
    body["data"][0]["id"].as_str().unwrap().to_string()
}

// ============ Health ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["store"], "memory");
}

// ============ Locations ============

#[tokio::test]
async fn test_register_and_get_location() {
    let server = create_test_server();
    let (name, value) = device("cam-01");

    let response = server
        .post("/locations")
        .add_header(name, value)
        .json(&json!({
            "id": "loc_001",
            "name": "Riverside bins",
            "coordinates": {"lat": 1.0, "lng": 2.0}
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["camera_status"], "active");
    assert_eq!(body["data"]["settings"]["registered_by"], "hardware_device");
    assert_eq!(body["data"]["settings"]["device_id"], "cam-01");

    let fetched: Value = server.get("/locations/loc_001").await.json();
    assert_eq!(fetched["data"]["name"], "Riverside bins");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = create_test_server();
    register_location(&server, "loc_001").await;

    let response = server
        .post("/locations")
        .json(&json!({
            "id": "loc_001",
            "name": "again",
            "coordinates": {"lat": 0.0, "lng": 0.0}
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("loc_001"));
}

#[tokio::test]
async fn test_register_requires_fields() {
    let server = create_test_server();

    let response = server
        .post("/locations")
        .json(&json!({"id": "loc_001", "name": "no coordinates"}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_list_locations_active_only() {
    let server = create_test_server();
    register_location(&server, "loc_001").await;
    register_location(&server, "loc_002").await;
    server
        .patch("/locations/loc_001")
        .json(&json!({"camera_status": "maintenance"}))
        .await
        .assert_status_ok();

    let all: Value = server.get("/locations").await.json();
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
    assert_eq!(all["data"][0]["id"], "loc_002");

    let active: Value = server.get("/locations?active_only=true").await.json();
    let active = active["data"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["id"], "loc_002");
}

#[tokio::test]
async fn test_settings_patches_accumulate() {
    let server = create_test_server();
    register_location(&server, "loc_001").await;

    server
        .patch("/locations/loc_001")
        .json(&json!({"settings": {"foo": "bar"}}))
        .await
        .assert_status_ok();
    let response = server
        .patch("/locations/loc_001")
        .json(&json!({"settings": {"baz": "qux"}}))
        .await;

    response.assert_status_ok();
    let settings = &response.json::<Value>()["data"]["settings"];
    assert_eq!(settings["foo"], "bar");
    assert_eq!(settings["baz"], "qux");
    assert_eq!(settings["fps"], 15);
}

#[tokio::test]
async fn test_location_update_rejects_bad_status() {
    let server = create_test_server();
    register_location(&server, "loc_001").await;

    let response = server
        .patch("/locations/loc_001")
        .json(&json!({"camera_status": "on_fire"}))
        .await;

    response.assert_status_bad_request();
    let fetched: Value = server.get("/locations/loc_001").await.json();
    assert_eq!(fetched["data"]["camera_status"], "active");
}

#[tokio::test]
async fn test_ping_unknown_location_is_not_found() {
    let server = create_test_server();

    let response = server.post("/api/hardware/locations/ghost/ping").await;

    response.assert_status_not_found();
    let body: Value = server.get("/locations").await.json();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ping_with_empty_body_advances_last_ping() {
    let server = create_test_server();
    let location = register_location(&server, "loc_001").await;
    report_event(&server, "loc_001").await;

    let response = server.post("/locations/loc_001/ping").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let before = timestamp(&location["last_ping"]);
    let after = timestamp(&body["data"]["location"]["last_ping"]);
    assert!(after > before);
    assert_eq!(body["data"]["pending_events"].as_array().unwrap().len(), 1);
    assert!(body["data"]["server_time"].is_string());
}

#[tokio::test]
async fn test_ping_telemetry_lands_under_settings() {
    let server = create_test_server();
    register_location(&server, "loc_001").await;
    let (name, value) = device("cam-07");

    let response = server
        .post("/locations/loc_001/ping")
        .add_header(name, value)
        .json(&json!({"metadata": {"temperature": 41.5}}))
        .await;

    response.assert_status_ok();
    let settings = &response.json::<Value>()["data"]["location"]["settings"];
    assert_eq!(settings["fps"], 15);
    assert_eq!(settings["telemetry"]["temperature"], 41.5);
    assert_eq!(settings["telemetry"]["device_id"], "cam-07");
    assert!(settings["telemetry"]["last_heartbeat_at"].is_string());
}

// ============ Events ============

#[tokio::test]
async fn test_report_event_raises_alert() {
    let server = create_test_server();

    let event = report_event(&server, "loc_001").await;
    assert_eq!(event["status"], "active");
    assert_eq!(event["confidence_score"], 0.8);
    assert_eq!(event["metadata"]["source"], "hardware_device");

    let response = server.get("/alerts?location_id=loc_001").await;
    response.assert_status_ok();
    let alerts = response.json::<Value>()["data"].clone();
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["alert_type"], "waste_detected");
    assert_eq!(alerts[0]["status"], "sent");
    assert_eq!(alerts[0]["event_id"], event["id"]);
    assert_eq!(alerts[0]["waste_event"]["location_id"], "loc_001");

    let other: Value = server.get("/alerts?location_id=loc_999").await.json();
    assert!(other["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_report_event_uses_registered_name() {
    let server = create_test_server();
    register_location(&server, "loc_001").await;

    let event = report_event(&server, "loc_001").await;

    assert_eq!(event["location_name"], "Riverside bins");
}

#[tokio::test]
async fn test_report_event_rejects_bad_confidence() {
    let server = create_test_server();

    let response = server
        .post("/events")
        .json(&json!({
            "location_id": "loc_001",
            "event_type": "illegal_dumping",
            "coordinates": {"lat": 31.23, "lng": 120.97},
            "confidence_score": 1.2
        }))
        .await;

    response.assert_status_bad_request();
    let events: Value = server.get("/events").await.json();
    assert!(events["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_event_includes_alerts() {
    let server = create_test_server();
    let event = report_event(&server, "loc_001").await;
    let id = event["id"].as_str().unwrap();

    let response = server.get(&format!("/events/{}", id)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["id"], id);
    let alerts = body["data"]["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["alert_type"], "waste_detected");
    assert_eq!(alerts[0]["status"], "sent");
}

#[tokio::test]
async fn test_get_event_not_found() {
    let server = create_test_server();

    server
        .get("/events/nonexistent")
        .await
        .assert_status_not_found();
    server
        .get("/events/5f0c6b8e-9a57-4c55-9c1e-2f0f4f7f1a11")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_resolve_event_derives_resolved_at() {
    let server = create_test_server();
    let event = report_event(&server, "loc_001").await;
    let id = event["id"].as_str().unwrap();
    assert!(event["resolved_at"].is_null());

    let response = server
        .put(&format!("/events/{}", id))
        .json(&json!({"status": "resolved"}))
        .await;

    response.assert_status_ok();
    let updated = &response.json::<Value>()["data"];
    assert_eq!(updated["status"], "resolved");
    let resolved_at = timestamp(&updated["resolved_at"]);
    let detected_at = timestamp(&updated["detected_at"]);
    assert!(resolved_at >= detected_at);
}

#[tokio::test]
async fn test_empty_event_patch_is_rejected() {
    let server = create_test_server();
    let event = report_event(&server, "loc_001").await;
    let id = event["id"].as_str().unwrap();

    let response = server
        .patch(&format!("/events/{}", id))
        .json(&json!({}))
        .await;

    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["success"], false);
    let fetched: Value = server.get(&format!("/events/{}", id)).await.json();
    assert_eq!(fetched["data"]["updated_at"], event["updated_at"]);
}

#[tokio::test]
async fn test_list_events_filters_and_paginates() {
    let server = create_test_server();
    let first = report_event(&server, "loc_001").await;
    report_event(&server, "loc_002").await;
    let third = report_event(&server, "loc_001").await;

    let page: Value = server
        .get("/events?location_id=loc_001&limit=1")
        .await
        .json();
    assert_eq!(page["data"][0]["id"], third["id"]);

    let next: Value = server
        .get("/events?location_id=loc_001&limit=1&offset=1")
        .await
        .json();
    assert_eq!(next["data"][0]["id"], first["id"]);

    server
        .put(&format!("/events/{}", first["id"].as_str().unwrap()))
        .json(&json!({"status": "false_positive"}))
        .await
        .assert_status_ok();
    let flagged: Value = server.get("/events?status=false_positive").await.json();
    assert_eq!(flagged["data"].as_array().unwrap().len(), 1);

    server
        .get("/events?status=closed")
        .await
        .assert_status_bad_request();
    server
        .get("/events?limit=0")
        .await
        .assert_status_bad_request();
}

// ============ Alerts ============

#[tokio::test]
async fn test_acknowledge_alert_uses_device_header() {
    let server = create_test_server();
    report_event(&server, "loc_001").await;
    let alert_id = first_alert_id(&server, "loc_001").await;
    let (name, value) = device("cam-07");

    let response = server
        .patch(&format!("/alerts/{}", alert_id))
        .add_header(name, value)
        .json(&json!({"status": "acknowledged"}))
        .await;

    response.assert_status_ok();
    let alert = &response.json::<Value>()["data"];
    assert_eq!(alert["status"], "acknowledged");
    assert_eq!(alert["metadata"]["acknowledged_by"], "cam-07");
    assert!(alert["metadata"]["acknowledged_at"].is_string());
    assert_eq!(alert["metadata"]["location_id"], "loc_001");
    assert_eq!(alert["waste_event"]["event_type"], "illegal_dumping");

    let listed: Value = server.get("/alerts?status=acknowledged").await.json();
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_alert_patch_validation() {
    let server = create_test_server();
    report_event(&server, "loc_001").await;
    let alert_id = first_alert_id(&server, "loc_001").await;

    server
        .patch(&format!("/alerts/{}", alert_id))
        .json(&json!({}))
        .await
        .assert_status_bad_request();
    server
        .patch(&format!("/alerts/{}", alert_id))
        .json(&json!({"status": "dismissed"}))
        .await
        .assert_status_bad_request();
    server
        .patch(&format!("/alerts/{}", alert_id))
        .json(&json!({"sent_at": "not-a-time"}))
        .await
        .assert_status_bad_request();
    server
        .patch("/alerts/nonexistent")
        .json(&json!({"status": "failed"}))
        .await
        .assert_status_not_found();
}

// ============ Request bodies ============

#[tokio::test]
async fn test_malformed_json_is_a_validation_error() {
    let server = create_test_server();
    register_location(&server, "loc_001").await;

    let response = server.patch("/locations/loc_001").text("{not json").await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    server
        .patch("/locations/loc_001")
        .json(&json!([1, 2, 3]))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_oversized_body_is_payload_too_large() {
    let server = create_test_server();
    register_location(&server, "loc_001").await;

    let response = server
        .patch("/locations/loc_001")
        .text("x".repeat(3 * 1024 * 1024))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["success"], false);
}

// ============ Query strings ============

#[tokio::test]
async fn test_bad_query_strings_use_error_envelope() {
    let server = create_test_server();

    for path in [
        "/events?status=active&status=resolved",
        "/alerts?limit=1&limit=2",
        "/locations?active_only=true&active_only=false",
    ] {
        let response = server.get(path).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false, "{}", path);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("duplicate"), "{}", path);
    }
}

// ============ Store failures ============

#[tokio::test]
async fn test_failed_alert_keeps_event_and_reports_server_error() {
    let store = Arc::new(MemoryStore::new());
    store.fail_alert_inserts(true);
    let server = create_test_server_with(store.clone());

    let response = server
        .post("/events")
        .json(&json!({
            "location_id": "loc_001",
            "event_type": "illegal_dumping",
            "coordinates": {"lat": 31.23, "lng": 120.97}
        }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());

    let events: Value = server.get("/events?location_id=loc_001").await.json();
    let events = events["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    let id = events[0]["id"].as_str().unwrap();
    assert!(body["error"].as_str().unwrap().contains(id));

    let detail: Value = server.get(&format!("/events/{}", id)).await.json();
    assert!(detail["data"]["alerts"].as_array().unwrap().is_empty());
    let alerts: Value = server.get("/alerts").await.json();
    assert!(alerts["data"].as_array().unwrap().is_empty());
    assert_eq!(store.alert_count().await, 0);
}
