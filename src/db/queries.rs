pub const SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS monitoring_locations (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    address TEXT,
    coordinates JSONB,
    camera_status TEXT NOT NULL DEFAULT 'active'
        CHECK (camera_status IN ('active', 'inactive', 'maintenance')),
    settings JSONB NOT NULL DEFAULT '{}'::jsonb,
    last_ping TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS waste_events (
    id UUID PRIMARY KEY,
    location_id TEXT NOT NULL,
    location_name TEXT NOT NULL,
    event_type TEXT NOT NULL,
    coordinates JSONB,
    confidence_score DOUBLE PRECISION NOT NULL
        CHECK (confidence_score >= 0 AND confidence_score <= 1),
    image_url TEXT,
    video_url TEXT,
    status TEXT NOT NULL
        CHECK (status IN ('active', 'investigating', 'resolved', 'false_positive')),
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    detected_at TIMESTAMPTZ NOT NULL,
    resolved_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS waste_events_location_created_idx
    ON waste_events (location_id, created_at DESC);
"#,
    r#"
CREATE TABLE IF NOT EXISTS alerts (
    id UUID PRIMARY KEY,
    event_id UUID NOT NULL REFERENCES waste_events (id),
    alert_type TEXT NOT NULL,
    message TEXT NOT NULL,
    status TEXT NOT NULL
        CHECK (status IN ('pending', 'sent', 'failed', 'acknowledged')),
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    sent_at TIMESTAMPTZ NOT NULL
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS alerts_event_idx ON alerts (event_id);
"#,
];

pub const INSERT_LOCATION: &str = r#"
INSERT INTO monitoring_locations (
    id, name, address, coordinates, camera_status, settings, last_ping, created_at, updated_at
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);
"#;

pub const SELECT_LOCATION: &str = r#"
SELECT * FROM monitoring_locations WHERE id = $1;
"#;

pub const SELECT_LOCATIONS: &str = r#"
SELECT * FROM monitoring_locations
WHERE ($1 = false OR camera_status = 'active')
ORDER BY created_at DESC;
"#;

pub const UPDATE_LOCATION: &str = r#"
UPDATE monitoring_locations
SET name = $2,
    address = $3,
    coordinates = $4,
    camera_status = $5,
    settings = $6,
    last_ping = $7,
    updated_at = $8
WHERE id = $1;
"#;

pub const INSERT_EVENT: &str = r#"
INSERT INTO waste_events (
    id, location_id, location_name, event_type, coordinates, confidence_score,
    image_url, video_url, status, metadata, detected_at, resolved_at, created_at, updated_at
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14);
"#;

pub const SELECT_EVENT: &str = r#"
SELECT * FROM waste_events WHERE id = $1;
"#;

pub const SELECT_EVENTS: &str = r#"
SELECT * FROM waste_events
WHERE ($1::text IS NULL OR location_id = $1)
  AND ($2::text IS NULL OR status = $2)
ORDER BY created_at DESC
LIMIT $3 OFFSET $4;
"#;

pub const UPDATE_EVENT: &str = r#"
UPDATE waste_events
SET coordinates = $2,
    confidence_score = $3,
    image_url = $4,
    video_url = $5,
    status = $6,
    metadata = $7,
    resolved_at = $8,
    updated_at = $9
WHERE id = $1;
"#;

pub const INSERT_ALERT: &str = r#"
INSERT INTO alerts (id, event_id, alert_type, message, status, metadata, sent_at)
VALUES ($1, $2, $3, $4, $5, $6, $7);
"#;

pub const SELECT_ALERT_DETAIL: &str = r#"
SELECT a.*,
       e.location_id AS event_location_id,
       e.location_name AS event_location_name,
       e.event_type AS event_event_type,
       e.coordinates AS event_coordinates
FROM alerts a
LEFT JOIN waste_events e ON e.id = a.event_id
WHERE a.id = $1;
"#;

pub const SELECT_ALERT_DETAILS: &str = r#"
SELECT a.*,
       e.location_id AS event_location_id,
       e.location_name AS event_location_name,
       e.event_type AS event_event_type,
       e.coordinates AS event_coordinates
FROM alerts a
LEFT JOIN waste_events e ON e.id = a.event_id
WHERE ($1::text IS NULL OR e.location_id = $1)
  AND ($2::text IS NULL OR a.status = $2)
ORDER BY a.sent_at DESC
LIMIT $3;
"#;

pub const SELECT_ALERTS_FOR_EVENT: &str = r#"
SELECT * FROM alerts WHERE event_id = $1 ORDER BY sent_at DESC;
"#;

pub const UPDATE_ALERT: &str = r#"
UPDATE alerts
SET alert_type = $2,
    message = $3,
    status = $4,
    metadata = $5,
    sent_at = $6
WHERE id = $1;
"#;
