//! Shared helpers for roster-api integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request},
    Router,
};
use http_body_util::BodyExt;
use roster_api::{build_router, AppState, BroadcastCoordinator};
use roster_common::db::init_memory_database;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::time::Duration;
use tower_http::cors::CorsLayer;

pub const ADMIN_EMAIL: &str = "admin@club.local";

/// Router plus handles the tests need to observe side effects
pub struct TestApp {
    pub app: Router,
    pub db: SqlitePool,
    pub coordinator: BroadcastCoordinator,
}

/// Test helper: app over a fresh in-memory database
pub async fn setup_app() -> TestApp {
    let db = init_memory_database()
        .await
        .expect("Should create in-memory database");
    setup_app_with_db(db)
}

/// Test helper: app over an existing pool
pub fn setup_app_with_db(db: SqlitePool) -> TestApp {
    setup_app_with_capacity(db, 16)
}

/// Test helper: app whose subscribers buffer only `capacity` snapshots
pub fn setup_app_with_capacity(db: SqlitePool, capacity: usize) -> TestApp {
    let coordinator = BroadcastCoordinator::new(db.clone(), capacity);
    let state = AppState::new(db.clone(), coordinator.clone(), ADMIN_EMAIL.to_string());
    TestApp {
        app: build_router(state, CorsLayer::permissive()),
        db,
        coordinator,
    }
}

/// Test helper: request without a body
pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: request with a JSON body
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    raw_request(method, uri, Some("application/json"), &body.to_string())
}

/// Test helper: request with an arbitrary body and content type
pub fn raw_request(method: &str, uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Test helper: Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// The sample student used throughout the tests
pub fn sample_student() -> Value {
    json!({
        "fullName": "A B",
        "dateOfBirth": "2010-05-01",
        "grade": "6",
        "fatherName": "F",
        "motherName": "M",
        "contact": "0711234567",
    })
}

/// Sample student with a different name and grade
pub fn student(name: &str, grade: &str) -> Value {
    let mut body = sample_student();
    body["fullName"] = json!(name);
    body["grade"] = json!(grade);
    body
}

/// One parsed SSE message
#[derive(Debug, Clone, PartialEq)]
pub struct SseMessage {
    pub event: Option<String>,
    pub id: Option<String>,
    pub data: String,
}

impl SseMessage {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.data).expect("SSE data should be JSON")
    }
}

/// Reads an SSE response body message by message
pub struct SseReader {
    body: Body,
    buffer: String,
}

impl SseReader {
    pub fn new(body: Body) -> Self {
        Self {
            body,
            buffer: String::new(),
        }
    }

    /// Next event, skipping keep-alive comments
    ///
    /// `None` once the stream has ended. Panics if nothing arrives in time.
    pub async fn next_event(&mut self) -> Option<SseMessage> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..end + 2).collect();
                if let Some(message) = parse_block(&block) {
                    return Some(message);
                }
                continue;
            }

            let frame = tokio::time::timeout(Duration::from_secs(5), self.body.frame())
                .await
                .expect("Timed out waiting for SSE frame")?
                .expect("SSE body error");
            if let Ok(data) = frame.into_data() {
                self.buffer.push_str(std::str::from_utf8(&data).expect("SSE is UTF-8"));
            }
        }
    }

    /// True if no event arrives within `wait`
    pub async fn is_quiet_for(&mut self, wait: Duration) -> bool {
        if self.buffer.contains("\n\n") {
            return false;
        }
        tokio::time::timeout(wait, self.body.frame()).await.is_err()
    }
}

fn parse_block(block: &str) -> Option<SseMessage> {
    let mut event = None;
    let mut id = None;
    let mut data: Vec<&str> = Vec::new();

    for line in block.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.trim_start().to_string());
        } else if let Some(value) = line.strip_prefix("id:") {
            id = Some(value.trim_start().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }
    Some(SseMessage {
        event,
        id,
        data: data.join("\n"),
    })
}
