//! roster-api library - Club roster service
//!
//! REST CRUD over student records plus a Server-Sent Events channel that
//! pushes the complete ordered roster after every successful mutation.

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use roster_common::{Error, Result};
use sqlx::SqlitePool;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod broadcast;
pub mod db;
pub mod error;
pub mod services;

pub use broadcast::BroadcastCoordinator;
pub use error::{ApiError, ApiResult};
pub use services::MutationService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Roster fan-out to SSE subscribers
    pub coordinator: BroadcastCoordinator,
    /// Create/update/delete with broadcast on success
    pub mutations: MutationService,
    /// Email accepted by the admin login
    pub admin_email: String,
}

impl AppState {
    /// Create new application state around an existing coordinator
    pub fn new(db: SqlitePool, coordinator: BroadcastCoordinator, admin_email: String) -> Self {
        let mutations = MutationService::new(db.clone(), coordinator.clone());
        Self {
            db,
            coordinator,
            mutations,
            admin_email,
        }
    }
}

/// CORS policy for browser clients
///
/// `None` allows any origin.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };

    let origin = HeaderValue::from_str(origin)
        .map_err(|e| Error::Config(format!("Invalid CORS origin '{}': {}", origin, e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60)))
}

/// Build application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        // Roster
        .route(
            "/api/students",
            get(api::list_students).post(api::create_student),
        )
        .route("/api/students/counts", get(api::grade_counts))
        .route(
            "/api/students/:id",
            put(api::update_student).delete(api::delete_student),
        )
        // Admin
        .route("/api/admin/login", post(api::admin_login))
        // SSE event stream
        .route("/api/events", get(api::event_stream))
        // Build information
        .route("/build_info", get(api::get_build_info))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
