//! Admin login
//!
//! A single configured admin email unlocks the roster editor in the client.
//! No session or token is issued; the response only reports success.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/admin/login
///
/// 200 on a matching email, 401 otherwise. Both carry a `LoginResponse`.
pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    let request = parse_login_body(payload)?;

    if email_matches(&request.email, &state.admin_email) {
        info!("Admin login accepted");
        Ok((
            StatusCode::OK,
            Json(LoginResponse {
                success: true,
                message: "Admin Login Successful".to_string(),
            }),
        ))
    } else {
        warn!("Admin login rejected for '{}'", request.email.trim());
        Ok((
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse {
                success: false,
                message: "Invalid Admin Email".to_string(),
            }),
        ))
    }
}

/// Login body; must be a JSON object
fn parse_login_body(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<LoginRequest> {
    let Json(value) = payload?;
    if !value.is_object() {
        return Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn email_matches(given: &str, configured: &str) -> bool {
    let given = given.trim();
    !given.is_empty() && given.eq_ignore_ascii_case(configured.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_body_must_be_object() {
        let err = parse_login_body(Ok(Json(json!(["admin@club.local"])))).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = parse_login_body(Ok(Json(json!("admin@club.local")))).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = parse_login_body(Ok(Json(json!({ "email": 7 })))).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let request = parse_login_body(Ok(Json(json!({ "email": "admin@club.local" })))).unwrap();
        assert_eq!(request.email, "admin@club.local");
    }

    #[test]
    fn test_email_matches_trimmed_case_insensitive() {
        assert!(email_matches("  Admin@Club.Local ", "admin@club.local"));
        assert!(!email_matches("someone@club.local", "admin@club.local"));
        assert!(!email_matches("   ", "admin@club.local"));
    }
}
