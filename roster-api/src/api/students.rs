//! Student roster endpoints
//!
//! Reads go straight to the record store. Writes go through the
//! [`MutationService`](crate::services::MutationService) so every successful
//! write is followed by a roster broadcast.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use roster_common::{GradeCounts, StudentInput, StudentRecord};
use serde::Serialize;
use uuid::Uuid;

use crate::db::students;
use crate::error::ApiResult;
use crate::AppState;

/// Response body for a successful delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub msg: String,
    pub id: Uuid,
}

/// GET /api/students
///
/// Full roster ordered by grade, then name.
pub async fn list_students(State(state): State<AppState>) -> ApiResult<Json<Vec<StudentRecord>>> {
    let roster = students::list_all(&state.db).await?;
    Ok(Json(roster))
}

/// GET /api/students/counts
pub async fn grade_counts(State(state): State<AppState>) -> ApiResult<Json<GradeCounts>> {
    let counts = students::count_by_grade(&state.db).await?;
    Ok(Json(counts))
}

/// POST /api/students
pub async fn create_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> ApiResult<Json<StudentRecord>> {
    let Json(input) = payload?;
    let record = state.mutations.create(&input).await?;
    Ok(Json(record))
}

/// PUT /api/students/:id
///
/// Partial update; fields not present in the body keep their value.
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StudentInput>, JsonRejection>,
) -> ApiResult<Json<StudentRecord>> {
    let Json(input) = payload?;
    let record = state.mutations.update(&id, &input).await?;
    Ok(Json(record))
}

/// DELETE /api/students/:id
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = state.mutations.delete(&id).await?;
    Ok(Json(DeleteResponse {
        msg: "Student removed".to_string(),
        id,
    }))
}
