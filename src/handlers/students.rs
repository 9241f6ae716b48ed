use axum::extract::{Path, Query, State};

use super::{parse_id, ListParams};
use crate::access::Caller;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::models::{Payload, Student, StudentInput};
use crate::server::AppState;

/// POST /api/v1/students - register a student
pub async fn create(State(state): State<AppState>, payload: Payload<StudentInput>) -> ApiResult<Student> {
    let student = state.students().create(payload).await?;
    let location = format!("/api/v1/students/{}", student.id);
    Ok(ApiResponse::created(student, location))
}

/// GET /api/v1/students
pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> ApiResult<Vec<Student>> {
    let students = state.students().find_all(params.limit(&state)).await?;
    Ok(ApiResponse::success(students))
}

/// GET /api/v1/students/:student_id
pub async fn show(State(state): State<AppState>, Path(student_id): Path<String>) -> ApiResult<Student> {
    let id = parse_id(&student_id)?;
    Ok(ApiResponse::success(state.students().find_by_id(id).await?))
}

/// PUT /api/v1/students/:student_id - only the student themselves
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(student_id): Path<String>,
    payload: Payload<StudentInput>,
) -> ApiResult<Student> {
    let id = parse_id(&student_id)?;
    Ok(ApiResponse::success(state.students().update(&caller, id, payload).await?))
}

/// DELETE /api/v1/students/:student_id - only the student themselves
pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(student_id): Path<String>,
) -> Result<Deleted, ApiError> {
    let id = parse_id(&student_id)?;
    state.students().delete(&caller, id).await?;
    Ok(Deleted::new(id))
}
