use axum::extract::{Path, Query, State};

use super::{parse_id, ListParams};
use crate::access::Caller;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::models::{Admin, AdminInput, AdminView, Payload};
use crate::server::AppState;

/// POST /api/v1/admins - register an admin, optionally on an existing shop
pub async fn create(State(state): State<AppState>, payload: Payload<AdminInput>) -> ApiResult<AdminView> {
    let view = state.admins().create(payload).await?;
    let location = format!("/api/v1/admins/{}", view.admin.id);
    Ok(ApiResponse::created(view, location))
}

/// GET /api/v1/admins
pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> ApiResult<Vec<Admin>> {
    let admins = state.admins().find_all(params.limit(&state)).await?;
    Ok(ApiResponse::success(admins))
}

/// GET /api/v1/admins/:admin_id - admin with its shop
pub async fn show(State(state): State<AppState>, Path(admin_id): Path<String>) -> ApiResult<AdminView> {
    let id = parse_id(&admin_id)?;
    Ok(ApiResponse::success(state.admins().find_by_id(id).await?))
}

/// PUT /api/v1/admins/:admin_id - admin token for this admin
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(admin_id): Path<String>,
    payload: Payload<AdminInput>,
) -> ApiResult<AdminView> {
    let id = parse_id(&admin_id)?;
    Ok(ApiResponse::success(state.admins().update(&caller, id, payload).await?))
}

/// DELETE /api/v1/admins/:admin_id - may retire the admin's shop too
pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(admin_id): Path<String>,
) -> Result<Deleted, ApiError> {
    let id = parse_id(&admin_id)?;
    state.admins().delete(&caller, id).await?;
    Ok(Deleted::new(id))
}
