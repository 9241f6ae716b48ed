// handlers/login.rs - token issuing for students and admins

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{Credentials, Payload};
use crate::server::AppState;
use crate::types::Role;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/v1/login
pub async fn student_login(
    State(state): State<AppState>,
    payload: Payload<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.sessions().login(Role::Student, payload).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /api/v1/admins/login
pub async fn admin_login(
    State(state): State<AppState>,
    payload: Payload<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.sessions().login(Role::Admin, payload).await?;
    Ok(Json(TokenResponse { token }))
}
