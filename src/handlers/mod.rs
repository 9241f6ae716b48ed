// handlers/mod.rs - HTTP handlers grouped by resource
//
// Each handler extracts in a fixed order: bearer token (`Caller`), path ids,
// query, then the raw body (`Payload`). The service decides the rest.

pub mod admins;
pub mod login;
pub mod orders;
pub mod products;
pub mod shops;
pub mod students;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::ValidationError;
use crate::server::AppState;

/// `?limit=` on list endpoints. Anything that is not a positive integer
/// falls back to the configured maximum.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
}

impl ListParams {
    pub fn limit(&self, state: &AppState) -> i64 {
        let requested = self.limit.as_deref().and_then(|s| s.parse::<i64>().ok());
        state.list_limit(requested)
    }
}

/// Path segments arrive as strings so a malformed id is a 422, not a 400
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidIdentifier(raw.to_string()).into())
}

/// GET /api/v1/ - welcome
pub async fn home() -> Json<&'static str> {
    Json("Welcome To This Awesome API")
}

/// GET /api/v1/health - store reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
