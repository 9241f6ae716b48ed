use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::access::Caller;
use crate::auth::AuthError;
use crate::error::ApiError;
use crate::server::AppState;

/// Handlers that take a `Caller` require a valid bearer token. The token is
/// checked before any path or body extraction that follows it.
#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)?;
        let claims = state.tokens.validate(token).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            e
        })?;
        Ok(Caller::from(claims))
    }
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedToken("malformed auth token".to_string()))?;

    let mut parts = auth_str.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedToken("malformed auth token".to_string())),
    }
}
