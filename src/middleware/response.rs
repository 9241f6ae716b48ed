use axum::{
    http::{header::LOCATION, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// Header naming the entity a delete removed
pub static ENTITY: HeaderName = HeaderName::from_static("entity");

/// Successful response: the entity or list itself as JSON, no envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
    pub location: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: StatusCode::OK,
            location: None,
        }
    }

    /// 201 Created with a `Location` pointing at the new resource
    pub fn created(data: T, location: impl Into<String>) -> Self {
        Self {
            data,
            status_code: StatusCode::CREATED,
            location: Some(location.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut response = (self.status_code, Json(self.data)).into_response();
        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(LOCATION, value);
                }
                Err(e) => tracing::error!("Invalid Location header {}: {}", location, e),
            }
        }
        response
    }
}

/// 204 No Content carrying the deleted entity's id in an `Entity` header
#[derive(Debug)]
pub struct Deleted {
    pub entity: String,
}

impl Deleted {
    pub fn new(entity: impl ToString) -> Self {
        Self {
            entity: entity.to_string(),
        }
    }
}

impl IntoResponse for Deleted {
    fn into_response(self) -> Response {
        let mut response = StatusCode::NO_CONTENT.into_response();
        if let Ok(value) = HeaderValue::from_str(&self.entity) {
            response.headers_mut().insert(ENTITY.clone(), value);
        }
        response
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
