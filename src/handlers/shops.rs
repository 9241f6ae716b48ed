use axum::extract::{Path, Query, State};

use super::{parse_id, ListParams};
use crate::access::Caller;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::models::{Payload, Shop, ShopInput};
use crate::server::AppState;

/// POST /api/v1/admins/:admin_id/shops - the admin opens a shop and runs it
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(admin_id): Path<String>,
    payload: Payload<ShopInput>,
) -> ApiResult<Shop> {
    let admin_id = parse_id(&admin_id)?;
    let shop = state.shops().create(&caller, admin_id, payload).await?;
    let location = format!("/api/v1/shops/{}", shop.id);
    Ok(ApiResponse::created(shop, location))
}

/// GET /api/v1/shops
pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> ApiResult<Vec<Shop>> {
    let shops = state.shops().find_all(params.limit(&state)).await?;
    Ok(ApiResponse::success(shops))
}

/// GET /api/v1/shops/:shop_id
pub async fn show(State(state): State<AppState>, Path(shop_id): Path<String>) -> ApiResult<Shop> {
    let id = parse_id(&shop_id)?;
    Ok(ApiResponse::success(state.shops().find_by_id(id).await?))
}

/// PUT /api/v1/admins/:admin_id/shops/:shop_id
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path((admin_id, shop_id)): Path<(String, String)>,
    payload: Payload<ShopInput>,
) -> ApiResult<Shop> {
    let admin_id = parse_id(&admin_id)?;
    let shop_id = parse_id(&shop_id)?;
    let shop = state.shops().update(&caller, admin_id, shop_id, payload).await?;
    Ok(ApiResponse::success(shop))
}

/// DELETE /api/v1/admins/:admin_id/shops/:shop_id
pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path((admin_id, shop_id)): Path<(String, String)>,
) -> Result<Deleted, ApiError> {
    let admin_id = parse_id(&admin_id)?;
    let shop_id = parse_id(&shop_id)?;
    state.shops().delete(&caller, admin_id, shop_id).await?;
    Ok(Deleted::new(shop_id))
}
