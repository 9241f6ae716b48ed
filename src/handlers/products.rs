use axum::extract::{Path, Query, State};

use super::{parse_id, ListParams};
use crate::access::Caller;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::models::{Payload, Product, ProductInput, ProductView};
use crate::server::AppState;

/// POST /api/v1/shops/:shop_id/products - shop admin only
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(shop_id): Path<String>,
    payload: Payload<ProductInput>,
) -> ApiResult<ProductView> {
    let shop_id = parse_id(&shop_id)?;
    let view = state.products().create(&caller, shop_id, payload).await?;
    let location = format!("/api/v1/products/{}", view.product.id);
    Ok(ApiResponse::created(view, location))
}

/// GET /api/v1/products
pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> ApiResult<Vec<Product>> {
    let products = state.products().find_all(params.limit(&state)).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/v1/products/:product_id - product with the shop selling it
pub async fn show(State(state): State<AppState>, Path(product_id): Path<String>) -> ApiResult<ProductView> {
    let id = parse_id(&product_id)?;
    Ok(ApiResponse::success(state.products().find_by_id(id).await?))
}

/// GET /api/v1/shops/:shop_id/products
pub async fn list_by_shop(
    State(state): State<AppState>,
    Path(shop_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Product>> {
    let shop_id = parse_id(&shop_id)?;
    let products = state.products().find_by_shop(shop_id, params.limit(&state)).await?;
    Ok(ApiResponse::success(products))
}

/// PUT /api/v1/shops/:shop_id/products/:product_id
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path((shop_id, product_id)): Path<(String, String)>,
    payload: Payload<ProductInput>,
) -> ApiResult<Product> {
    let shop_id = parse_id(&shop_id)?;
    let product_id = parse_id(&product_id)?;
    let product = state.products().update(&caller, shop_id, product_id, payload).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/v1/shops/:shop_id/products/:product_id
pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path((shop_id, product_id)): Path<(String, String)>,
) -> Result<Deleted, ApiError> {
    let shop_id = parse_id(&shop_id)?;
    let product_id = parse_id(&product_id)?;
    state.products().delete(&caller, shop_id, product_id).await?;
    Ok(Deleted::new(product_id))
}
