use axum::extract::{Path, Query, State};

use super::{parse_id, ListParams};
use crate::access::Caller;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::models::{Order, OrderChanges, OrderInput, OrderView, Payload};
use crate::server::AppState;

/// POST /api/v1/students/:student_id/orders - the student places an order
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path(student_id): Path<String>,
    payload: Payload<OrderInput>,
) -> ApiResult<OrderView> {
    let student_id = parse_id(&student_id)?;
    let view = state.orders().create(&caller, student_id, payload).await?;
    let location = format!("/api/v1/orders/{}", view.order.id);
    Ok(ApiResponse::created(view, location))
}

/// GET /api/v1/orders - any admin
pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Order>> {
    let orders = state.orders().find_all(&caller, params.limit(&state)).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/v1/orders/:order_id - the ordering student or the shop's admin
pub async fn show(
    State(state): State<AppState>,
    caller: Caller,
    Path(order_id): Path<String>,
) -> ApiResult<OrderView> {
    let id = parse_id(&order_id)?;
    Ok(ApiResponse::success(state.orders().find_by_id(&caller, id).await?))
}

/// GET /api/v1/students/:student_id/orders
pub async fn list_by_student(
    State(state): State<AppState>,
    caller: Caller,
    Path(student_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Order>> {
    let student_id = parse_id(&student_id)?;
    let orders = state
        .orders()
        .find_by_student(&caller, student_id, params.limit(&state))
        .await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/v1/shops/:shop_id/orders
pub async fn list_by_shop(
    State(state): State<AppState>,
    caller: Caller,
    Path(shop_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Order>> {
    let shop_id = parse_id(&shop_id)?;
    let orders = state.orders().find_by_shop(&caller, shop_id, params.limit(&state)).await?;
    Ok(ApiResponse::success(orders))
}

/// PUT /api/v1/shops/:shop_id/orders/:order_id - status changes
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path((shop_id, order_id)): Path<(String, String)>,
    payload: Payload<OrderChanges>,
) -> ApiResult<Order> {
    let shop_id = parse_id(&shop_id)?;
    let order_id = parse_id(&order_id)?;
    let order = state.orders().update(&caller, shop_id, order_id, payload).await?;
    Ok(ApiResponse::success(order))
}

/// DELETE /api/v1/shops/:shop_id/orders/:order_id
pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path((shop_id, order_id)): Path<(String, String)>,
) -> Result<Deleted, ApiError> {
    let shop_id = parse_id(&shop_id)?;
    let order_id = parse_id(&order_id)?;
    state.orders().delete(&caller, shop_id, order_id).await?;
    Ok(Deleted::new(order_id))
}
