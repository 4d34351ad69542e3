use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthStaff;
use crate::errors::ServiceError;
use crate::services::orders::{AddItemRequest, OpenTableRequest};
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderIdQuery {
    pub order_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemIdQuery {
    pub item_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct OrderIdBody {
    pub order_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(open_table).delete(delete_order))
        .route("/order/add", post(add_item))
        .route("/order/remove", delete(remove_item))
        .route("/order/send", put(send_order))
        .route("/order/finish", put(finish_order))
        .route("/order/detail", get(order_detail))
        .route("/orders", get(list_orders))
        .route("/orders/open-tables", get(open_tables))
}

/// Open a table: creates a draft order for the given table number.
#[utoipa::path(
    post,
    path = "/order",
    request_body = OpenTableRequest,
    responses(
        (status = 201, description = "Table opened, draft order created"),
        (status = 400, description = "Table number out of range"),
        (status = 409, description = "Table is already open")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn open_table(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Json(payload): Json<OpenTableRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.open_table(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Delete an order together with its items.
#[utoipa::path(
    delete,
    path = "/order",
    params(OrderIdQuery),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<OrderIdQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.delete_order(query.order_id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Attach a product line to an order.
#[utoipa::path(
    post,
    path = "/order/add",
    request_body = AddItemRequest,
    responses(
        (status = 201, description = "Item added"),
        (status = 400, description = "Amount not positive"),
        (status = 404, description = "Order or product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn add_item(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.orders.add_item(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// Remove a single line from an order.
#[utoipa::path(
    delete,
    path = "/order/remove",
    params(ItemIdQuery),
    responses(
        (status = 200, description = "Item removed"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<ItemIdQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.remove_item(query.item_id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Send a draft order to the kitchen.
#[utoipa::path(
    put,
    path = "/order/send",
    responses(
        (status = 200, description = "Order sent"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn send_order(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Json(payload): Json<OrderIdBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.send_order(payload.order_id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Finish (close out) an order, freeing its table.
#[utoipa::path(
    put,
    path = "/order/finish",
    responses(
        (status = 200, description = "Order finished"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already finished")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn finish_order(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Json(payload): Json<OrderIdBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.finish_order(payload.order_id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Order detail with items and product data.
#[utoipa::path(
    get,
    path = "/order/detail",
    params(OrderIdQuery),
    responses(
        (status = 200, description = "Order detail"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn order_detail(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<OrderIdQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.orders.order_detail(query.order_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// Kitchen view: sent, unfinished orders.
#[utoipa::path(
    get,
    path = "/orders",
    responses((status = 200, description = "Open orders")),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _staff: AuthStaff,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.orders.list_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Distinct occupied table numbers, ascending.
#[utoipa::path(
    get,
    path = "/orders/open-tables",
    responses((status = 200, description = "Occupied table numbers")),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn open_tables(
    State(state): State<AppState>,
    _staff: AuthStaff,
) -> Result<impl IntoResponse, ServiceError> {
    let tables = state.services.orders.list_open_tables().await?;
    Ok(Json(ApiResponse::success(tables)))
}
