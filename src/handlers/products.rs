use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthStaff;
use crate::errors::ServiceError;
use crate::services::products::CreateProductRequest;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub struct ProductIdQuery {
    pub product_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category_id: Option<Uuid>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/product", axum::routing::post(create).delete(remove))
        .route("/products", get(list))
}

pub async fn create(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

pub async fn list(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.products.list(query.category_id).await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn remove(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<ProductIdQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete(query.product_id).await?;
    Ok(Json(ApiResponse::success(())))
}
