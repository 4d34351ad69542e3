use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthStaff;
use crate::errors::ServiceError;
use crate::services::categories::CreateCategoryRequest;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub struct CategoryIdQuery {
    pub category_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/category", post(create).delete(remove))
        .route("/categories", get(list))
}

pub async fn create(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.categories.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

pub async fn list(
    State(state): State<AppState>,
    _staff: AuthStaff,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.services.categories.list().await?;
    Ok(Json(ApiResponse::success(categories)))
}

pub async fn remove(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<CategoryIdQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.categories.delete(query.category_id).await?;
    Ok(Json(ApiResponse::success(())))
}
