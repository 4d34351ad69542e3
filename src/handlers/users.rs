use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::auth::AuthStaff;
use crate::errors::ServiceError;
use crate::services::users::CreateUserRequest;
use crate::{ApiResponse, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create).get(list))
        .route("/me", get(me))
}

/// Staff account creation; admin only.
pub async fn create(
    State(state): State<AppState>,
    staff: AuthStaff,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    staff.require_admin()?;
    let user = state.services.users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn list(
    State(state): State<AppState>,
    staff: AuthStaff,
) -> Result<impl IntoResponse, ServiceError> {
    staff.require_admin()?;
    let users = state.services.users.list().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// The authenticated staff member's own record.
pub async fn me(
    State(state): State<AppState>,
    staff: AuthStaff,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.users.detail(staff.user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}
