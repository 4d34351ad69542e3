use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};

use crate::errors::ServiceError;
use crate::services::users::{LoginRequest, SignupRequest};
use crate::{ApiResponse, AppState};

/// Public endpoints: login for both identity spaces plus customer signup.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(staff_login))
        .route("/app/session", post(app_login))
        .route("/app/users", post(app_signup))
}

pub async fn staff_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = state.services.users.authenticate(payload).await?;
    Ok(Json(ApiResponse::success(session)))
}

pub async fn app_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = state.services.app_users.authenticate(payload).await?;
    Ok(Json(ApiResponse::success(session)))
}

pub async fn app_signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.app_users.signup(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}
