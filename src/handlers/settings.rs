use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

use crate::auth::AuthStaff;
use crate::errors::ServiceError;
use crate::services::settings::UpdateSettingsRequest;
use crate::{ApiResponse, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/settings", get(show).put(update))
}

pub async fn show(
    State(state): State<AppState>,
    staff: AuthStaff,
) -> Result<impl IntoResponse, ServiceError> {
    staff.require_admin()?;
    let settings = state.services.settings.get_or_create().await?;
    Ok(Json(ApiResponse::success(settings)))
}

pub async fn update(
    State(state): State<AppState>,
    staff: AuthStaff,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    staff.require_admin()?;
    let settings = state.services.settings.update(payload).await?;
    Ok(Json(ApiResponse::success(settings)))
}
