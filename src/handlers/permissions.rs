use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::AuthStaff;
use crate::errors::ServiceError;
use crate::models::Role;
use crate::services::permissions::UpdatePermissionRequest;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CheckQuery {
    pub role: Role,
    pub route: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FirstRouteQuery {
    pub role: Role,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/permissions/check", get(check))
        .route("/permissions/first-route", get(first_route))
        .route("/admin/permissions", get(list).put(update))
}

/// Route-visibility decision consumed by the dashboard's edge middleware.
#[utoipa::path(
    get,
    path = "/permissions/check",
    params(CheckQuery),
    responses((status = 200, description = "Whether the role may visit the route")),
    security(("bearer_auth" = [])),
    tag = "permissions"
)]
pub async fn check(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<CheckQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let allowed = state
        .services
        .permissions
        .check(query.role, &query.route)
        .await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "can_access": allowed }),
    )))
}

/// Post-login landing route for a role.
#[utoipa::path(
    get,
    path = "/permissions/first-route",
    params(FirstRouteQuery),
    responses((status = 200, description = "First allowed route, or the unauthorized sentinel")),
    security(("bearer_auth" = [])),
    tag = "permissions"
)]
pub async fn first_route(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<FirstRouteQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let route = state.services.permissions.first_route(query.role).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "route": route }),
    )))
}

/// Full permission matrix, seeding defaults on the first call.
#[utoipa::path(
    get,
    path = "/admin/permissions",
    responses((status = 200, description = "Permission matrix grouped by role")),
    security(("bearer_auth" = [])),
    tag = "permissions"
)]
pub async fn list(
    State(state): State<AppState>,
    staff: AuthStaff,
) -> Result<impl IntoResponse, ServiceError> {
    staff.require_admin()?;
    let matrix = state.services.permissions.list().await?;
    Ok(Json(ApiResponse::success(matrix)))
}

/// Flip one cell of the matrix.
#[utoipa::path(
    put,
    path = "/admin/permissions",
    request_body = UpdatePermissionRequest,
    responses(
        (status = 200, description = "Permission updated"),
        (status = 404, description = "Pair was never seeded")
    ),
    security(("bearer_auth" = [])),
    tag = "permissions"
)]
pub async fn update(
    State(state): State<AppState>,
    staff: AuthStaff,
    Json(payload): Json<UpdatePermissionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    staff.require_admin()?;
    let updated = state.services.permissions.update(payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}
