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

use crate::auth::{AuthCustomer, AuthStaff};
use crate::errors::ServiceError;
use crate::services::reservations::CreateReservationRequest;
use crate::{ApiResponse, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReservationIdQuery {
    pub reservation_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReservationIdBody {
    pub reservation_id: Uuid,
}

/// Staff-side reservation management.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list))
        .route("/reservation/confirm", put(confirm))
        .route("/reservation/cancel", put(cancel))
        .route("/reservation", delete(remove))
}

/// Customer-side reservation endpoints.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/app/reservation", post(create))
        .route("/app/reservations", get(list_mine))
}

/// Customer books a table; starts PENDING.
#[utoipa::path(
    post,
    path = "/app/reservation",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created"),
        (status = 400, description = "Invalid people count or time")
    ),
    security(("bearer_auth" = [])),
    tag = "reservations"
)]
pub async fn create(
    State(state): State<AppState>,
    customer: AuthCustomer,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let reservation = state
        .services
        .reservations
        .create(customer.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(reservation))))
}

/// Customer's own reservations.
#[utoipa::path(
    get,
    path = "/app/reservations",
    responses((status = 200, description = "The customer's reservations")),
    security(("bearer_auth" = [])),
    tag = "reservations"
)]
pub async fn list_mine(
    State(state): State<AppState>,
    customer: AuthCustomer,
) -> Result<impl IntoResponse, ServiceError> {
    let reservations = state
        .services
        .reservations
        .list_for_user(customer.user_id)
        .await?;
    Ok(Json(ApiResponse::success(reservations)))
}

/// Staff view of all reservations.
#[utoipa::path(
    get,
    path = "/reservations",
    responses((status = 200, description = "All reservations, newest first")),
    security(("bearer_auth" = [])),
    tag = "reservations"
)]
pub async fn list(
    State(state): State<AppState>,
    _staff: AuthStaff,
) -> Result<impl IntoResponse, ServiceError> {
    let reservations = state.services.reservations.list().await?;
    Ok(Json(ApiResponse::success(reservations)))
}

/// Confirm a pending reservation.
#[utoipa::path(
    put,
    path = "/reservation/confirm",
    responses(
        (status = 200, description = "Reservation confirmed"),
        (status = 404, description = "Reservation not found"),
        (status = 409, description = "Reservation is cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "reservations"
)]
pub async fn confirm(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Json(payload): Json<ReservationIdBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let reservation = state
        .services
        .reservations
        .confirm(payload.reservation_id)
        .await?;
    Ok(Json(ApiResponse::success(reservation)))
}

/// Cancel a reservation from any state.
#[utoipa::path(
    put,
    path = "/reservation/cancel",
    responses(
        (status = 200, description = "Reservation cancelled"),
        (status = 404, description = "Reservation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reservations"
)]
pub async fn cancel(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Json(payload): Json<ReservationIdBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let reservation = state
        .services
        .reservations
        .cancel(payload.reservation_id)
        .await?;
    Ok(Json(ApiResponse::success(reservation)))
}

/// Remove a concluded reservation (customer arrived).
#[utoipa::path(
    delete,
    path = "/reservation",
    params(ReservationIdQuery),
    responses(
        (status = 200, description = "Reservation removed"),
        (status = 404, description = "Reservation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reservations"
)]
pub async fn remove(
    State(state): State<AppState>,
    _staff: AuthStaff,
    Query(query): Query<ReservationIdQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .reservations
        .delete(query.reservation_id)
        .await?;
    Ok(Json(ApiResponse::success(())))
}
