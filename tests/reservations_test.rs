mod common;

use axum::http::{Method, StatusCode};
use mesa_api::models::Role;
use serde_json::json;
use uuid::Uuid;

use common::{response_json, TestApp};

async fn create_reservation(app: &TestApp, customer_id: Uuid) -> String {
    let token = app.app_token(customer_id);
    let response = app
        .request(
            Method::POST,
            "/app/reservation",
            Some(&token),
            Some(json!({
                "date": "2026-09-12T00:00:00Z",
                "time": "19:30",
                "people": 4,
                "notes": "window table please"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "PENDING");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn confirm_moves_pending_to_confirmed() {
    let app = TestApp::new().await;
    let staff = app.staff_token(Role::Gerente);
    let id = create_reservation(&app, Uuid::new_v4()).await;

    let response = app
        .request(
            Method::PUT,
            "/reservation/confirm",
            Some(&staff),
            Some(json!({ "reservation_id": id })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "CONFIRMED");
}

#[tokio::test]
async fn cancelled_reservations_cannot_be_confirmed() {
    let app = TestApp::new().await;
    let staff = app.staff_token(Role::Gerente);
    let id = create_reservation(&app, Uuid::new_v4()).await;

    let cancelled = app
        .request(
            Method::PUT,
            "/reservation/cancel",
            Some(&staff),
            Some(json!({ "reservation_id": id })),
        )
        .await;
    assert_eq!(cancelled.status(), StatusCode::OK);

    let rejected = app
        .request(
            Method::PUT,
            "/reservation/confirm",
            Some(&staff),
            Some(json!({ "reservation_id": id })),
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn cancel_succeeds_from_any_state() {
    let app = TestApp::new().await;
    let staff = app.staff_token(Role::Gerente);
    let id = create_reservation(&app, Uuid::new_v4()).await;

    // PENDING -> CONFIRMED -> CANCELLED -> CANCELLED again.
    for path in ["/reservation/confirm", "/reservation/cancel", "/reservation/cancel"] {
        let response = app
            .request(
                Method::PUT,
                path,
                Some(&staff),
                Some(json!({ "reservation_id": id })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "{path} must succeed");
    }
}

#[tokio::test]
async fn people_count_must_be_positive() {
    let app = TestApp::new().await;
    let token = app.app_token(Uuid::new_v4());

    let response = app
        .request(
            Method::POST,
            "/app/reservation",
            Some(&token),
            Some(json!({
                "date": "2026-09-12T00:00:00Z",
                "time": "19:30",
                "people": 0
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_only_see_their_own_reservations() {
    let app = TestApp::new().await;
    let alice = Uuid::new_v4();
    let bruno = Uuid::new_v4();

    create_reservation(&app, alice).await;
    create_reservation(&app, alice).await;
    create_reservation(&app, bruno).await;

    let mine = response_json(
        app.request(
            Method::GET,
            "/app/reservations",
            Some(&app.app_token(alice)),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(mine["data"].as_array().unwrap().len(), 2);

    // Staff list sees everything.
    let all = response_json(
        app.request(
            Method::GET,
            "/reservations",
            Some(&app.staff_token(Role::Gerente)),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(all["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn staff_can_delete_a_concluded_reservation() {
    let app = TestApp::new().await;
    let staff = app.staff_token(Role::Gerente);
    let id = create_reservation(&app, Uuid::new_v4()).await;

    let deleted = app
        .request(
            Method::DELETE,
            &format!("/reservation?reservation_id={id}"),
            Some(&staff),
            None,
        )
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let missing = app
        .request(
            Method::DELETE,
            &format!("/reservation?reservation_id={id}"),
            Some(&staff),
            None,
        )
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reservation_endpoints_enforce_their_audience() {
    let app = TestApp::new().await;
    let id = create_reservation(&app, Uuid::new_v4()).await;

    // A customer token cannot drive the staff state machine.
    let customer = app.app_token(Uuid::new_v4());
    let response = app
        .request(
            Method::PUT,
            "/reservation/confirm",
            Some(&customer),
            Some(json!({ "reservation_id": id })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A staff token cannot book through the customer app.
    let staff = app.staff_token(Role::Garcom);
    let response = app
        .request(
            Method::POST,
            "/app/reservation",
            Some(&staff),
            Some(json!({
                "date": "2026-09-12T00:00:00Z",
                "time": "20:00",
                "people": 2
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
