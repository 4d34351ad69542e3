mod common;

use axum::http::{Method, StatusCode};
use mesa_api::models::Role;
use serde_json::json;
use uuid::Uuid;

use common::{response_json, TestApp};

#[tokio::test]
async fn opening_a_table_creates_settings_and_a_draft_order() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);

    // No settings row exists yet; OpenTable must auto-create max_tables = 5.
    let response = app
        .request(
            Method::POST,
            "/order",
            Some(&token),
            Some(json!({ "table": 3, "name": "Ana" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["data"]["table"], 3);
    assert_eq!(body["data"]["draft"], true);
    assert_eq!(body["data"]["status"], false);
    assert_eq!(body["data"]["name"], "Ana");

    let settings = app
        .state
        .services
        .settings
        .get_or_create()
        .await
        .expect("settings");
    assert_eq!(settings.max_tables, 5);
}

#[tokio::test]
async fn opening_an_occupied_table_is_a_conflict() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);

    let first = app
        .request(
            Method::POST,
            "/order",
            Some(&token),
            Some(json!({ "table": 2 })),
        )
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request(
            Method::POST,
            "/order",
            Some(&token),
            Some(json!({ "table": 2 })),
        )
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = response_json(second).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already open"));
}

#[tokio::test]
async fn table_numbers_outside_the_bound_are_rejected() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);

    for table in [0, -1, 6] {
        let response = app
            .request(
                Method::POST,
                "/order",
                Some(&token),
                Some(json!({ "table": table })),
            )
            .await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "table {table} must be rejected"
        );
        let body = response_json(response).await;
        assert!(
            body["message"].as_str().unwrap().contains("between 1 and 5"),
            "error must name the valid range"
        );
    }

    // Every value inside the bound works when unoccupied.
    for table in 1..=5 {
        let response = app
            .request(
                Method::POST,
                "/order",
                Some(&token),
                Some(json!({ "table": table })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[tokio::test]
async fn end_to_end_lifecycle_tracks_occupancy() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);

    let opened = response_json(
        app.request(
            Method::POST,
            "/order",
            Some(&token),
            Some(json!({ "table": 3, "name": "Ana" })),
        )
        .await,
    )
    .await;
    let order_id = opened["data"]["id"].as_str().unwrap().to_string();

    // Draft order occupies the table.
    let tables = response_json(
        app.request(Method::GET, "/orders/open-tables", Some(&token), None)
            .await,
    )
    .await;
    assert_eq!(tables["data"], json!([3]));

    // Sending keeps the table occupied through the second clause.
    let sent = app
        .request(
            Method::PUT,
            "/order/send",
            Some(&token),
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(sent.status(), StatusCode::OK);
    let sent = response_json(sent).await;
    assert_eq!(sent["data"]["draft"], false);

    let tables = response_json(
        app.request(Method::GET, "/orders/open-tables", Some(&token), None)
            .await,
    )
    .await;
    assert_eq!(tables["data"], json!([3]));

    // Finishing frees the table.
    let finished = app
        .request(
            Method::PUT,
            "/order/finish",
            Some(&token),
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(finished.status(), StatusCode::OK);
    let finished = response_json(finished).await;
    assert_eq!(finished["data"]["status"], true);

    let tables = response_json(
        app.request(Method::GET, "/orders/open-tables", Some(&token), None)
            .await,
    )
    .await;
    assert_eq!(tables["data"], json!([]));

    // The table can be reopened; the finished order stays as history.
    let reopened = app
        .request(
            Method::POST,
            "/order",
            Some(&token),
            Some(json!({ "table": 3 })),
        )
        .await;
    assert_eq!(reopened.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn finishing_twice_is_rejected() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);

    let opened = response_json(
        app.request(
            Method::POST,
            "/order",
            Some(&token),
            Some(json!({ "table": 1 })),
        )
        .await,
    )
    .await;
    let order_id = opened["data"]["id"].as_str().unwrap().to_string();

    let first = app
        .request(
            Method::PUT,
            "/order/finish",
            Some(&token),
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .request(
            Method::PUT,
            "/order/finish",
            Some(&token),
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn open_tables_are_sorted_ascending() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);

    for table in [4, 1, 3] {
        let response = app
            .request(
                Method::POST,
                "/order",
                Some(&token),
                Some(json!({ "table": table })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let tables = response_json(
        app.request(Method::GET, "/orders/open-tables", Some(&token), None)
            .await,
    )
    .await;
    assert_eq!(tables["data"], json!([1, 3, 4]));
}

#[tokio::test]
async fn unknown_order_lookups_return_not_found() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);

    let response = app
        .request(
            Method::PUT,
            "/order/finish",
            Some(&token),
            Some(json!({ "order_id": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_endpoints_require_a_staff_token() {
    let app = TestApp::new().await;

    let unauthenticated = app
        .request(Method::GET, "/orders/open-tables", None, None)
        .await;
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    // Customer tokens are the wrong audience for staff endpoints.
    let app_token = app.app_token(Uuid::new_v4());
    let wrong_audience = app
        .request(Method::GET, "/orders/open-tables", Some(&app_token), None)
        .await;
    assert_eq!(wrong_audience.status(), StatusCode::UNAUTHORIZED);
}
