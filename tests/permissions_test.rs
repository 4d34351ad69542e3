mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use mesa_api::entities::role_permission::{ActiveModel as PermissionActiveModel, Entity as PermissionEntity};
use mesa_api::models::Role;
use sea_orm::{EntityTrait, PaginatorTrait, Set};
use serde_json::json;
use uuid::Uuid;

use common::{response_json, TestApp};

async fn insert_permission(app: &TestApp, role: Role, route: &str, can_access: bool) {
    let now = Utc::now();
    let row = PermissionActiveModel {
        id: Set(Uuid::new_v4()),
        role: Set(role.to_string()),
        route: Set(route.to_string()),
        can_access: Set(can_access),
        created_at: Set(now),
        updated_at: Set(Some(now)),
    };
    PermissionEntity::insert(row)
        .exec(&*app.state.db)
        .await
        .expect("insert permission row");
}

#[tokio::test]
async fn admin_bypasses_the_matrix_even_when_empty() {
    let app = TestApp::new().await;

    // No rows exist at all.
    let allowed = app
        .state
        .services
        .permissions
        .check(Role::Admin, "/dashboard/anything")
        .await
        .unwrap();
    assert!(allowed);
}

#[tokio::test]
async fn missing_rows_deny_by_default() {
    let app = TestApp::new().await;

    for role in [Role::Gerente, Role::Garcom, Role::Cozinha, Role::User] {
        let allowed = app
            .state
            .services
            .permissions
            .check(role, "/dashboard/order")
            .await
            .unwrap();
        assert!(!allowed, "{role} must be denied without a stored row");
    }
}

#[tokio::test]
async fn stored_rows_drive_the_decision() {
    let app = TestApp::new().await;

    insert_permission(&app, Role::Garcom, "/dashboard/order", true).await;
    insert_permission(&app, Role::Garcom, "/dashboard/admin", false).await;

    let svc = &app.state.services.permissions;
    assert!(svc.check(Role::Garcom, "/dashboard/order").await.unwrap());
    assert!(!svc.check(Role::Garcom, "/dashboard/admin").await.unwrap());
}

#[tokio::test]
async fn first_route_is_lexicographic_among_allowed_rows() {
    let app = TestApp::new().await;

    insert_permission(&app, Role::Garcom, "/dashboard/order", true).await;
    insert_permission(&app, Role::Garcom, "/dashboard/kitchen", true).await;
    insert_permission(&app, Role::Garcom, "/dashboard/admin", false).await;

    let route = app
        .state
        .services
        .permissions
        .first_route(Role::Garcom)
        .await
        .unwrap();
    // "kitchen" sorts before "order"; the false row never wins.
    assert_eq!(route, "/dashboard/kitchen");
}

#[tokio::test]
async fn first_route_falls_back_to_the_sentinel() {
    let app = TestApp::new().await;

    insert_permission(&app, Role::Cozinha, "/dashboard/kitchen", false).await;

    let svc = &app.state.services.permissions;
    assert_eq!(svc.first_route(Role::Cozinha).await.unwrap(), "/unauthorized");
    assert_eq!(svc.first_route(Role::Admin).await.unwrap(), "/dashboard");
}

#[tokio::test]
async fn listing_seeds_the_default_matrix_once() {
    let app = TestApp::new().await;
    let admin = app.staff_token(Role::Admin);

    let response = app
        .request(Method::GET, "/admin/permissions", Some(&admin), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    // Every role has a row for every route.
    let garcom = body["data"]["GARCOM"].as_array().unwrap();
    assert_eq!(garcom.len(), 8);
    let allowed: Vec<&str> = garcom
        .iter()
        .filter(|e| e["can_access"] == true)
        .map(|e| e["route"].as_str().unwrap())
        .collect();
    assert_eq!(
        allowed,
        vec!["/dashboard", "/dashboard/order", "/dashboard/table"]
    );

    let cozinha = body["data"]["COZINHA"].as_array().unwrap();
    let allowed: Vec<&str> = cozinha
        .iter()
        .filter(|e| e["can_access"] == true)
        .map(|e| e["route"].as_str().unwrap())
        .collect();
    assert_eq!(allowed, vec!["/dashboard/kitchen"]);

    let gerente = body["data"]["GERENTE"].as_array().unwrap();
    assert!(gerente
        .iter()
        .all(|e| (e["route"] == "/dashboard/admin") != (e["can_access"] == true)));

    // Seeding is one-time: a second list does not duplicate rows.
    let count_before = PermissionEntity::find().count(&*app.state.db).await.unwrap();
    let response = app
        .request(Method::GET, "/admin/permissions", Some(&admin), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let count_after = PermissionEntity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(count_before, count_after);
    assert_eq!(count_after, 5 * 8);
}

#[tokio::test]
async fn updating_an_unseeded_pair_is_not_found() {
    let app = TestApp::new().await;
    let admin = app.staff_token(Role::Admin);

    let response = app
        .request(
            Method::PUT,
            "/admin/permissions",
            Some(&admin),
            Some(json!({
                "role": "GARCOM",
                "route": "/dashboard/kitchen",
                "can_access": true
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updating_a_seeded_pair_flips_the_decision() {
    let app = TestApp::new().await;
    let admin = app.staff_token(Role::Admin);

    // Seed via list.
    let response = app
        .request(Method::GET, "/admin/permissions", Some(&admin), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let svc = &app.state.services.permissions;
    assert!(!svc.check(Role::Cozinha, "/dashboard/order").await.unwrap());

    let response = app
        .request(
            Method::PUT,
            "/admin/permissions",
            Some(&admin),
            Some(json!({
                "role": "COZINHA",
                "route": "/dashboard/order",
                "can_access": true
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(svc.check(Role::Cozinha, "/dashboard/order").await.unwrap());
}

#[tokio::test]
async fn matrix_administration_requires_the_admin_role() {
    let app = TestApp::new().await;
    let gerente = app.staff_token(Role::Gerente);

    let response = app
        .request(Method::GET, "/admin/permissions", Some(&gerente), None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(
            Method::PUT,
            "/admin/permissions",
            Some(&gerente),
            Some(json!({
                "role": "USER",
                "route": "/dashboard",
                "can_access": false
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn check_endpoint_reports_the_decision() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);

    insert_permission(&app, Role::Garcom, "/dashboard/order", true).await;

    let response = app
        .request(
            Method::GET,
            "/permissions/check?role=GARCOM&route=/dashboard/order",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["can_access"], true);

    let response = app
        .request(
            Method::GET,
            "/permissions/first-route?role=GARCOM",
            Some(&token),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["route"], "/dashboard/order");
}
