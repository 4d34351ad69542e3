mod common;

use axum::http::{Method, StatusCode};
use mesa_api::models::Role;
use serde_json::json;

use common::{response_json, TestApp};

struct Catalog {
    category_id: String,
    product_id: String,
}

async fn seed_catalog(app: &TestApp, token: &str) -> Catalog {
    let category = response_json(
        app.request(
            Method::POST,
            "/category",
            Some(token),
            Some(json!({ "name": "Pizzas" })),
        )
        .await,
    )
    .await;
    let category_id = category["data"]["id"].as_str().unwrap().to_string();

    let product = response_json(
        app.request(
            Method::POST,
            "/product",
            Some(token),
            Some(json!({
                "name": "Margherita",
                "price": "42.90",
                "description": "Tomato, mozzarella, basil",
                "banner": "margherita.png",
                "category_id": category_id
            })),
        )
        .await,
    )
    .await;
    let product_id = product["data"]["id"].as_str().unwrap().to_string();

    Catalog {
        category_id,
        product_id,
    }
}

/// Opens a table and attaches one unit of the product; returns the order id.
async fn open_order_with_item(app: &TestApp, token: &str, table: i32, product_id: &str) -> String {
    let order = response_json(
        app.request(
            Method::POST,
            "/order",
            Some(token),
            Some(json!({ "table": table })),
        )
        .await,
    )
    .await;
    let order_id = order["data"]["id"].as_str().unwrap().to_string();

    let added = app
        .request(
            Method::POST,
            "/order/add",
            Some(token),
            Some(json!({
                "order_id": order_id,
                "product_id": product_id,
                "amount": 1
            })),
        )
        .await;
    assert_eq!(added.status(), StatusCode::CREATED);

    order_id
}

#[tokio::test]
async fn product_with_items_on_an_open_order_cannot_be_deleted() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Gerente);
    let catalog = seed_catalog(&app, &token).await;

    let order_id = open_order_with_item(&app, &token, 1, &catalog.product_id).await;

    let blocked = app
        .request(
            Method::DELETE,
            &format!("/product?product_id={}", catalog.product_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);
    let body = response_json(blocked).await;
    assert!(body["message"].as_str().unwrap().contains("open orders"));

    // Finishing the order turns its items historical; deletion now succeeds.
    let finished = app
        .request(
            Method::PUT,
            "/order/finish",
            Some(&token),
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(finished.status(), StatusCode::OK);

    let deleted = app
        .request(
            Method::DELETE,
            &format!("/product?product_id={}", catalog.product_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);
}

#[tokio::test]
async fn category_deletion_distinguishes_its_two_conflicts() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Gerente);
    let catalog = seed_catalog(&app, &token).await;

    let order_id = open_order_with_item(&app, &token, 2, &catalog.product_id).await;

    // Blocked by items on an open order.
    let blocked = app
        .request(
            Method::DELETE,
            &format!("/category?category_id={}", catalog.category_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);
    let body = response_json(blocked).await;
    assert!(body["message"].as_str().unwrap().contains("open orders"));

    // After finishing, still blocked while products remain, with the
    // generic message.
    let finished = app
        .request(
            Method::PUT,
            "/order/finish",
            Some(&token),
            Some(json!({ "order_id": order_id })),
        )
        .await;
    assert_eq!(finished.status(), StatusCode::OK);

    let blocked = app
        .request(
            Method::DELETE,
            &format!("/category?category_id={}", catalog.category_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);
    let body = response_json(blocked).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("associated products"));

    // Empty category deletes cleanly.
    let deleted_product = app
        .request(
            Method::DELETE,
            &format!("/product?product_id={}", catalog.product_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(deleted_product.status(), StatusCode::OK);

    let deleted = app
        .request(
            Method::DELETE,
            &format!("/category?category_id={}", catalog.category_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);
}

#[tokio::test]
async fn item_amounts_must_be_positive() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);
    let catalog = seed_catalog(&app, &token).await;

    let order = response_json(
        app.request(
            Method::POST,
            "/order",
            Some(&token),
            Some(json!({ "table": 1 })),
        )
        .await,
    )
    .await;
    let order_id = order["data"]["id"].as_str().unwrap();

    let rejected = app
        .request(
            Method::POST,
            "/order/add",
            Some(&token),
            Some(json!({
                "order_id": order_id,
                "product_id": catalog.product_id,
                "amount": 0
            })),
        )
        .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn removing_an_item_detaches_it_from_the_order() {
    let app = TestApp::new().await;
    let token = app.staff_token(Role::Garcom);
    let catalog = seed_catalog(&app, &token).await;

    let order = response_json(
        app.request(
            Method::POST,
            "/order",
            Some(&token),
            Some(json!({ "table": 4 })),
        )
        .await,
    )
    .await;
    let order_id = order["data"]["id"].as_str().unwrap().to_string();

    let added = response_json(
        app.request(
            Method::POST,
            "/order/add",
            Some(&token),
            Some(json!({
                "order_id": order_id,
                "product_id": catalog.product_id,
                "amount": 2
            })),
        )
        .await,
    )
    .await;
    let item_id = added["data"]["id"].as_str().unwrap();

    let detail = response_json(
        app.request(
            Method::GET,
            &format!("/order/detail?order_id={order_id}"),
            Some(&token),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(detail["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(detail["data"]["items"][0]["amount"], 2);
    assert_eq!(detail["data"]["items"][0]["product"]["name"], "Margherita");

    let removed = app
        .request(
            Method::DELETE,
            &format!("/order/remove?item_id={item_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(removed.status(), StatusCode::OK);

    let detail = response_json(
        app.request(
            Method::GET,
            &format!("/order/detail?order_id={order_id}"),
            Some(&token),
            None,
        )
        .await,
    )
    .await;
    assert!(detail["data"]["items"].as_array().unwrap().is_empty());
}
