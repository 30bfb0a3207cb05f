//! End-to-end tests against the assembled router

use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use sync_server::core::{Config, Server, ServerState};
use tower::ServiceExt;

const API_KEY: &str = "test-key";

async fn test_state() -> ServerState {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .pragma("foreign_keys", "ON");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    sqlx::query(
        "INSERT INTO products (sku, name, price, stock_status, blank_price, processing_fee, printing_price)
         VALUES ('TEE-M', 'Tee M', 10.0, 'instock', '450', '0', '120')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let mut config = Config::with_overrides("/tmp/order-sync-test", 0);
    config.api_key = API_KEY.to_string();
    ServerState::new(config, pool)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", API_KEY);
    match body {
        Some(json_body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_payload(external_id: &str) -> Value {
    json!({
        "id": external_id,
        "address_to": {
            "address1": "Main St 1", "city": "Riga", "zip": "LV-1010",
            "country": "LV", "first_name": "Jane", "last_name": "Doe",
            "email": "jane@example.com"
        },
        "address_from": {
            "address1": "Factory Rd 2", "city": "Riga", "zip": "LV-1011",
            "country": "LV", "company": "PrintWorks"
        },
        "shipping": { "carrier": "DPD", "priority": "standard" },
        "items": [{
            "id": "i-1", "sku": "TEE-M", "quantity": 2,
            "print_files": { "front": "https://x/front.png" },
            "preview_files": { "front": "https://x/preview.png" }
        }]
    })
}

#[tokio::test]
async fn test_requests_without_api_key_are_rejected() {
    let app = Server::app(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v2019-06/stock")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = Server::app(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_order_lifecycle_over_http() {
    let app = Server::app(test_state().await);

    // create
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v2019-06/orders",
            Some(create_payload("ext-1")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["id"], "ext-1");

    // duplicate create is the already-linked outcome
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/v2019-06/orders",
            Some(create_payload("ext-1")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

    // snapshot
    let response = app
        .clone()
        .oneshot(request("GET", "/v2019-06/orders/ext-1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["items"][0]["sku"], "TEE-M");
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["shipping"]["carrier"], "DPD");

    // update a flag
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/v2019-06/orders/ext-1",
            Some(json!({ "sample": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // events carry the creation entry and the rollup status
    let response = app
        .clone()
        .oneshot(request("GET", "/v2019-06/orders/ext-1/events", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "created");
    assert_eq!(body["events"][0]["action"], "created");
    assert_eq!(body["events"][0]["affected_items"][0], "i-1");
    assert!(body["events"][0]["time"].is_string());

    // cancel everything
    let response = app
        .clone()
        .oneshot(request("POST", "/v2019-06/orders/ext-1/cancel", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["items"][0]["status"], "success");
}

#[tokio::test]
async fn test_create_with_unknown_sku_returns_field_errors() {
    let app = Server::app(test_state().await);

    let mut payload = create_payload("ext-2");
    payload["items"][0]["sku"] = json!("GHOST");

    let response = app
        .clone()
        .oneshot(request("POST", "/v2019-06/orders", Some(payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["status"], "failed");
    assert_eq!(body["errors"][0]["code"], "sku_not_found");

    // nothing was linked
    let response = app
        .oneshot(request("GET", "/v2019-06/orders/ext-2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stock_and_pricing_projections() {
    let app = Server::app(test_state().await);

    let response = app
        .clone()
        .oneshot(request("GET", "/v2019-06/stock", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["TEE-M"]["status"], "in-stock");
    // stock tracking disabled reports unlimited
    assert_eq!(body["TEE-M"]["stock"], 99999);

    let response = app
        .clone()
        .oneshot(request("GET", "/v2019-06/pricing/TEE-M", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["blank"], "450");
    assert_eq!(body["printing"]["areas"][0], "all");

    let response = app
        .oneshot(request("GET", "/v2019-06/stock/GHOST", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination_slices_the_sku_map() {
    let state = test_state().await;
    for sku in ["TEE-S", "TEE-L", "TEE-XL"] {
        sqlx::query("INSERT INTO products (sku, name, price, stock_status) VALUES (?, ?, 5.0, 'instock')")
            .bind(sku)
            .bind(sku)
            .execute(&state.db)
            .await
            .unwrap();
    }
    let app = Server::app(state);

    let response = app
        .oneshot(request("GET", "/v2019-06/stock?limit=2&offset=1", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_object().unwrap().len(), 2);
}
