//! Integration tests for API endpoints.
//!
//! The real router runs over services wired to the in-memory store, so no
//! database or Redis connection is needed.

mod common;

use std::str::FromStr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{money, test_config, Harness, StaticProbe, UnlimitedRate, TEST_PASSWORD};
use storefront_api::api::{create_router, AppState};
use storefront_api::domain::UserRole;

// =============================================================================
// Test Helpers
// =============================================================================

fn healthy() -> StaticProbe {
    StaticProbe {
        database: Ok(()),
        redis: Ok(()),
    }
}

fn app_with_probe(h: &Harness, probe: StaticProbe) -> Router {
    let state = AppState::new(
        Arc::new(h.services.clone()),
        Arc::new(UnlimitedRate::default()),
        Arc::new(probe),
    );
    create_router(state, &test_config())
}

fn app(h: &Harness) -> Router {
    app_with_probe(h, healthy())
}

async fn token_for(h: &Harness, email: &str) -> String {
    h.auth()
        .login(email.to_string(), TEST_PASSWORD.to_string())
        .await
        .unwrap()
        .token
        .access_token
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal as string")).unwrap()
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_root_endpoint_returns_banner() {
    let h = Harness::new();
    let response = app(&h)
        .oneshot(request(Method::GET, "/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Storefront API is running");
}

#[tokio::test]
async fn test_health_reports_both_backends() {
    let h = Harness::new();
    let (status, body) = send(app(&h), request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "healthy");
    assert_eq!(body["services"]["redis"]["status"], "healthy");
}

#[tokio::test]
async fn test_health_degrades_when_redis_is_down() {
    let h = Harness::new();
    let probe = StaticProbe {
        database: Ok(()),
        redis: Err("connection refused".to_string()),
    };
    let (status, body) = send(
        app_with_probe(&h, probe),
        request(Method::GET, "/health", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["redis"]["status"], "unhealthy");
    assert_eq!(body["services"]["redis"]["error"], "connection refused");
    assert_eq!(body["services"]["database"]["status"], "healthy");
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_register_over_http_returns_created_session() {
    let h = Harness::new();
    let (status, body) = send(
        app(&h),
        request(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({
                "name": "Asha Rao",
                "email": "asha@example.com",
                "password": "shop-secret"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["role"], "customer");
    assert!(body["data"]["access_token"].as_str().is_some());
    assert!(body["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let h = Harness::new();
    let (status, body) = send(
        app(&h),
        request(
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({
                "name": "Asha",
                "email": "not-an-email",
                "password": "shop-secret"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_bad_login_is_unauthorized() {
    let h = Harness::new();
    h.store
        .seed_customer("Bea", "bea@example.com", "9876543210");

    let (status, body) = send(
        app(&h),
        request(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({"email": "bea@example.com", "password": "wrong-one"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_admin_exists_is_public() {
    let h = Harness::new();
    h.store
        .seed_user("Root", "root@example.com", None, UserRole::Admin);

    let (status, body) = send(
        app(&h),
        request(Method::GET, "/api/users/check-admin-exists", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["adminExists"], true);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let h = Harness::new();

    for uri in ["/api/cart", "/api/orders", "/api/users/profile"] {
        let (status, body) = send(app(&h), request(Method::GET, uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    let (status, _) = send(
        app(&h),
        request(Method::GET, "/api/cart", Some("garbage"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbid_customers() {
    let h = Harness::new();
    h.store
        .seed_customer("Cora", "cora@example.com", "9876543211");
    let token = token_for(&h, "cora@example.com").await;

    let (status, body) = send(
        app(&h),
        request(Method::GET, "/api/orders/admin/all", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = send(
        app(&h),
        request(Method::GET, "/api/coupons/all", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Catalog, Cart and Coupon Tests
// =============================================================================

#[tokio::test]
async fn test_product_listing_is_public_and_paginated() {
    let h = Harness::new();
    h.store.seed_product("Kettle", money(800), 4);
    h.store.seed_product("Teapot", money(900), 2);

    let (status, body) = send(
        app(&h),
        request(Method::GET, "/api/products?limit=1&sort=price_asc", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let page = &body["data"];
    assert_eq!(page["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["data"][0]["name"], "Kettle");
    assert_eq!(page["meta"]["total"], 2);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let h = Harness::new();
    let uri = format!("/api/products/{}", uuid::Uuid::new_v4());

    let (status, body) = send(app(&h), request(Method::GET, &uri, None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_customer_adds_to_cart() {
    let h = Harness::new();
    h.store
        .seed_customer("Dina", "dina@example.com", "9876543212");
    let lamp = h.store.seed_product("Lamp", money(250), 10);
    let token = token_for(&h, "dina@example.com").await;

    let (status, body) = send(
        app(&h),
        request(
            Method::POST,
            "/api/cart/add",
            Some(&token),
            Some(json!({"productId": lamp.id, "quantity": 2, "color": "Red"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item added to cart");
    assert_eq!(h.store.tables().cart.len(), 1);
    assert_eq!(h.store.tables().cart[0].selected_color.as_deref(), Some("Red"));
}

#[tokio::test]
async fn test_coupon_validation_over_http() {
    let h = Harness::new();
    h.store.seed_coupon("SAVE10", 10, None, 0, 30);

    let (status, body) = send(
        app(&h),
        request(
            Method::POST,
            "/api/coupons/validate",
            None,
            Some(json!({"code": "save10", "orderTotal": "1000"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Coupon applied successfully");
    assert_eq!(decimal(&body["data"]["discountAmount"]), money(100));
    assert_eq!(decimal(&body["data"]["finalTotal"]), money(900));
}

#[tokio::test]
async fn test_admin_checkout_is_forbidden_over_http() {
    let h = Harness::new();
    h.store
        .seed_user("Root", "root@example.com", None, UserRole::Admin);
    let vase = h.store.seed_product("Vase", money(450), 3);
    let token = token_for(&h, "root@example.com").await;

    let (status, body) = send(
        app(&h),
        request(
            Method::POST,
            "/api/orders/create",
            Some(&token),
            Some(json!({
                "shippingAddress": {
                    "street": "1 Main St",
                    "city": "Pune",
                    "state": "MH",
                    "zipCode": "411001",
                    "country": "India"
                },
                "items": [{"productId": vase.id, "quantity": 1}]
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admins cannot place orders");
    assert_eq!(h.store.product(vase.id).stock, 3);
}
