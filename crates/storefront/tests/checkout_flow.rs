//! End-to-end checkout tests.
//!
//! These drive the full router with in-memory stores and a session layer,
//! carrying the session cookie between requests the way a browser would.

#![allow(clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use secrecy::SecretString;
use tower::ServiceExt;

use redline_core::Price;
use redline_storefront::catalog::{Catalog, Product, ProductKind};
use redline_storefront::config::StorefrontConfig;
use redline_storefront::routes;
use redline_storefront::state::AppState;

fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("kD93mQ7xWp2vRt8nLz4bHc6fJs1gYa5e"),
        catalog_path: PathBuf::from("content/catalog.json"),
        mail: None,
        sentry_dsn: None,
    }
}

fn test_catalog() -> Catalog {
    Catalog::from_products(vec![
        Product {
            slug: "ts-250".to_string(),
            name: "Speedster 250".to_string(),
            category: "cars".to_string(),
            price: Price::from_cents(3_450_000),
            description: "A fine roadster.".to_string(),
            kind: ProductKind::Car {
                color: "British Racing Green".to_string(),
                class: "Cabriolet".to_string(),
            },
        },
        Product {
            slug: "chrome-mirror".to_string(),
            name: "Chrome Mirror".to_string(),
            category: "parts".to_string(),
            price: Price::from_cents(8900),
            description: String::new(),
            kind: ProductKind::AccessoryPart {
                compatible_with: vec!["ts-250".to_string()],
            },
        },
    ])
    .unwrap()
}

fn test_app() -> Router {
    let state = AppState::new(test_config(), test_catalog()).unwrap();
    routes::app(state)
}

fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(path: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// The session cookie from a response, trimmed to `name=value`.
fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

const VALID_ADDRESS: &str = "email=kim%40example.com&firstname=Kim&lastname=Muster\
    &street=Garagenweg+7&zip=5020&city=Salzburg&countryCode=at";

#[tokio::test]
async fn address_page_renders_form() {
    let app = test_app();

    let response = app.oneshot(get("/checkout-address", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("name=\"countryCode\""));
    assert!(body.contains("name=\"city\""));
}

#[tokio::test]
async fn full_checkout_flow_completes_order() {
    let app = test_app();

    // Put a car in the cart; this creates the session.
    let response = app
        .clone()
        .oneshot(post_form("/cart/add", "slug=ts-250&quantity=1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response);

    // Submit a complete delivery address.
    let response = app
        .clone()
        .oneshot(post_form("/checkout-address", VALID_ADDRESS, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/checkout-payment")
    );

    // The completed page shows the order from the session.
    let response = app
        .clone()
        .oneshot(get("/checkout-completed", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("RC-"), "order number missing: {body}");
    assert!(body.contains("Salzburg"));

    // Checkout emptied the cart.
    let response = app
        .oneshot(get("/cart", Some(&cookie)))
        .await
        .unwrap();
    let body = body_string(response).await;
    assert!(!body.contains("Speedster 250"));
}

#[tokio::test]
async fn invalid_submission_rerenders_and_commits_nothing() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_form("/cart/add", "slug=ts-250", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    // Everything but the city.
    let body = "email=kim%40example.com&firstname=Kim&lastname=Muster\
        &street=Garagenweg+7&zip=5020&countryCode=AT";
    let response = app
        .clone()
        .oneshot(post_form("/checkout-address", body, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_string(response).await;
    assert!(page.contains("city is required"));
    // The rejected values are echoed back into the form.
    assert!(page.contains("Garagenweg 7"));

    let response = app
        .oneshot(get("/checkout-completed", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completed_page_without_order_is_not_found() {
    let app = test_app();

    let response = app
        .oneshot(get("/checkout-completed", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn adding_unknown_product_is_not_found() {
    let app = test_app();

    let response = app
        .oneshot(post_form("/cart/add", "slug=does-not-exist", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn autocomplete_returns_json_suggestions() {
    let app = test_app();

    let response = app
        .oneshot(get("/search?term=speedster&autocomplete=1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    let suggestions: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(suggestions[0]["href"], "/shop/ts-250");
    assert_eq!(
        suggestions[0]["product"],
        "Speedster 250 British Racing Green, Cabriolet"
    );
}

#[tokio::test]
async fn search_page_lists_matches() {
    let app = test_app();

    let response = app
        .oneshot(get("/search?term=chrome", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Chrome Mirror"));
    assert!(!body.contains("Speedster 250"));
}
