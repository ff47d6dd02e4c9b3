//! Integration test infrastructure for storage backends.
//!
//! Builds the real application router on top of any catalog and ledger, with
//! a fixed token table, so the REST suite exercises
//! HTTP → extractor → lifecycle → storage → envelope.
//!
//! # Architecture
//!
//! ```text
//! axum_test::TestServer
//!     └─ Router (ServerBuilder::build)
//!         ├─ GET  /health, /healthz
//!         └─ /api/v1
//!             ├─ /products[/{id}]
//!             └─ /orders[/myorders | /{id}[/pay | /deliver | /cancel | /status]]
//! ```

#[macro_use]
pub mod rest_tests;

use axum_test::TestServer;
use serde_json::{Value, json};
use storefront::catalog::CatalogService;
use storefront::config::{AppConfig, TokenEntry, TokenRole};
use storefront::orders::OrderLedger;
use storefront::server::ServerBuilder;
use uuid::Uuid;

pub const PREFIX: &str = "/api/v1";

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";
pub const ADMIN_TOKEN: &str = "admin-token";

pub const ALICE_ID: Uuid = Uuid::from_u128(0xa11ce);
pub const BOB_ID: Uuid = Uuid::from_u128(0xb0b);
pub const ADMIN_ID: Uuid = Uuid::from_u128(0xad);

/// Config with one token per test principal
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.tokens = vec![
        TokenEntry {
            token: ALICE_TOKEN.to_string(),
            user_id: ALICE_ID,
            role: TokenRole::User,
        },
        TokenEntry {
            token: BOB_TOKEN.to_string(),
            user_id: BOB_ID,
            role: TokenRole::User,
        },
        TokenEntry {
            token: ADMIN_TOKEN.to_string(),
            user_id: ADMIN_ID,
            role: TokenRole::Admin,
        },
    ];
    config
}

/// Build a test server over the given stores
pub fn build_test_server(
    catalog: impl CatalogService + 'static,
    ledger: impl OrderLedger + 'static,
) -> TestServer {
    let app = ServerBuilder::new()
        .with_catalog(catalog)
        .with_ledger(ledger)
        .with_config(test_config())
        .build()
        .expect("Failed to build app");
    TestServer::try_new(app).expect("Failed to create test server")
}

pub fn api(path: &str) -> String {
    format!("{}{}", PREFIX, path)
}

/// Product creation body with the given stock per size
pub fn product_body(name: &str, price: f64, sizes: &[(&str, u32)]) -> Value {
    json!({
        "name": name,
        "description": format!("{} description", name),
        "price": price,
        "category": "women",
        "subcategory": "dresses",
        "brand": "Acme",
        "sizes": sizes
            .iter()
            .map(|(size, quantity)| json!({ "size": size, "quantity": quantity }))
            .collect::<Vec<_>>(),
        "images": [{ "url": "https://cdn.example.com/main.jpg", "isMain": true }]
    })
}

/// Order creation body with `(product_id, size, quantity)` lines
pub fn order_body(lines: &[(&str, &str, u32)]) -> Value {
    json!({
        "orderItems": lines
            .iter()
            .map(|(product, size, quantity)| json!({
                "product": product,
                "size": size,
                "quantity": quantity
            }))
            .collect::<Vec<_>>(),
        "shippingInfo": {
            "address": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "country": "US",
            "zipCode": "62701",
            "phone": "555-0100"
        },
        "paymentInfo": { "paymentMethod": "credit_card", "id": "ch_1" }
    })
}

/// Create a product as admin and return its id
pub async fn seed_product(server: &TestServer, name: &str, price: f64, sizes: &[(&str, u32)]) -> String {
    let response = server
        .post(&api("/products"))
        .authorization_bearer(ADMIN_TOKEN)
        .json(&product_body(name, price, sizes))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["id"]
        .as_str()
        .expect("product id")
        .to_string()
}

/// Quantity on hand for `size`, read through the public API
pub async fn stock_of(server: &TestServer, product_id: &str, size: &str) -> u64 {
    let body: Value = server
        .get(&api(&format!("/products/{}", product_id)))
        .await
        .json();
    body["data"]["sizes"]
        .as_array()
        .expect("sizes")
        .iter()
        .find(|s| s["size"] == size)
        .and_then(|s| s["quantity"].as_u64())
        .expect("size present")
}
