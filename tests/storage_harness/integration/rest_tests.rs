//! REST integration test macro for storage backends.
//!
//! The `rest_integration_tests!` macro generates HTTP-level tests that run
//! the full order and catalog flows against a catalog and a ledger:
//! JSON → HTTP request → handler → lifecycle → storage → JSON envelope.
//!
//! # Generated Tests
//!
//! ## Catalog
//! - `test_rest_product_crud`: admin create/update/delete, public reads
//! - `test_rest_product_requires_admin`: 401 for users and anonymous callers
//! - `test_rest_product_validation`: duplicate sizes, discount >= price, blank name
//! - `test_rest_negative_discount_rejected`: patch refused, prices unchanged
//! - `test_rest_inactive_product_hidden`: 404 unless admin
//!
//! ## Orders
//! - `test_rest_create_order_prices_server_side`: 201 with computed prices
//! - `test_rest_create_order_requires_login`: anonymous → 401
//! - `test_rest_out_of_stock`: second order for the last units → 400
//! - `test_rest_order_access`: owner and admin only
//! - `test_rest_pay_and_deliver`: payment metadata, admin delivery
//! - `test_rest_cancel_restores_stock`: cancel returns exact quantities
//! - `test_rest_cancel_delivered_rejected`: 400 INVALID_TRANSITION
//! - `test_rest_lists`: myorders vs admin list with counts
//! - `test_rest_status_update`: admin moves along the table
//!
//! ## Errors
//! - `test_rest_invalid_uuid`: garbage id → 400
//! - `test_rest_unknown_token`: bad bearer → 401
//! - `test_rest_malformed_json`: invalid body → 400 VALIDATION_ERROR
#[macro_export]
macro_rules! rest_integration_tests {
    ($catalog_factory:expr, $ledger_factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use serde_json::{Value, json};
            use crate::storage_harness::integration::*;

            async fn make_server() -> TestServer {
                build_test_server($catalog_factory, $ledger_factory)
            }

            // ==============================================================
            // Health
            // ==============================================================

            #[tokio::test]
            async fn test_rest_health_at_root() {
                let server = make_server().await;

                let response = server.get("/health").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["status"], "ok");

                server.get("/healthz").await.assert_status_ok();
            }

            // ==============================================================
            // Catalog
            // ==============================================================

            #[tokio::test]
            async fn test_rest_product_crud() {
                let server = make_server().await;
                let id = seed_product(&server, "Wrap Dress", 80.0, &[("S", 2), ("M", 0)]).await;

                let response = server.get(&api(&format!("/products/{}", id))).await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(body["data"]["name"], "Wrap Dress");
                assert_eq!(body["data"]["inStock"], true);
                assert_eq!(body["data"]["finalPrice"], 80.0);
                assert_eq!(body["data"]["mainImage"], "https://cdn.example.com/main.jpg");

                let response = server
                    .put(&api(&format!("/products/{}", id)))
                    .authorization_bearer(ADMIN_TOKEN)
                    .json(&json!({ "discountPrice": 60.0 }))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["data"]["finalPrice"], 60.0);

                let response = server.get(&api("/products")).await;
                let body: Value = response.json();
                assert_eq!(body["count"], 1);

                let response = server
                    .delete(&api(&format!("/products/{}", id)))
                    .authorization_bearer(ADMIN_TOKEN)
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["data"], json!({}));

                server
                    .get(&api(&format!("/products/{}", id)))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_product_requires_admin() {
                let server = make_server().await;
                let body = product_body("Tee", 10.0, &[("M", 1)]);

                let response = server
                    .post(&api("/products"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&body)
                    .await;
                response.assert_status(StatusCode::UNAUTHORIZED);
                let err: Value = response.json();
                assert_eq!(err["success"], false);
                assert_eq!(err["code"], "UNAUTHORIZED");

                server
                    .post(&api("/products"))
                    .json(&body)
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);
            }

            #[tokio::test]
            async fn test_rest_product_validation() {
                let server = make_server().await;

                let response = server
                    .post(&api("/products"))
                    .authorization_bearer(ADMIN_TOKEN)
                    .json(&product_body("Tee", 10.0, &[("M", 1), ("M", 2)]))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let err: Value = response.json();
                assert_eq!(err["code"], "VALIDATION_ERROR");

                let mut body = product_body("Tee", 10.0, &[("M", 1)]);
                body["discountPrice"] = json!(10.0);
                let response = server
                    .post(&api("/products"))
                    .authorization_bearer(ADMIN_TOKEN)
                    .json(&body)
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);

                server
                    .post(&api("/products"))
                    .authorization_bearer(ADMIN_TOKEN)
                    .json(&product_body("   ", 10.0, &[("M", 1)]))
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
            }

            #[tokio::test]
            async fn test_rest_negative_discount_rejected() {
                let server = make_server().await;
                let id = seed_product(&server, "Scarf", 20.0, &[("M", 5)]).await;

                let response = server
                    .put(&api(&format!("/products/{}", id)))
                    .authorization_bearer(ADMIN_TOKEN)
                    .json(&json!({ "discountPrice": -100.0 }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let err: Value = response.json();
                assert_eq!(err["code"], "VALIDATION_ERROR");

                let response = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&order_body(&[(&id, "M", 1)]))
                    .await;
                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                assert_eq!(body["data"]["itemsPrice"], 20.0);
                assert_eq!(body["data"]["totalPrice"], 27.0);
            }

            #[tokio::test]
            async fn test_rest_inactive_product_hidden() {
                let server = make_server().await;
                let id = seed_product(&server, "Retired Coat", 90.0, &[("L", 1)]).await;
                server
                    .put(&api(&format!("/products/{}", id)))
                    .authorization_bearer(ADMIN_TOKEN)
                    .json(&json!({ "isActive": false }))
                    .await
                    .assert_status_ok();

                let path = api(&format!("/products/{}", id));
                server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
                server
                    .get(&path)
                    .authorization_bearer(ALICE_TOKEN)
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
                server
                    .get(&path)
                    .authorization_bearer(ADMIN_TOKEN)
                    .await
                    .assert_status_ok();
            }

            // ==============================================================
            // Orders
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_order_prices_server_side() {
                let server = make_server().await;
                let id = seed_product(&server, "Blazer", 100.0, &[("L", 3)]).await;

                let mut body = order_body(&[(&id, "L", 1)]);
                body["totalPrice"] = json!(1.0);
                body["itemsPrice"] = json!(1.0);
                let response = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&body)
                    .await;

                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                let order = &body["data"];
                assert_eq!(order["itemsPrice"], 100.0);
                assert_eq!(order["taxPrice"], 10.0);
                assert_eq!(order["shippingPrice"], 0.0);
                assert_eq!(order["totalPrice"], 110.0);
                assert_eq!(order["orderStatus"], "processing");
                assert_eq!(order["paymentInfo"]["status"], "completed");
                assert_eq!(order["paymentInfo"]["paymentMethod"], "credit_card");
                assert_eq!(order["orderItems"][0]["name"], "Blazer");
                assert_eq!(order["orderItems"][0]["price"], 100.0);
                assert_eq!(order["statusInfo"]["progress"], 25);
                assert_eq!(order["user"], ALICE_ID.to_string());

                assert_eq!(stock_of(&server, &id, "L").await, 2);
            }

            #[tokio::test]
            async fn test_rest_create_order_requires_login() {
                let server = make_server().await;
                let id = seed_product(&server, "Blazer", 100.0, &[("L", 3)]).await;

                server
                    .post(&api("/orders"))
                    .json(&order_body(&[(&id, "L", 1)]))
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);

                let response = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&order_body(&[]))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let err: Value = response.json();
                assert_eq!(err["message"], "No order items");

                assert_eq!(stock_of(&server, &id, "L").await, 3);
            }

            #[tokio::test]
            async fn test_rest_out_of_stock() {
                let server = make_server().await;
                let id = seed_product(&server, "Skirt", 30.0, &[("M", 2)]).await;

                server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&order_body(&[(&id, "M", 2)]))
                    .await
                    .assert_status(StatusCode::CREATED);
                assert_eq!(stock_of(&server, &id, "M").await, 0);

                let response = server
                    .post(&api("/orders"))
                    .authorization_bearer(BOB_TOKEN)
                    .json(&order_body(&[(&id, "M", 1)]))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let err: Value = response.json();
                assert_eq!(err["code"], "OUT_OF_STOCK");
                assert_eq!(err["message"], "Not enough stock for Skirt (Size: M)");
            }

            #[tokio::test]
            async fn test_rest_partial_failure_mutates_nothing() {
                let server = make_server().await;
                let a = seed_product(&server, "Top", 20.0, &[("S", 5)]).await;
                let b = seed_product(&server, "Scarf", 15.0, &[("One Size", 1)]).await;

                let response = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&order_body(&[(&a, "S", 2), (&b, "One Size", 2)]))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);

                assert_eq!(stock_of(&server, &a, "S").await, 5);
                assert_eq!(stock_of(&server, &b, "One Size").await, 1);
            }

            #[tokio::test]
            async fn test_rest_order_access() {
                let server = make_server().await;
                let id = seed_product(&server, "Coat", 150.0, &[("M", 2)]).await;
                let created: Value = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&order_body(&[(&id, "M", 1)]))
                    .await
                    .json();
                let order_id = created["data"]["id"].as_str().unwrap().to_string();
                let path = api(&format!("/orders/{}", order_id));

                server
                    .get(&path)
                    .authorization_bearer(ALICE_TOKEN)
                    .await
                    .assert_status_ok();
                server
                    .get(&path)
                    .authorization_bearer(ADMIN_TOKEN)
                    .await
                    .assert_status_ok();
                server
                    .get(&path)
                    .authorization_bearer(BOB_TOKEN)
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);
                server
                    .get(&api(&format!("/orders/{}", uuid::Uuid::new_v4())))
                    .authorization_bearer(ADMIN_TOKEN)
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_pay_and_deliver() {
                let server = make_server().await;
                let id = seed_product(&server, "Coat", 150.0, &[("M", 2)]).await;
                let created: Value = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&order_body(&[(&id, "M", 1)]))
                    .await
                    .json();
                let order_id = created["data"]["id"].as_str().unwrap().to_string();

                let response = server
                    .put(&api(&format!("/orders/{}/pay", order_id)))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&json!({
                        "id": "PAY-9",
                        "status": "COMPLETED",
                        "update_time": "2026-03-01T10:00:00Z",
                        "payer": { "email_address": "alice@example.com" }
                    }))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["data"]["isPaid"], true);
                assert_eq!(body["data"]["paymentInfo"]["id"], "PAY-9");
                assert_eq!(body["data"]["paymentInfo"]["emailAddress"], "alice@example.com");

                server
                    .put(&api(&format!("/orders/{}/deliver", order_id)))
                    .authorization_bearer(ALICE_TOKEN)
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);

                let response = server
                    .put(&api(&format!("/orders/{}/deliver", order_id)))
                    .authorization_bearer(ADMIN_TOKEN)
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["data"]["isDelivered"], true);
                assert_eq!(body["data"]["orderStatus"], "delivered");
                assert!(body["data"]["deliveredAt"].is_string());
            }

            #[tokio::test]
            async fn test_rest_cancel_restores_stock() {
                let server = make_server().await;
                let id = seed_product(&server, "Jumper", 40.0, &[("M", 4), ("L", 1)]).await;
                let created: Value = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&order_body(&[(&id, "M", 3), (&id, "L", 1)]))
                    .await
                    .json();
                let order_id = created["data"]["id"].as_str().unwrap().to_string();
                assert_eq!(stock_of(&server, &id, "M").await, 1);

                server
                    .put(&api(&format!("/orders/{}/cancel", order_id)))
                    .authorization_bearer(BOB_TOKEN)
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);

                let response = server
                    .put(&api(&format!("/orders/{}/cancel", order_id)))
                    .authorization_bearer(ALICE_TOKEN)
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["success"], true);
                assert_eq!(body["data"], json!({}));

                assert_eq!(stock_of(&server, &id, "M").await, 4);
                assert_eq!(stock_of(&server, &id, "L").await, 1);

                let order: Value = server
                    .get(&api(&format!("/orders/{}", order_id)))
                    .authorization_bearer(ALICE_TOKEN)
                    .await
                    .json();
                assert_eq!(order["data"]["orderStatus"], "cancelled");
            }

            #[tokio::test]
            async fn test_rest_cancel_delivered_rejected() {
                let server = make_server().await;
                let id = seed_product(&server, "Jumper", 40.0, &[("M", 4)]).await;
                let created: Value = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&order_body(&[(&id, "M", 1)]))
                    .await
                    .json();
                let order_id = created["data"]["id"].as_str().unwrap().to_string();

                server
                    .put(&api(&format!("/orders/{}/deliver", order_id)))
                    .authorization_bearer(ADMIN_TOKEN)
                    .await
                    .assert_status_ok();

                let response = server
                    .put(&api(&format!("/orders/{}/cancel", order_id)))
                    .authorization_bearer(ALICE_TOKEN)
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let err: Value = response.json();
                assert_eq!(err["code"], "INVALID_TRANSITION");
                assert_eq!(stock_of(&server, &id, "M").await, 3);
            }

            #[tokio::test]
            async fn test_rest_lists() {
                let server = make_server().await;
                let id = seed_product(&server, "Sock", 5.0, &[("One Size", 10)]).await;

                for token in [ALICE_TOKEN, ALICE_TOKEN, BOB_TOKEN] {
                    server
                        .post(&api("/orders"))
                        .authorization_bearer(token)
                        .json(&order_body(&[(&id, "One Size", 1)]))
                        .await
                        .assert_status(StatusCode::CREATED);
                }

                let mine: Value = server
                    .get(&api("/orders/myorders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .await
                    .json();
                assert_eq!(mine["count"], 2);
                assert_eq!(mine["data"].as_array().unwrap().len(), 2);

                server
                    .get(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);

                let all: Value = server
                    .get(&api("/orders"))
                    .authorization_bearer(ADMIN_TOKEN)
                    .await
                    .json();
                assert_eq!(all["count"], 3);
            }

            #[tokio::test]
            async fn test_rest_status_update() {
                let server = make_server().await;
                let id = seed_product(&server, "Boot", 90.0, &[("L", 2)]).await;
                let created: Value = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&order_body(&[(&id, "L", 1)]))
                    .await
                    .json();
                let path = api(&format!(
                    "/orders/{}/status",
                    created["data"]["id"].as_str().unwrap()
                ));

                server
                    .put(&path)
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&json!({ "status": "shipped" }))
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);

                let response = server
                    .put(&path)
                    .authorization_bearer(ADMIN_TOKEN)
                    .json(&json!({ "status": "shipped" }))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["data"]["orderStatus"], "shipped");
                assert_eq!(body["data"]["statusInfo"]["progress"], 50);

                let response = server
                    .put(&path)
                    .authorization_bearer(ADMIN_TOKEN)
                    .json(&json!({ "status": "processing" }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let err: Value = response.json();
                assert_eq!(err["code"], "INVALID_TRANSITION");
            }

            // ==============================================================
            // Errors
            // ==============================================================

            #[tokio::test]
            async fn test_rest_invalid_uuid() {
                let server = make_server().await;
                let response = server.get(&api("/products/not-a-uuid")).await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let err: Value = response.json();
                assert_eq!(err["code"], "VALIDATION_ERROR");
            }

            #[tokio::test]
            async fn test_rest_unknown_token() {
                let server = make_server().await;
                server
                    .get(&api("/orders/myorders"))
                    .authorization_bearer("forged")
                    .await
                    .assert_status(StatusCode::UNAUTHORIZED);
            }

            #[tokio::test]
            async fn test_rest_malformed_json() {
                let server = make_server().await;
                let response = server
                    .post(&api("/orders"))
                    .authorization_bearer(ALICE_TOKEN)
                    .json(&json!({ "orderItems": "nope" }))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let err: Value = response.json();
                assert_eq!(err["success"], false);
                assert_eq!(err["code"], "VALIDATION_ERROR");
            }
        }
    };
}
