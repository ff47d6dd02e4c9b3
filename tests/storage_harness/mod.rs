//! Shared test harness for storage backend testing
//!
//! Provides product and order fixtures plus the contract suites every
//! backend must pass:
//! - `catalog_service_tests!` for `CatalogService`
//! - `order_ledger_tests!` for `OrderLedger`
//! - `rest_integration_tests!` for the HTTP surface on top of both
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

use chrono::{Duration, Utc};
use uuid::Uuid;

use storefront::catalog::{Category, Color, Product, ProductImage, Size, SizeStock, Specifications};
use storefront::orders::{
    Order, OrderItem, OrderStatus, PaymentInfo, PaymentMethod, PaymentStatus, ShippingInfo,
};

#[macro_use]
pub mod integration;

/// A product with the given per-size stock
pub fn create_test_product(name: &str, price: f64, sizes: &[(Size, u32)]) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{} description", name),
        price,
        discount_price: None,
        category: Category::Men,
        subcategory: "shirts".to_string(),
        brand: "Acme".to_string(),
        sizes: sizes
            .iter()
            .map(|(size, quantity)| SizeStock {
                size: *size,
                quantity: *quantity,
            })
            .collect(),
        colors: vec![Color {
            name: "Navy".to_string(),
            code: "#000080".to_string(),
        }],
        images: vec![ProductImage {
            url: format!("https://cdn.example.com/{}.jpg", name.to_lowercase()),
            is_main: true,
        }],
        rating: 4.0,
        num_reviews: 3,
        is_featured: false,
        is_active: true,
        tags: vec!["summer".to_string()],
        specifications: Specifications {
            material: Some("cotton".to_string()),
            care_instructions: None,
            origin: Some("PT".to_string()),
        },
        sold: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_shipping() -> ShippingInfo {
    ShippingInfo {
        address: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        country: "US".to_string(),
        zip_code: "62701".to_string(),
        phone: "555-0100".to_string(),
    }
}

/// An order placed `age_minutes` ago with one line of `product`
pub fn create_test_order(user: Uuid, product: &Product, age_minutes: i64) -> Order {
    let created_at = Utc::now() - Duration::minutes(age_minutes);
    Order {
        id: Uuid::new_v4(),
        user,
        order_items: vec![OrderItem {
            product: product.id,
            name: product.name.clone(),
            price: product.final_price(),
            quantity: 1,
            size: Size::M,
            color: None,
            image: product.main_image().map(str::to_string),
        }],
        shipping_info: test_shipping(),
        payment_info: PaymentInfo {
            id: None,
            status: PaymentStatus::Completed,
            payment_method: PaymentMethod::Paypal,
            amount_paid: product.final_price() + 5.0,
            paid_at: created_at,
            update_time: None,
            email_address: None,
        },
        items_price: product.final_price(),
        tax_price: 0.0,
        shipping_price: 5.0,
        total_price: product.final_price() + 5.0,
        order_status: OrderStatus::Processing,
        is_paid: false,
        paid_at: None,
        is_delivered: false,
        delivered_at: None,
        created_at,
        updated_at: created_at,
    }
}
