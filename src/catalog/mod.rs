//! Product catalog: documents, storage contract, operations and routes

pub mod handlers;
pub mod model;
pub mod operations;
pub mod service;

pub use model::{
    Category, Color, Product, ProductFilter, ProductImage, ProductInput, ProductPatch,
    ProductView, Size, SizeStock, Specifications,
};
pub use operations::ProductCatalog;
pub use service::{CatalogService, PatchOutcome, StockUpdate};

use crate::server::AppState;
use axum::{Router, routing::get};

/// Routes for `/products`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}
