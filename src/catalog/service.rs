//! Storage contract for the product catalog

use super::model::{Product, ProductPatch, Size};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;
use validator::ValidationError;

/// Outcome of a conditional stock change on one product size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    /// The change was applied; `remaining` is the new quantity
    Applied { remaining: u32 },
    /// Fewer units than requested are left; nothing changed
    Insufficient { available: u32 },
    /// The product does not offer this size
    UnknownSize,
    /// No product with this id
    UnknownProduct,
}

impl StockUpdate {
    pub fn is_applied(&self) -> bool {
        matches!(self, StockUpdate::Applied { .. })
    }
}

/// Outcome of applying a patch
#[derive(Debug, Clone)]
pub enum PatchOutcome {
    Updated(Product),
    NotFound,
    /// The patched product would break a cross-field invariant
    Rejected(ValidationError),
}

/// Service trait for the product catalog
///
/// Implementations must make [`CatalogService::try_decrement`] a single
/// atomic step: the availability check and the decrement cannot be
/// interleaved with another decrement of the same size.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Insert a new product
    async fn create(&self, product: Product) -> Result<Product>;

    /// Get a product by ID
    async fn get(&self, id: &Uuid) -> Result<Option<Product>>;

    /// List all products
    async fn list(&self) -> Result<Vec<Product>>;

    /// Apply a patch, re-checking invariants before committing
    ///
    /// Stock counters untouched by the patch must survive concurrent
    /// reservations.
    async fn update(&self, id: &Uuid, patch: ProductPatch) -> Result<PatchOutcome>;

    /// Delete a product, returning whether it existed
    async fn delete(&self, id: &Uuid) -> Result<bool>;

    /// Decrement `size` by `quantity` only if at least `quantity` units remain
    ///
    /// Also adds `quantity` to the product's `sold` counter.
    async fn try_decrement(&self, id: &Uuid, size: Size, quantity: u32) -> Result<StockUpdate>;

    /// Give `quantity` units of `size` back and reduce `sold` accordingly
    async fn increment(&self, id: &Uuid, size: Size, quantity: u32) -> Result<StockUpdate>;
}
