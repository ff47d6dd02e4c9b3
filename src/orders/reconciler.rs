//! Stock reconciliation between orders and the catalog
//!
//! `reserve` is all-or-nothing: every line is taken with one atomic
//! conditional decrement, and if line N fails the lines 1..N-1 are given
//! back before the error is returned. `restore` is best effort because a
//! cancellation must go through even if a product was removed meanwhile.

use super::model::OrderItem;
use crate::catalog::{CatalogService, StockUpdate};
use crate::core::error::{StoreError, StoreResult};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Lines given back by [`StockReconciler::restore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct StockReconciler {
    catalog: Arc<dyn CatalogService>,
}

impl StockReconciler {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    /// Take the stock for every line or for none of them
    pub async fn reserve(&self, items: &[OrderItem]) -> StoreResult<()> {
        let mut reserved: Vec<&OrderItem> = Vec::with_capacity(items.len());

        for item in items {
            let outcome = self
                .catalog
                .try_decrement(&item.product, item.size, item.quantity)
                .await;

            match outcome {
                Ok(StockUpdate::Applied { remaining }) => {
                    debug!(
                        product_id = %item.product,
                        size = %item.size,
                        quantity = item.quantity,
                        remaining,
                        "stock reserved"
                    );
                    reserved.push(item);
                }
                Ok(refused) => {
                    self.release(&reserved).await;
                    return Err(refusal(item, refused));
                }
                Err(e) => {
                    self.release(&reserved).await;
                    return Err(StoreError::Storage(e));
                }
            }
        }

        Ok(())
    }

    /// Give back the stock of every line
    pub async fn restore(&self, items: &[OrderItem]) -> RestoreReport {
        let mut report = RestoreReport::default();

        for item in items {
            match self
                .catalog
                .increment(&item.product, item.size, item.quantity)
                .await
            {
                Ok(StockUpdate::Applied { remaining }) => {
                    debug!(product_id = %item.product, size = %item.size, remaining, "stock restored");
                    report.restored += 1;
                }
                Ok(other) => {
                    warn!(
                        product_id = %item.product,
                        size = %item.size,
                        quantity = item.quantity,
                        outcome = ?other,
                        "cannot restore stock, line skipped"
                    );
                    report.skipped += 1;
                }
                Err(e) => {
                    error!(
                        product_id = %item.product,
                        size = %item.size,
                        quantity = item.quantity,
                        error = %e,
                        "stock restore failed, manual reconciliation needed"
                    );
                    report.skipped += 1;
                }
            }
        }

        report
    }

    /// Compensate lines already reserved, newest first
    async fn release(&self, reserved: &[&OrderItem]) {
        for item in reserved.iter().rev() {
            match self
                .catalog
                .increment(&item.product, item.size, item.quantity)
                .await
            {
                Ok(StockUpdate::Applied { .. }) => {
                    warn!(product_id = %item.product, size = %item.size, quantity = item.quantity, "reservation rolled back");
                }
                Ok(other) => {
                    error!(product_id = %item.product, size = %item.size, outcome = ?other, "rollback skipped");
                }
                Err(e) => {
                    error!(product_id = %item.product, size = %item.size, error = %e, "rollback failed");
                }
            }
        }
    }
}

fn refusal(item: &OrderItem, outcome: StockUpdate) -> StoreError {
    let available = match outcome {
        StockUpdate::Insufficient { available } => available,
        StockUpdate::UnknownProduct => {
            return StoreError::NotFound {
                entity: "Product",
                id: item.product,
            };
        }
        _ => 0,
    };

    StoreError::OutOfStock {
        product_id: item.product,
        product_name: item.name.clone(),
        size: item.size,
        requested: item.quantity,
        available,
    }
}
