//! Catalog operations with role checks and event publication

use super::model::{Product, ProductFilter, ProductInput, ProductPatch, ProductView};
use super::service::{CatalogService, PatchOutcome};
use crate::core::auth::{AuthContext, AuthPolicy};
use crate::core::error::{StoreError, StoreResult};
use crate::core::events::{DomainEvent, EventBus, ProductEvent};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Admin-facing and public product operations
#[derive(Clone)]
pub struct ProductCatalog {
    service: Arc<dyn CatalogService>,
    events: EventBus,
}

impl ProductCatalog {
    pub fn new(service: Arc<dyn CatalogService>, events: EventBus) -> Self {
        Self { service, events }
    }

    /// List products matching `filter`
    ///
    /// Inactive products are only visible to admins.
    pub async fn list_products(
        &self,
        caller: &AuthContext,
        mut filter: ProductFilter,
    ) -> StoreResult<Vec<ProductView>> {
        if !caller.is_admin() {
            filter.include_inactive = false;
        }

        let mut products: Vec<Product> = self
            .service
            .list()
            .await?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!(count = products.len(), "listed products");
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    /// Fetch one product; inactive ones are only visible to admins
    pub async fn get_product(&self, caller: &AuthContext, id: &Uuid) -> StoreResult<ProductView> {
        self.service
            .get(id)
            .await?
            .filter(|p| p.is_active || caller.is_admin())
            .map(ProductView::from)
            .ok_or(StoreError::NotFound {
                entity: "Product",
                id: *id,
            })
    }

    pub async fn create_product(
        &self,
        caller: &AuthContext,
        input: ProductInput,
    ) -> StoreResult<ProductView> {
        AuthPolicy::AdminOnly.require(caller, "create products")?;

        let product = self.service.create(Product::from_input(input)).await?;
        info!(product_id = %product.id, name = %product.name, "product created");
        self.events.publish(DomainEvent::Product(ProductEvent::Created {
            product_id: product.id,
        }));

        Ok(product.into())
    }

    pub async fn update_product(
        &self,
        caller: &AuthContext,
        id: &Uuid,
        patch: ProductPatch,
    ) -> StoreResult<ProductView> {
        AuthPolicy::AdminOnly.require(caller, "update products")?;

        match self.service.update(id, patch).await? {
            PatchOutcome::Updated(product) => {
                info!(product_id = %product.id, "product updated");
                self.events.publish(DomainEvent::Product(ProductEvent::Updated {
                    product_id: product.id,
                }));
                Ok(product.into())
            }
            PatchOutcome::NotFound => Err(StoreError::NotFound {
                entity: "Product",
                id: *id,
            }),
            PatchOutcome::Rejected(err) => Err(StoreError::validation(
                err.message
                    .map(|m| m.into_owned())
                    .unwrap_or_else(|| err.code.into_owned()),
            )),
        }
    }

    pub async fn delete_product(&self, caller: &AuthContext, id: &Uuid) -> StoreResult<()> {
        AuthPolicy::AdminOnly.require(caller, "delete products")?;

        if !self.service.delete(id).await? {
            return Err(StoreError::NotFound {
                entity: "Product",
                id: *id,
            });
        }

        info!(product_id = %id, "product deleted");
        self.events
            .publish(DomainEvent::Product(ProductEvent::Deleted { product_id: *id }));
        Ok(())
    }
}
