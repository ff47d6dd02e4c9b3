//! In-memory catalog and order ledger for testing and development

use crate::catalog::{CatalogService, PatchOutcome, Product, ProductPatch, Size, StockUpdate};
use crate::orders::{Order, OrderLedger, PaymentUpdate, StatusChange};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory product catalog
///
/// Stock changes take the write lock for both the check and the update.
#[derive(Clone)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            products: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn create(&self, product: Product) -> Result<Product> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if products.contains_key(&product.id) {
            return Err(anyhow!("Product {} already exists", product.id));
        }
        products.insert(product.id, product.clone());

        Ok(product)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Product>> {
        let products = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(products.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let products = self
            .products
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(products.values().cloned().collect())
    }

    async fn update(&self, id: &Uuid, patch: ProductPatch) -> Result<PatchOutcome> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(current) = products.get(id) else {
            return Ok(PatchOutcome::NotFound);
        };

        let mut updated = current.clone();
        updated.apply_patch(patch);
        if let Err(err) = updated.check_invariants() {
            return Ok(PatchOutcome::Rejected(err));
        }

        products.insert(*id, updated.clone());
        Ok(PatchOutcome::Updated(updated))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(products.remove(id).is_some())
    }

    async fn try_decrement(&self, id: &Uuid, size: Size, quantity: u32) -> Result<StockUpdate> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(product) = products.get_mut(id) else {
            return Ok(StockUpdate::UnknownProduct);
        };
        let Some(stock) = product.sizes.iter_mut().find(|s| s.size == size) else {
            return Ok(StockUpdate::UnknownSize);
        };
        if stock.quantity < quantity {
            return Ok(StockUpdate::Insufficient {
                available: stock.quantity,
            });
        }

        stock.quantity -= quantity;
        let remaining = stock.quantity;
        product.sold += u64::from(quantity);

        Ok(StockUpdate::Applied { remaining })
    }

    async fn increment(&self, id: &Uuid, size: Size, quantity: u32) -> Result<StockUpdate> {
        let mut products = self
            .products
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(product) = products.get_mut(id) else {
            return Ok(StockUpdate::UnknownProduct);
        };
        let Some(stock) = product.sizes.iter_mut().find(|s| s.size == size) else {
            return Ok(StockUpdate::UnknownSize);
        };

        stock.quantity = stock.quantity.saturating_add(quantity);
        let remaining = stock.quantity;
        product.sold = product.sold.saturating_sub(u64::from(quantity));

        Ok(StockUpdate::Applied { remaining })
    }
}

#[derive(Default)]
struct LedgerState {
    orders: HashMap<Uuid, Order>,
    /// Insertion order, oldest first
    sequence: Vec<Uuid>,
}

impl LedgerState {
    fn newest_first(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .sequence
            .iter()
            .rev()
            .filter_map(|id| self.orders.get(id))
            .filter(|order| keep(order))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

/// In-memory order ledger
#[derive(Clone, Default)]
pub struct InMemoryOrderLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryOrderLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderLedger for InMemoryOrderLedger {
    async fn append(&self, order: Order) -> Result<Order> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if state.orders.contains_key(&order.id) {
            return Err(anyhow!("Order {} already exists", order.id));
        }
        state.sequence.push(order.id);
        state.orders.insert(order.id, order.clone());

        Ok(order)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Order>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(state.orders.get(id).cloned())
    }

    async fn transition(&self, id: &Uuid, change: &StatusChange) -> Result<Option<Order>> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(order) = state.orders.get_mut(id) else {
            return Ok(None);
        };
        if order.order_status != change.from {
            return Ok(None);
        }
        change.apply(order);

        Ok(Some(order.clone()))
    }

    async fn record_payment(&self, id: &Uuid, payment: &PaymentUpdate) -> Result<Option<Order>> {
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(state.orders.get_mut(id).map(|order| {
            payment.apply(order);
            order.clone()
        }))
    }

    async fn list_by_user(&self, user: &Uuid) -> Result<Vec<Order>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(state.newest_first(|order| &order.user == user))
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(state.newest_first(|_| true))
    }
}
