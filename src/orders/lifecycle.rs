//! Order lifecycle: creation, payment, delivery, status moves, cancellation

use super::ledger::{OrderLedger, PaymentUpdate, StatusChange};
use super::model::{
    CreateOrderRequest, Order, OrderItem, PaymentInfo, PaymentResult, PaymentStatus,
};
use super::reconciler::StockReconciler;
use super::status::OrderStatus;
use crate::catalog::CatalogService;
use crate::core::auth::{AuthContext, AuthPolicy};
use crate::core::error::{StoreError, StoreResult};
use crate::core::events::{DomainEvent, EventBus, OrderEvent};
use crate::core::money::PricingPolicy;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

pub struct OrderLifecycle {
    ledger: Arc<dyn OrderLedger>,
    catalog: Arc<dyn CatalogService>,
    reconciler: StockReconciler,
    pricing: PricingPolicy,
    events: EventBus,
}

impl OrderLifecycle {
    pub fn new(
        ledger: Arc<dyn OrderLedger>,
        catalog: Arc<dyn CatalogService>,
        pricing: PricingPolicy,
        events: EventBus,
    ) -> Self {
        Self {
            reconciler: StockReconciler::new(catalog.clone()),
            ledger,
            catalog,
            pricing,
            events,
        }
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Place an order for the caller
    ///
    /// Line snapshots and prices come from the catalog. Stock is reserved
    /// before the order is appended and given back if the append fails.
    pub async fn create_order(
        &self,
        caller: &AuthContext,
        request: CreateOrderRequest,
    ) -> StoreResult<Order> {
        let user = caller
            .user_id()
            .ok_or_else(|| StoreError::unauthorized("Login required to place an order"))?;

        if request.order_items.is_empty() {
            return Err(StoreError::validation("No order items"));
        }
        request.validate()?;

        let mut order_items = Vec::with_capacity(request.order_items.len());
        for line in &request.order_items {
            let product = self
                .catalog
                .get(&line.product)
                .await?
                .filter(|p| p.is_active)
                .ok_or(StoreError::NotFound {
                    entity: "Product",
                    id: line.product,
                })?;

            order_items.push(OrderItem {
                product: product.id,
                name: product.name.clone(),
                price: product.final_price(),
                quantity: line.quantity,
                size: line.size,
                color: line.color.clone(),
                image: product.main_image().map(str::to_string),
            });
        }

        let prices = self
            .pricing
            .breakdown(order_items.iter().map(|item| (item.price, item.quantity)));

        self.reconciler.reserve(&order_items).await?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user,
            order_items,
            shipping_info: request.shipping_info,
            payment_info: PaymentInfo {
                id: request.payment_info.id,
                status: PaymentStatus::Completed,
                payment_method: request.payment_info.payment_method,
                amount_paid: prices.total_price,
                paid_at: now,
                update_time: None,
                email_address: None,
            },
            items_price: prices.items_price,
            tax_price: prices.tax_price,
            shipping_price: prices.shipping_price,
            total_price: prices.total_price,
            order_status: OrderStatus::Processing,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        };

        let order = match self.ledger.append(order.clone()).await {
            Ok(order) => order,
            Err(e) => {
                error!(order_id = %order.id, error = %e, "order append failed, releasing stock");
                self.reconciler.restore(&order.order_items).await;
                return Err(StoreError::Storage(e));
            }
        };

        info!(
            order_id = %order.id,
            user_id = %order.user,
            items = order.order_items.len(),
            total = order.total_price,
            "order created"
        );
        self.events.publish(DomainEvent::Order(OrderEvent::Created {
            order_id: order.id,
            user_id: order.user,
            total_price: order.total_price,
        }));

        Ok(order)
    }

    /// Fetch an order the caller owns, or any order for an admin
    pub async fn get_order(&self, caller: &AuthContext, id: &Uuid) -> StoreResult<Order> {
        let order = self.load(id).await?;
        AuthPolicy::OwnerOrAdmin(order.user).require(caller, "view this order")?;
        Ok(order)
    }

    /// Record a processor payment result
    ///
    /// Only payment fields are written, so a concurrent status move is
    /// never overwritten.
    pub async fn mark_paid(
        &self,
        caller: &AuthContext,
        id: &Uuid,
        payment: PaymentResult,
    ) -> StoreResult<Order> {
        let order = self.load(id).await?;
        AuthPolicy::OwnerOrAdmin(order.user).require(caller, "pay for this order")?;

        if order.is_paid {
            warn!(order_id = %order.id, "order paid again");
        }

        let update = PaymentUpdate::from_result(payment);
        let order = self
            .ledger
            .record_payment(id, &update)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "Order",
                id: *id,
            })?;
        info!(order_id = %order.id, status = ?order.payment_info.status, "order paid");
        self.events
            .publish(DomainEvent::Order(OrderEvent::Paid { order_id: order.id }));

        Ok(order)
    }

    pub async fn mark_delivered(&self, caller: &AuthContext, id: &Uuid) -> StoreResult<Order> {
        AuthPolicy::AdminOnly.require(caller, "mark orders as delivered")?;

        let order = self.load(id).await?;
        let (_, order) = self.advance(order, OrderStatus::Delivered).await?;
        info!(order_id = %order.id, "order delivered");
        self.events
            .publish(DomainEvent::Order(OrderEvent::Delivered { order_id: order.id }));

        Ok(order)
    }

    /// Orders placed by the caller, newest first
    pub async fn list_mine(&self, caller: &AuthContext) -> StoreResult<Vec<Order>> {
        let user = caller
            .user_id()
            .ok_or_else(|| StoreError::unauthorized("Login required"))?;
        let orders = self.ledger.list_by_user(&user).await?;
        debug!(user_id = %user, count = orders.len(), "listed own orders");
        Ok(orders)
    }

    /// Every order, newest first
    pub async fn list_all(&self, caller: &AuthContext) -> StoreResult<Vec<Order>> {
        AuthPolicy::AdminOnly.require(caller, "list all orders")?;
        Ok(self.ledger.list_all().await?)
    }

    /// Cancel an order that has not shipped yet
    ///
    /// Stock is returned only when the payment was settled, and only by the
    /// caller whose status write took effect.
    pub async fn cancel_order(&self, caller: &AuthContext, id: &Uuid) -> StoreResult<Order> {
        let order = self.load(id).await?;
        AuthPolicy::OwnerOrAdmin(order.user).require(caller, "cancel this order")?;

        let (_, order) = self.advance(order, OrderStatus::Cancelled).await?;

        let restocked = order.payment_settled();
        if restocked {
            let report = self.reconciler.restore(&order.order_items).await;
            debug!(order_id = %order.id, restored = report.restored, skipped = report.skipped, "stock returned");
        }

        info!(order_id = %order.id, restocked, "order cancelled");
        self.events.publish(DomainEvent::Order(OrderEvent::Cancelled {
            order_id: order.id,
            restocked,
        }));

        Ok(order)
    }

    /// Apply any move the transition table allows
    ///
    /// Delivery and cancellation keep their side effects when reached here.
    pub async fn update_status(
        &self,
        caller: &AuthContext,
        id: &Uuid,
        status: OrderStatus,
    ) -> StoreResult<Order> {
        match status {
            OrderStatus::Delivered => return self.mark_delivered(caller, id).await,
            OrderStatus::Cancelled => {
                AuthPolicy::AdminOnly.require(caller, "change order status")?;
                return self.cancel_order(caller, id).await;
            }
            _ => AuthPolicy::AdminOnly.require(caller, "change order status")?,
        }

        let order = self.load(id).await?;
        let (from, order) = self.advance(order, status).await?;
        info!(order_id = %order.id, %from, to = %status, "order status changed");
        self.events.publish(DomainEvent::Order(OrderEvent::StatusChanged {
            order_id: order.id,
            from,
            to: status,
        }));

        Ok(order)
    }

    /// Move `current` to `to` with a compare-and-set on its status
    ///
    /// A lost race re-reads the order and checks the table again. Statuses
    /// only move forward, so the retry ends.
    async fn advance(
        &self,
        mut current: Order,
        to: OrderStatus,
    ) -> StoreResult<(OrderStatus, Order)> {
        loop {
            let from = current.order_status;
            if !from.can_transition_to(to) {
                return Err(StoreError::InvalidTransition { from, to });
            }

            let change = StatusChange::new(from, to);
            if let Some(order) = self.ledger.transition(&current.id, &change).await? {
                return Ok((from, order));
            }

            debug!(order_id = %current.id, %from, %to, "status changed concurrently, re-reading");
            current = self.load(&current.id).await?;
        }
    }

    async fn load(&self, id: &Uuid) -> StoreResult<Order> {
        self.ledger.get(id).await?.ok_or(StoreError::NotFound {
            entity: "Order",
            id: *id,
        })
    }
}
