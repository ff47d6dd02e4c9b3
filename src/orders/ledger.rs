//! Storage contract for the order ledger

use super::model::{Order, PaymentResult, PaymentStatus};
use super::status::OrderStatus;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A status move, applied only while the stored status is still `from`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    pub fn new(from: OrderStatus, to: OrderStatus) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }

    /// Delivery timestamp this move stamps, if it delivers the order
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        (self.to == OrderStatus::Delivered).then_some(self.at)
    }

    pub fn apply(&self, order: &mut Order) {
        order.order_status = self.to;
        order.updated_at = self.at;
        if let Some(at) = self.delivered_at() {
            order.is_delivered = true;
            order.delivered_at = Some(at);
        }
    }
}

/// Payment fields recorded by `pay`; the order status is never touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUpdate {
    /// Kept from checkout when the processor reports none
    pub payment_id: Option<String>,
    pub status: PaymentStatus,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
    pub at: DateTime<Utc>,
}

impl PaymentUpdate {
    /// Processor statuses map case-insensitively; a missing one means completed
    pub fn from_result(payment: PaymentResult) -> Self {
        Self {
            payment_id: payment.id,
            status: payment
                .status
                .as_deref()
                .map(PaymentStatus::from_processor)
                .unwrap_or(PaymentStatus::Completed),
            update_time: payment.update_time,
            email_address: payment.payer.email_address,
            at: Utc::now(),
        }
    }

    pub fn apply(&self, order: &mut Order) {
        order.is_paid = true;
        order.paid_at = Some(self.at);
        if let Some(id) = &self.payment_id {
            order.payment_info.id = Some(id.clone());
        }
        order.payment_info.status = self.status.clone();
        order.payment_info.update_time = self.update_time.clone();
        order.payment_info.email_address = self.email_address.clone();
        order.payment_info.paid_at = self.at;
        order.updated_at = self.at;
    }
}

/// Append-only store of orders
///
/// Orders are inserted once and afterwards only changed field by field
/// through conditional updates; there is no delete and no whole-document
/// replace.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Append a new order
    async fn append(&self, order: Order) -> Result<Order>;

    /// Get an order by ID
    async fn get(&self, id: &Uuid) -> Result<Option<Order>>;

    /// Apply `change` if the stored status still equals `change.from`
    ///
    /// Returns the updated order, or `None` when the order is unknown or
    /// its status already moved. Check and write are one atomic step, so
    /// of several racing callers with the same `from` exactly one wins.
    async fn transition(&self, id: &Uuid, change: &StatusChange) -> Result<Option<Order>>;

    /// Record payment fields, returning `None` for an unknown order
    async fn record_payment(&self, id: &Uuid, payment: &PaymentUpdate) -> Result<Option<Order>>;

    /// Orders placed by `user`, newest first
    async fn list_by_user(&self, user: &Uuid) -> Result<Vec<Order>>;

    /// All orders, newest first
    async fn list_all(&self) -> Result<Vec<Order>>;
}
