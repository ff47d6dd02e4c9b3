//! Domain event bus for order and catalog notifications
//!
//! The lifecycle controller and the catalog handlers publish events after a
//! mutation has been committed. Consumers (mailers, analytics, cache
//! invalidation) subscribe without the controller knowing about them.
//!
//! ```text
//! OrderLifecycle ──┐
//!                  ├──▶ EventBus::publish() ──▶ broadcast channel ──▶ subscribers
//! Catalog handlers ┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let bus = EventBus::new(config.events.capacity);
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DomainEvent::Order(OrderEvent::Paid { order_id }));
//!
//! while let Ok(envelope) = rx.recv().await {
//!     tracing::info!(kind = envelope.event.event_kind(), "event");
//! }
//! ```

use crate::orders::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted by the order lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OrderEvent {
    /// An order was placed and its stock reserved
    Created {
        order_id: Uuid,
        user_id: Uuid,
        total_price: f64,
    },
    /// Payment was recorded
    Paid { order_id: Uuid },
    /// The order reached the customer
    Delivered { order_id: Uuid },
    /// The order was cancelled; `restocked` tells whether stock came back
    Cancelled { order_id: Uuid, restocked: bool },
    /// An admin moved the order along the lifecycle
    StatusChanged {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Events emitted by catalog mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid },
    Updated { product_id: Uuid },
    Deleted { product_id: Uuid },
}

/// Top-level event wrapping order and product events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    Order(OrderEvent),
    Product(ProductEvent),
}

impl DomainEvent {
    /// Get the kind of the event ("order" or "product")
    pub fn event_kind(&self) -> &str {
        match self {
            DomainEvent::Order(_) => "order",
            DomainEvent::Product(_) => "product",
        }
    }

    /// Get the id of the entity this event relates to
    pub fn entity_id(&self) -> Uuid {
        match self {
            DomainEvent::Order(e) => match e {
                OrderEvent::Created { order_id, .. }
                | OrderEvent::Paid { order_id }
                | OrderEvent::Delivered { order_id }
                | OrderEvent::Cancelled { order_id, .. }
                | OrderEvent::StatusChanged { order_id, .. } => *order_id,
            },
            DomainEvent::Product(e) => match e {
                ProductEvent::Created { product_id }
                | ProductEvent::Updated { product_id }
                | ProductEvent::Deleted { product_id } => *product_id,
            },
        }
    }
}

/// A published event stamped with an id and publication time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub published_at: DateTime<Utc>,
    pub event: DomainEvent,
}

impl EventEnvelope {
    pub fn new(event: DomainEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            published_at: Utc::now(),
            event,
        }
    }
}

/// Broadcast channel shared by every publisher; clones publish into the same channel
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Subscribers more than `capacity` events behind receive `Lagged`
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns how many subscribers got the event; zero drops it
    pub fn publish(&self, event: DomainEvent) -> usize {
        tracing::trace!(kind = event.event_kind(), entity_id = %event.entity_id(), "publishing event");
        let envelope = EventEnvelope::new(event);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
