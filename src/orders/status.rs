//! Order status and its transition table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an order is in its lifecycle
///
/// The main path is `processing → shipped → out_for_delivery → delivered`.
/// `cancelled`, `returned` and `refunded` form a side branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    Returned,
    Refunded,
}

/// Customer-facing description of a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub message: &'static str,
    pub description: &'static str,
    pub progress: u8,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// Statuses reachable from `self` in one step
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Processing => &[Shipped, OutForDelivery, Delivered, Cancelled],
            Shipped => &[OutForDelivery, Delivered, Returned],
            OutForDelivery => &[Delivered, Returned],
            Delivered => &[Returned, Refunded],
            Returned => &[Refunded],
            Cancelled | Refunded => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Once an order ships it can no longer be cancelled
    pub fn is_cancellable(&self) -> bool {
        self.can_transition_to(OrderStatus::Cancelled)
    }

    /// No further transitions exist
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn info(&self) -> StatusInfo {
        match self {
            OrderStatus::Processing => StatusInfo {
                message: "Your order is being processed",
                description: "We have received your order and are preparing it for shipment.",
                progress: 25,
            },
            OrderStatus::Shipped => StatusInfo {
                message: "Your order has been shipped",
                description: "Your package is on its way to you.",
                progress: 50,
            },
            OrderStatus::OutForDelivery => StatusInfo {
                message: "Your order is out for delivery",
                description: "The courier is on the way to deliver your package.",
                progress: 75,
            },
            OrderStatus::Delivered => StatusInfo {
                message: "Your order has been delivered",
                description: "Your package has been successfully delivered.",
                progress: 100,
            },
            OrderStatus::Cancelled => StatusInfo {
                message: "Your order has been cancelled",
                description: "This order has been cancelled as per your request.",
                progress: 0,
            },
            OrderStatus::Returned => StatusInfo {
                message: "Your order has been returned",
                description: "The returned items have been received and processed.",
                progress: 100,
            },
            OrderStatus::Refunded => StatusInfo {
                message: "Your order has been refunded",
                description: "The refund for your order has been processed.",
                progress: 100,
            },
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
