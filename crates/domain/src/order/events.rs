//! Order domain events.
//!
//! Events are ephemeral: an aggregate operation returns the event it
//! emitted, the orchestration layer forwards it once (notification row +
//! real-time push), and nothing stores it afterwards.

use chrono::{DateTime, Utc};
use common::{DeliveryId, OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, OrderNumber};

use super::OrderStatus;

/// Events emitted by the order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was created.
    OrderCreated(OrderCreatedData),

    /// Order moved to a new status.
    OrderStatusChanged(OrderStatusChangedData),

    /// Order reached its destination.
    ///
    /// Emitted in place of a plain status change because delivery completion
    /// carries the delivery reference.
    OrderDelivered(OrderDeliveredData),
}

impl OrderEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "OrderCreated",
            OrderEvent::OrderStatusChanged(_) => "OrderStatusChanged",
            OrderEvent::OrderDelivered(_) => "OrderDelivered",
        }
    }

    /// Returns the id of the order this event belongs to.
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::OrderCreated(data) => data.order_id,
            OrderEvent::OrderStatusChanged(data) => data.order_id,
            OrderEvent::OrderDelivered(data) => data.order_id,
        }
    }

    /// Returns the order number of the order this event belongs to.
    pub fn order_number(&self) -> &OrderNumber {
        match self {
            OrderEvent::OrderCreated(data) => &data.order_number,
            OrderEvent::OrderStatusChanged(data) => &data.order_number,
            OrderEvent::OrderDelivered(data) => &data.order_number,
        }
    }

    /// Returns the id of the user who owns the order.
    pub fn user_id(&self) -> UserId {
        match self {
            OrderEvent::OrderCreated(data) => data.user_id,
            OrderEvent::OrderStatusChanged(data) => data.user_id,
            OrderEvent::OrderDelivered(data) => data.user_id,
        }
    }

    /// Returns when the event occurred.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderCreated(data) => data.occurred_at,
            OrderEvent::OrderStatusChanged(data) => data.occurred_at,
            OrderEvent::OrderDelivered(data) => data.occurred_at,
        }
    }
}

/// Data for OrderCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedData {
    /// The unique order ID.
    pub order_id: OrderId,

    /// The human-facing order number.
    pub order_number: OrderNumber,

    /// The user who owns the order.
    pub user_id: UserId,

    /// The order's monetary value.
    pub value: Money,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Data for OrderStatusChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChangedData {
    /// The unique order ID.
    pub order_id: OrderId,

    /// The human-facing order number.
    pub order_number: OrderNumber,

    /// The user who owns the order.
    pub user_id: UserId,

    /// Status before the transition.
    pub old_status: OrderStatus,

    /// Status after the transition.
    pub new_status: OrderStatus,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Data for OrderDelivered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDeliveredData {
    /// The unique order ID.
    pub order_id: OrderId,

    /// The human-facing order number.
    pub order_number: OrderNumber,

    /// The user who owns the order.
    pub user_id: UserId,

    /// The delivery record registered for the order.
    pub delivery_id: DeliveryId,

    /// When the deliverer handed the order over.
    pub delivered_at: DateTime<Utc>,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl OrderEvent {
    /// Creates an OrderCreated event.
    pub fn order_created(
        order_id: OrderId,
        order_number: OrderNumber,
        user_id: UserId,
        value: Money,
    ) -> Self {
        OrderEvent::OrderCreated(OrderCreatedData {
            order_id,
            order_number,
            user_id,
            value,
            occurred_at: Utc::now(),
        })
    }

    /// Creates an OrderStatusChanged event.
    pub fn status_changed(
        order_id: OrderId,
        order_number: OrderNumber,
        user_id: UserId,
        old_status: OrderStatus,
        new_status: OrderStatus,
    ) -> Self {
        OrderEvent::OrderStatusChanged(OrderStatusChangedData {
            order_id,
            order_number,
            user_id,
            old_status,
            new_status,
            occurred_at: Utc::now(),
        })
    }

    /// Creates an OrderDelivered event.
    pub fn delivered(
        order_id: OrderId,
        order_number: OrderNumber,
        user_id: UserId,
        delivery_id: DeliveryId,
        delivered_at: DateTime<Utc>,
    ) -> Self {
        OrderEvent::OrderDelivered(OrderDeliveredData {
            order_id,
            order_number,
            user_id,
            delivery_id,
            delivered_at,
            occurred_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number() -> OrderNumber {
        OrderNumber::new("ORD-20250314-0001").unwrap()
    }

    #[test]
    fn test_event_type() {
        let event = OrderEvent::order_created(
            OrderId::new(),
            number(),
            UserId::new(),
            Money::from_cents(10000),
        );
        assert_eq!(event.event_type(), "OrderCreated");

        let event = OrderEvent::status_changed(
            OrderId::new(),
            number(),
            UserId::new(),
            OrderStatus::Pending,
            OrderStatus::Confirmed,
        );
        assert_eq!(event.event_type(), "OrderStatusChanged");

        let event = OrderEvent::delivered(
            OrderId::new(),
            number(),
            UserId::new(),
            DeliveryId::new(),
            Utc::now(),
        );
        assert_eq!(event.event_type(), "OrderDelivered");
    }

    #[test]
    fn test_event_accessors() {
        let order_id = OrderId::new();
        let user_id = UserId::new();
        let event = OrderEvent::status_changed(
            order_id,
            number(),
            user_id,
            OrderStatus::Confirmed,
            OrderStatus::InTransit,
        );

        assert_eq!(event.order_id(), order_id);
        assert_eq!(event.user_id(), user_id);
        assert_eq!(event.order_number().as_str(), "ORD-20250314-0001");
    }

    #[test]
    fn test_event_serialization() {
        let order_id = OrderId::new();
        let user_id = UserId::new();
        let event =
            OrderEvent::order_created(order_id, number(), user_id, Money::from_cents(12345));

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("OrderCreated"));

        let deserialized: OrderEvent = serde_json::from_str(&json).unwrap();
        if let OrderEvent::OrderCreated(data) = deserialized {
            assert_eq!(data.order_id, order_id);
            assert_eq!(data.user_id, user_id);
            assert_eq!(data.value.cents(), 12345);
        } else {
            panic!("Expected OrderCreated event");
        }
    }

    #[test]
    fn test_delivered_event_carries_delivery_reference() {
        let delivery_id = DeliveryId::new();
        let delivered_at = Utc::now();
        let event = OrderEvent::delivered(
            OrderId::new(),
            number(),
            UserId::new(),
            delivery_id,
            delivered_at,
        );

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: OrderEvent = serde_json::from_str(&json).unwrap();

        if let OrderEvent::OrderDelivered(data) = deserialized {
            assert_eq!(data.delivery_id, delivery_id);
            assert_eq!(data.delivered_at, delivered_at);
        } else {
            panic!("Expected OrderDelivered event");
        }
    }
}
