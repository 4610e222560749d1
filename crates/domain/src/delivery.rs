//! Delivery entity.

use chrono::{DateTime, Utc};
use common::{DeliveryId, OrderId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::{Order, OrderStatus};
use crate::value_objects::OrderNumber;

/// Errors that can occur when registering a delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The referenced order is not in transit.
    #[error("Invalid state: order {order_id} is {status}, deliveries require InTransit")]
    OrderNotInTransit {
        order_id: OrderId,
        status: OrderStatus,
    },
}

/// Delivery record, at most one per order.
///
/// References its order by id and denormalizes the order number for read
/// convenience. The "order must be in transit" invariant is enforced here in
/// the constructor, so it holds even if a caller skips the workflow's
/// pre-checks; the repository's uniqueness constraint on order id covers the
/// at-most-one half.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    id: DeliveryId,
    order_id: OrderId,
    order_number: OrderNumber,
    user_id: UserId,
    deliverer_id: UserId,
    delivered_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl Delivery {
    /// Registers a delivery for an in-transit order.
    pub fn register(order: &Order, deliverer_id: UserId) -> Result<Self, DeliveryError> {
        if order.status() != OrderStatus::InTransit {
            return Err(DeliveryError::OrderNotInTransit {
                order_id: order.id(),
                status: order.status(),
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: DeliveryId::new(),
            order_id: order.id(),
            order_number: order.order_number().clone(),
            user_id: order.user_id(),
            deliverer_id,
            delivered_at: now,
            created_at: now,
        })
    }

    /// Returns the delivery ID.
    pub fn id(&self) -> DeliveryId {
        self.id
    }

    /// Returns the delivered order's ID.
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Returns the delivered order's number.
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// Returns the order owner's user ID.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the deliverer's user ID.
    pub fn deliverer_id(&self) -> UserId {
        self.deliverer_id
    }

    /// Returns when the order was handed over.
    pub fn delivered_at(&self) -> DateTime<Utc> {
        self.delivered_at
    }

    /// Returns when the record was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{Address, Cep, Money, OrderNumber};

    fn order_in_transit() -> Order {
        let (mut order, _) = Order::create(
            OrderNumber::new("ORD-20250314-0001").unwrap(),
            "Books",
            Money::from_cents(10000),
            Address::new(
                "Avenida Paulista",
                "1578",
                None,
                "Bela Vista",
                "São Paulo",
                "SP",
                Cep::new("01310-100").unwrap(),
            )
            .unwrap(),
            UserId::new(),
        )
        .unwrap();
        order.confirm().unwrap();
        order.start_delivery().unwrap();
        order
    }

    #[test]
    fn test_register_for_in_transit_order() {
        let order = order_in_transit();
        let deliverer_id = UserId::new();

        let delivery = Delivery::register(&order, deliverer_id).unwrap();

        assert_eq!(delivery.order_id(), order.id());
        assert_eq!(delivery.order_number(), order.order_number());
        assert_eq!(delivery.user_id(), order.user_id());
        assert_eq!(delivery.deliverer_id(), deliverer_id);
    }

    #[test]
    fn test_register_fails_unless_in_transit() {
        let (mut order, _) = Order::create(
            OrderNumber::new("ORD-20250314-0002").unwrap(),
            "Books",
            Money::from_cents(10000),
            Address::new(
                "Rua A",
                "1",
                None,
                "Centro",
                "Recife",
                "PE",
                Cep::new("50010-000").unwrap(),
            )
            .unwrap(),
            UserId::new(),
        )
        .unwrap();

        // Pending
        let result = Delivery::register(&order, UserId::new());
        assert!(matches!(
            result,
            Err(DeliveryError::OrderNotInTransit {
                status: OrderStatus::Pending,
                ..
            })
        ));

        // Confirmed
        order.confirm().unwrap();
        assert!(Delivery::register(&order, UserId::new()).is_err());

        // Delivered
        order.start_delivery().unwrap();
        order
            .mark_delivered(DeliveryId::new(), Utc::now())
            .unwrap();
        assert!(Delivery::register(&order, UserId::new()).is_err());
    }

    #[test]
    fn test_serialization() {
        let order = order_in_transit();
        let delivery = Delivery::register(&order, UserId::new()).unwrap();

        let json = serde_json::to_string(&delivery).unwrap();
        let deserialized: Delivery = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.id(), delivery.id());
        assert_eq!(deserialized.order_id(), delivery.order_id());
    }
}
