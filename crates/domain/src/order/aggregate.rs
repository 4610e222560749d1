//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{DeliveryId, OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::value_objects::{Address, Money, OrderNumber};

use super::{OrderError, OrderEvent, OrderStatus};

/// Order aggregate root.
///
/// Owns the order's status and validates every transition against the
/// lifecycle edge set. Mutating operations update the aggregate in place and
/// return the event they emitted; they never call out to other aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: OrderId,

    /// Human-facing order number, immutable after creation.
    order_number: OrderNumber,

    /// Free-text description of the order contents.
    description: String,

    /// Monetary value, immutable after creation.
    value: Money,

    /// Delivery address.
    address: Address,

    /// User who owns the order.
    user_id: UserId,

    /// Current lifecycle status.
    status: OrderStatus,

    /// When the order was created.
    created_at: DateTime<Utc>,

    /// When the order was last mutated.
    updated_at: DateTime<Utc>,
}

// Query methods
impl Order {
    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the order number.
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the monetary value.
    pub fn value(&self) -> Money {
        self.value
    }

    /// Returns the delivery address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Returns the owning user's ID.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns when the order was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the order was last updated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the status a read should report given whether a Delivery row
    /// exists for this order.
    ///
    /// A Delivery is only ever created for an in-transit order, in the same
    /// operation that moves it to Delivered. If the status write was lost
    /// the Delivery row wins.
    pub fn effective_status(&self, has_delivery: bool) -> OrderStatus {
        if has_delivery {
            OrderStatus::Delivered
        } else {
            self.status
        }
    }
}

// Command methods (mutate in place, return the emitted event)
impl Order {
    /// Creates a new order in Pending status.
    pub fn create(
        order_number: OrderNumber,
        description: impl Into<String>,
        value: Money,
        address: Address,
        user_id: UserId,
    ) -> Result<(Order, OrderEvent), ValidationError> {
        let description = description.into();

        if description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if !value.is_positive() {
            return Err(ValidationError::NonPositiveValue {
                cents: value.cents(),
            });
        }

        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            order_number: order_number.clone(),
            description,
            value,
            address,
            user_id,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let event = OrderEvent::order_created(order.id, order_number, user_id, value);

        Ok((order, event))
    }

    /// Confirms a pending order.
    pub fn confirm(&mut self) -> Result<OrderEvent, OrderError> {
        if !self.status.can_confirm() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Confirmed,
            });
        }

        Ok(self.change_status(OrderStatus::Confirmed))
    }

    /// Moves a confirmed order into transit.
    pub fn start_delivery(&mut self) -> Result<OrderEvent, OrderError> {
        if !self.status.can_start_delivery() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::InTransit,
            });
        }

        Ok(self.change_status(OrderStatus::InTransit))
    }

    /// Cancels a pending order.
    pub fn cancel(&mut self) -> Result<OrderEvent, OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Cancelled,
            });
        }

        Ok(self.change_status(OrderStatus::Cancelled))
    }

    /// Marks an in-transit order as delivered.
    ///
    /// Takes the registered Delivery's reference so the emitted event carries
    /// it; emits OrderDelivered instead of a plain status change.
    pub fn mark_delivered(
        &mut self,
        delivery_id: DeliveryId,
        delivered_at: DateTime<Utc>,
    ) -> Result<OrderEvent, OrderError> {
        if !self.status.can_mark_delivered() {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Delivered,
            });
        }

        self.status = OrderStatus::Delivered;
        self.updated_at = Utc::now();

        Ok(OrderEvent::delivered(
            self.id,
            self.order_number.clone(),
            self.user_id,
            delivery_id,
            delivered_at,
        ))
    }

    fn change_status(&mut self, new_status: OrderStatus) -> OrderEvent {
        let old_status = self.status;
        self.status = new_status;
        self.updated_at = Utc::now();

        OrderEvent::status_changed(
            self.id,
            self.order_number.clone(),
            self.user_id,
            old_status,
            new_status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Cep;

    fn sample_address() -> Address {
        Address::new(
            "Avenida Paulista",
            "1578",
            None,
            "Bela Vista",
            "São Paulo",
            "SP",
            Cep::new("01310-100").unwrap(),
        )
        .unwrap()
    }

    fn sample_number() -> OrderNumber {
        OrderNumber::new("ORD-20250314-0001").unwrap()
    }

    fn create_order() -> Order {
        let (order, _) = Order::create(
            sample_number(),
            "Two boxes of books",
            Money::from_cents(10000),
            sample_address(),
            UserId::new(),
        )
        .unwrap();
        order
    }

    #[test]
    fn test_create_order_starts_pending() {
        let user_id = UserId::new();
        let (order, event) = Order::create(
            sample_number(),
            "Two boxes of books",
            Money::from_cents(10000),
            sample_address(),
            user_id,
        )
        .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.user_id(), user_id);
        assert_eq!(order.value().cents(), 10000);
        assert_eq!(order.created_at(), order.updated_at());

        assert_eq!(event.event_type(), "OrderCreated");
        assert_eq!(event.order_id(), order.id());
        if let OrderEvent::OrderCreated(data) = event {
            assert_eq!(data.value.cents(), 10000);
            assert_eq!(data.user_id, user_id);
        } else {
            panic!("Expected OrderCreated event");
        }
    }

    #[test]
    fn test_create_order_empty_description_fails() {
        let result = Order::create(
            sample_number(),
            "   ",
            Money::from_cents(10000),
            sample_address(),
            UserId::new(),
        );
        assert!(matches!(result, Err(ValidationError::EmptyDescription)));
    }

    #[test]
    fn test_create_order_non_positive_value_fails() {
        let result = Order::create(
            sample_number(),
            "Books",
            Money::zero(),
            sample_address(),
            UserId::new(),
        );
        assert!(matches!(
            result,
            Err(ValidationError::NonPositiveValue { cents: 0 })
        ));

        let result = Order::create(
            sample_number(),
            "Books",
            Money::from_cents(-500),
            sample_address(),
            UserId::new(),
        );
        assert!(matches!(result, Err(ValidationError::NonPositiveValue { .. })));
    }

    #[test]
    fn test_confirm_pending_order() {
        let mut order = create_order();
        let event = order.confirm().unwrap();

        assert_eq!(order.status(), OrderStatus::Confirmed);
        if let OrderEvent::OrderStatusChanged(data) = event {
            assert_eq!(data.old_status, OrderStatus::Pending);
            assert_eq!(data.new_status, OrderStatus::Confirmed);
        } else {
            panic!("Expected OrderStatusChanged event");
        }
    }

    #[test]
    fn test_confirm_twice_fails() {
        let mut order = create_order();
        order.confirm().unwrap();

        let result = order.confirm();
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Confirmed,
            })
        ));
        assert_eq!(order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_start_delivery_requires_confirmed() {
        let mut order = create_order();
        let result = order.start_delivery();
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::InTransit,
            })
        ));
        assert_eq!(order.status(), OrderStatus::Pending);

        order.confirm().unwrap();
        order.start_delivery().unwrap();
        assert_eq!(order.status(), OrderStatus::InTransit);
    }

    #[test]
    fn test_cancel_pending_order() {
        let mut order = create_order();
        let event = order.cancel().unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.is_terminal());
        if let OrderEvent::OrderStatusChanged(data) = event {
            assert_eq!(data.new_status, OrderStatus::Cancelled);
        } else {
            panic!("Expected OrderStatusChanged event");
        }
    }

    #[test]
    fn test_cannot_cancel_after_confirmation() {
        let mut order = create_order();
        order.confirm().unwrap();

        let result = order.cancel();
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Cancelled,
            })
        ));
        assert_eq!(order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_mark_delivered_emits_delivered_event() {
        let mut order = create_order();
        order.confirm().unwrap();
        order.start_delivery().unwrap();

        let delivery_id = DeliveryId::new();
        let delivered_at = Utc::now();
        let event = order.mark_delivered(delivery_id, delivered_at).unwrap();

        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.is_terminal());
        if let OrderEvent::OrderDelivered(data) = event {
            assert_eq!(data.delivery_id, delivery_id);
            assert_eq!(data.delivered_at, delivered_at);
        } else {
            panic!("Expected OrderDelivered event");
        }
    }

    #[test]
    fn test_mark_delivered_requires_in_transit() {
        let mut order = create_order();
        let result = order.mark_delivered(DeliveryId::new(), Utc::now());
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
            })
        ));

        order.confirm().unwrap();
        let result = order.mark_delivered(DeliveryId::new(), Utc::now());
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_terminal_statuses_reject_everything() {
        let mut delivered = create_order();
        delivered.confirm().unwrap();
        delivered.start_delivery().unwrap();
        delivered.mark_delivered(DeliveryId::new(), Utc::now()).unwrap();

        assert!(delivered.confirm().is_err());
        assert!(delivered.start_delivery().is_err());
        assert!(delivered.cancel().is_err());
        assert!(delivered.mark_delivered(DeliveryId::new(), Utc::now()).is_err());

        let mut cancelled = create_order();
        cancelled.cancel().unwrap();

        assert!(cancelled.confirm().is_err());
        assert!(cancelled.start_delivery().is_err());
        assert!(cancelled.cancel().is_err());
        assert!(cancelled.mark_delivered(DeliveryId::new(), Utc::now()).is_err());
    }

    #[test]
    fn test_full_order_lifecycle() {
        let mut order = create_order();

        order.confirm().unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);

        order.start_delivery().unwrap();
        assert_eq!(order.status(), OrderStatus::InTransit);

        order.mark_delivered(DeliveryId::new(), Utc::now()).unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.is_terminal());
    }

    #[test]
    fn test_effective_status_prefers_delivery_existence() {
        let mut order = create_order();
        order.confirm().unwrap();
        order.start_delivery().unwrap();

        // Status write lost after the delivery row was persisted.
        assert_eq!(order.effective_status(true), OrderStatus::Delivered);
        assert_eq!(order.effective_status(false), OrderStatus::InTransit);
    }

    #[test]
    fn test_serialization() {
        let order = create_order();
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.id(), order.id());
        assert_eq!(deserialized.status(), OrderStatus::Pending);
        assert_eq!(deserialized.value().cents(), 10000);
        assert_eq!(deserialized.order_number(), order.order_number());
    }
}
