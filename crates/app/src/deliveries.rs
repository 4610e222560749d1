//! Delivery registration workflow.

use std::sync::Arc;

use common::{OrderId, UserId};
use domain::{Delivery, Notification, OrderEvent};
use realtime::Hub;
use storage::{DeliveryRepository, NotificationRepository, OrderRepository, StorageError};

use crate::dispatcher::Dispatcher;
use crate::error::AppError;
use crate::locks::OrderLocks;

/// Service for registering deliveries.
///
/// Registration is the one workflow that writes two rows: the delivery
/// record and the order's final status. It is serialized per order, so of
/// two concurrent registrations for the same order one succeeds and the
/// other reports a conflict.
pub struct DeliveryService<O, D, N>
where
    O: OrderRepository,
    D: DeliveryRepository,
    N: NotificationRepository,
{
    orders: O,
    deliveries: D,
    notifications: N,
    dispatcher: Dispatcher<O, N>,
    locks: OrderLocks,
}

impl<O, D, N> DeliveryService<O, D, N>
where
    O: OrderRepository + Clone,
    D: DeliveryRepository,
    N: NotificationRepository + Clone,
{
    /// Creates a new delivery service.
    pub fn new(orders: O, deliveries: D, notifications: N, hub: Arc<Hub>) -> Self {
        let dispatcher = Dispatcher::new(hub, orders.clone(), notifications.clone());
        Self {
            orders,
            deliveries,
            notifications,
            dispatcher,
            locks: OrderLocks::new(),
        }
    }

    /// Registers the delivery of an in-transit order.
    ///
    /// The delivery row is written before the order row. If the order write
    /// is then lost, the delivery row stays and reads reconcile the order
    /// to Delivered; a retry of the command reports a conflict.
    #[tracing::instrument(skip(self))]
    pub async fn register_delivery(
        &self,
        order_id: OrderId,
        deliverer_id: UserId,
    ) -> Result<Delivery, AppError> {
        metrics::counter!("delivery_registrations_total").increment(1);
        let start = std::time::Instant::now();

        let _guard = self.locks.acquire(order_id).await;

        // 1. Load the order
        let mut order = self
            .orders
            .get_by_id(order_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Order",
                id: order_id.into(),
            })?;

        // 2. Reject if a delivery is already registered
        if self.deliveries.exists_for_order(order_id).await? {
            return Err(AppError::Conflict {
                reason: format!("delivery already registered for order {order_id}"),
            });
        }

        // 3. Build the delivery record (requires InTransit)
        let delivery = Delivery::register(&order, deliverer_id)?;

        // 4. Advance the order, which checks InTransit again on the aggregate
        let event = order.mark_delivered(delivery.id(), delivery.delivered_at())?;

        // 5. Persist the delivery first; the unique constraint on order id
        //    catches registrations the pre-check raced with
        match self.deliveries.add(&delivery).await {
            Ok(()) => {}
            Err(StorageError::UniqueViolation { .. }) => {
                return Err(AppError::Conflict {
                    reason: format!("delivery already registered for order {order_id}"),
                });
            }
            Err(e) => return Err(e.into()),
        }

        // 6. Then the order row
        self.orders.update(&order).await?;

        // 7. Notification row and push frames
        self.notify(event).await;

        metrics::histogram!("delivery_registration_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        tracing::info!(
            delivery_id = %delivery.id(),
            %order_id,
            %deliverer_id,
            "delivery registered"
        );
        Ok(delivery)
    }

    /// Retrieves the delivery registered for an order, if any.
    pub async fn get_delivery_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<Delivery>, AppError> {
        Ok(self.deliveries.get_by_order(order_id).await?)
    }

    /// Lists a deliverer's deliveries, newest first.
    pub async fn list_deliverer_deliveries(
        &self,
        deliverer_id: UserId,
    ) -> Result<Vec<Delivery>, AppError> {
        Ok(self.deliveries.get_by_deliverer(deliverer_id).await?)
    }

    /// Persists a notification for the event and pushes the frames.
    ///
    /// Runs after both rows committed; a failed row write is logged and the
    /// push still goes out.
    async fn notify(&self, event: OrderEvent) {
        let notification = Notification::from_event(&event);
        if let Err(e) = self.notifications.add(&notification).await {
            tracing::error!(
                error = %e,
                event_type = event.event_type(),
                "failed to persist notification"
            );
        }
        self.dispatcher.dispatch(&event, &notification).await;
    }
}
