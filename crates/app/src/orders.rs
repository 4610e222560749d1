//! Order lifecycle service.

use std::sync::Arc;

use chrono::Utc;
use common::{OrderId, UserId};
use domain::{
    Address, Delivery, Money, Notification, Order, OrderEvent, OrderNumber, OrderStatus,
};
use realtime::Hub;
use storage::{DeliveryRepository, NotificationRepository, OrderRepository, StorageError};

use crate::dispatcher::Dispatcher;
use crate::error::AppError;

/// An order joined with its delivery record, if one exists.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: Order,
    pub delivery: Option<Delivery>,
}

impl OrderDetails {
    /// Status adjusted for the delivery row: a persisted delivery means the
    /// order was delivered even if the status write behind it was lost.
    pub fn effective_status(&self) -> OrderStatus {
        self.order.effective_status(self.delivery.is_some())
    }
}

/// Service for managing the order lifecycle.
///
/// Provides a high-level API over the order repository: each command loads
/// the order, applies the aggregate transition, persists the result, and
/// forwards the emitted event as a notification row plus push frames.
pub struct OrderService<O, D, N>
where
    O: OrderRepository,
    D: DeliveryRepository,
    N: NotificationRepository,
{
    orders: O,
    deliveries: D,
    notifications: N,
    dispatcher: Dispatcher<O, N>,
}

impl<O, D, N> OrderService<O, D, N>
where
    O: OrderRepository + Clone,
    D: DeliveryRepository,
    N: NotificationRepository + Clone,
{
    /// Creates a new order service.
    pub fn new(orders: O, deliveries: D, notifications: N, hub: Arc<Hub>) -> Self {
        let dispatcher = Dispatcher::new(hub, orders.clone(), notifications.clone());
        Self {
            orders,
            deliveries,
            notifications,
            dispatcher,
        }
    }

    /// Creates an order for a user.
    ///
    /// The order number is derived from today's UTC date and the count of
    /// orders already created today.
    #[tracing::instrument(skip(self, description, address))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        description: String,
        value: Money,
        address: Address,
    ) -> Result<Order, AppError> {
        metrics::counter!("orders_created_total").increment(1);

        // 1. Derive the next order number for today
        let today = Utc::now().date_naive();
        let sequence = self.orders.count_created_on(today).await? + 1;
        let order_number = OrderNumber::generate(today, sequence);

        // 2. Build the aggregate and persist it
        let (order, event) = Order::create(order_number, description, value, address, user_id)?;
        match self.orders.add(&order).await {
            Ok(()) => {}
            Err(StorageError::UniqueViolation { .. }) => {
                return Err(AppError::Conflict {
                    reason: format!("order number {} already taken", order.order_number()),
                });
            }
            Err(e) => return Err(e.into()),
        }

        // 3. Notification row and push frames
        self.notify(event).await;

        tracing::info!(
            order_id = %order.id(),
            order_number = %order.order_number(),
            "order created"
        );
        Ok(order)
    }

    /// Confirms a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_order(&self, order_id: OrderId) -> Result<Order, AppError> {
        metrics::counter!("order_transitions_total").increment(1);

        let mut order = self.load_order(order_id).await?;
        let event = order.confirm()?;
        self.orders.update(&order).await?;
        self.notify(event).await;

        tracing::info!(%order_id, "order confirmed");
        Ok(order)
    }

    /// Moves a confirmed order into transit.
    #[tracing::instrument(skip(self))]
    pub async fn start_delivery(&self, order_id: OrderId) -> Result<Order, AppError> {
        metrics::counter!("order_transitions_total").increment(1);

        let mut order = self.load_order(order_id).await?;
        let event = order.start_delivery()?;
        self.orders.update(&order).await?;
        self.notify(event).await;

        tracing::info!(%order_id, "order in transit");
        Ok(order)
    }

    /// Cancels a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, AppError> {
        metrics::counter!("order_transitions_total").increment(1);

        let mut order = self.load_order(order_id).await?;
        let event = order.cancel()?;
        self.orders.update(&order).await?;
        self.notify(event).await;

        tracing::info!(%order_id, "order cancelled");
        Ok(order)
    }

    /// Retrieves an order together with its delivery record.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<OrderDetails>, AppError> {
        let Some(order) = self.orders.get_by_id(order_id).await? else {
            return Ok(None);
        };
        let delivery = self.deliveries.get_by_order(order_id).await?;
        Ok(Some(OrderDetails { order, delivery }))
    }

    /// Retrieves an order by its human-facing number.
    pub async fn get_order_by_number(
        &self,
        number: &OrderNumber,
    ) -> Result<Option<OrderDetails>, AppError> {
        let Some(order) = self.orders.get_by_order_number(number).await? else {
            return Ok(None);
        };
        let delivery = self.deliveries.get_by_order(order.id()).await?;
        Ok(Some(OrderDetails { order, delivery }))
    }

    /// Lists a user's orders, newest first.
    pub async fn list_user_orders(&self, user_id: UserId) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.get_by_user(user_id).await?)
    }

    /// Lists orders currently in a status, newest first.
    pub async fn list_orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, AppError> {
        Ok(self.orders.get_by_status(status).await?)
    }

    async fn load_order(&self, order_id: OrderId) -> Result<Order, AppError> {
        self.orders
            .get_by_id(order_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Order",
                id: order_id.into(),
            })
    }

    /// Persists a notification for the event and pushes the frames.
    ///
    /// Runs after the command's own write committed; a failed row write is
    /// logged and the push still goes out.
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
