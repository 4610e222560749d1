//! Fan-out of domain events to live sessions.

use std::sync::Arc;

use common::{ConnectionId, OrderId, UserId};
use domain::{Notification, OrderEvent, OrderStatus, OrderStatusChangedData};
use realtime::{Hub, PushMessage, SessionHandle, Topic};
use storage::{NotificationRepository, OrderRepository};

use crate::error::AppError;

/// Routes domain events to hub topics as push frames.
///
/// Session and topic bookkeeping live in the hub; the dispatcher adds the
/// parts that need repository access: the ownership check when a session
/// asks to watch an order, and the unread-count recomputation that follows
/// every notification change. Pushes never fail the operation that
/// triggered them; a session that is not connected when an event fires
/// simply misses the frame and catches up from the notification list.
pub struct Dispatcher<O, N>
where
    O: OrderRepository,
    N: NotificationRepository,
{
    hub: Arc<Hub>,
    orders: O,
    notifications: N,
}

impl<O, N> Dispatcher<O, N>
where
    O: OrderRepository,
    N: NotificationRepository,
{
    /// Creates a dispatcher over a hub and the repositories it consults.
    pub fn new(hub: Arc<Hub>, orders: O, notifications: N) -> Self {
        Self {
            hub,
            orders,
            notifications,
        }
    }

    /// Opens a session for a user.
    ///
    /// The session is subscribed to the user's own topic before this
    /// returns, so no event published afterwards can slip past it.
    pub async fn connect(&self, user_id: UserId) -> SessionHandle {
        self.hub.connect(user_id).await
    }

    /// Closes a session and drops all its subscriptions.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        self.hub.disconnect(connection_id).await
    }

    /// Subscribes a session to an order's topic.
    ///
    /// Only the order's owner may watch it; anyone else gets Forbidden and
    /// no subscription.
    #[tracing::instrument(skip(self))]
    pub async fn join_order(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<(), AppError> {
        let order = self
            .orders
            .get_by_id(order_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Order",
                id: order_id.into(),
            })?;

        if order.user_id() != user_id {
            return Err(AppError::Forbidden {
                reason: format!("user {user_id} does not own order {order_id}"),
            });
        }

        if !self.hub.join(connection_id, Topic::Order(order_id)).await {
            tracing::debug!(%connection_id, "join ignored, session already gone");
        }
        Ok(())
    }

    /// Unsubscribes a session from an order's topic.
    ///
    /// Leaving needs no ownership check. Returns false if the session was
    /// not subscribed.
    pub async fn leave_order(&self, connection_id: ConnectionId, order_id: OrderId) -> bool {
        self.hub.leave(connection_id, Topic::Order(order_id)).await
    }

    /// Pushes the frames a fresh domain event calls for.
    ///
    /// The persisted notification goes to the owner's user topic, status
    /// changes additionally go to the order's topic for whoever is watching
    /// it, and the owner's unread count is recomputed and pushed last.
    #[tracing::instrument(
        skip(self, event, notification),
        fields(event_type = event.event_type(), order_id = %event.order_id())
    )]
    pub async fn dispatch(&self, event: &OrderEvent, notification: &Notification) {
        metrics::counter!("dispatcher_events_total").increment(1);

        let user_topic = Topic::User(event.user_id());
        self.hub
            .publish(&user_topic, PushMessage::notification(notification))
            .await;

        let order_topic = Topic::Order(event.order_id());
        match event {
            OrderEvent::OrderStatusChanged(data) => {
                self.hub
                    .publish(&order_topic, PushMessage::status_changed(data))
                    .await;
            }
            OrderEvent::OrderDelivered(data) => {
                // Watchers see delivery completion as the final status change.
                let change = OrderStatusChangedData {
                    order_id: data.order_id,
                    order_number: data.order_number.clone(),
                    user_id: data.user_id,
                    old_status: OrderStatus::InTransit,
                    new_status: OrderStatus::Delivered,
                    occurred_at: data.occurred_at,
                };
                self.hub
                    .publish(&order_topic, PushMessage::status_changed(&change))
                    .await;
            }
            OrderEvent::OrderCreated(_) => {}
        }

        self.push_unread_count(event.user_id()).await;
    }

    /// Recomputes a user's unread count and pushes it to their topic.
    ///
    /// A repository failure here is logged and swallowed; the count frame is
    /// best-effort like every other push.
    pub async fn push_unread_count(&self, user_id: UserId) {
        match self.notifications.unread_count(user_id).await {
            Ok(count) => {
                self.hub
                    .publish(&Topic::User(user_id), PushMessage::unread_count(count))
                    .await;
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "failed to compute unread count for push");
            }
        }
    }
}
