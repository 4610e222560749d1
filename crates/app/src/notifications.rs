//! Notification read-state service.

use std::sync::Arc;

use common::{NotificationId, UserId};
use domain::Notification;
use realtime::Hub;
use storage::{NotificationRepository, OrderRepository};

use crate::dispatcher::Dispatcher;
use crate::error::AppError;

/// Service for reading and acknowledging notifications.
///
/// Every operation that changes read state finishes by pushing the user's
/// fresh unread count to their live sessions.
pub struct NotificationService<O, N>
where
    O: OrderRepository,
    N: NotificationRepository,
{
    notifications: N,
    dispatcher: Dispatcher<O, N>,
}

impl<O, N> NotificationService<O, N>
where
    O: OrderRepository,
    N: NotificationRepository + Clone,
{
    /// Creates a new notification service.
    pub fn new(orders: O, notifications: N, hub: Arc<Hub>) -> Self {
        let dispatcher = Dispatcher::new(hub, orders, notifications.clone());
        Self {
            notifications,
            dispatcher,
        }
    }

    /// Lists a user's notifications, newest first.
    pub async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        Ok(self.notifications.get_by_user(user_id, unread_only).await?)
    }

    /// Counts a user's unread notifications.
    pub async fn unread_count(&self, user_id: UserId) -> Result<u64, AppError> {
        Ok(self.notifications.unread_count(user_id).await?)
    }

    /// Marks one notification as read.
    ///
    /// Only the recipient may mark it; a repeat call is a no-op that still
    /// succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn mark_as_read(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
    ) -> Result<Notification, AppError> {
        let mut notification = self
            .notifications
            .get_by_id(notification_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Notification",
                id: notification_id.into(),
            })?;

        if notification.mark_read(user_id)? {
            self.notifications.update(&notification).await?;
            metrics::counter!("notifications_read_total").increment(1);
        }

        self.dispatcher.push_unread_count(user_id).await;
        Ok(notification)
    }

    /// Marks all of a user's unread notifications as read.
    ///
    /// Returns the number of notifications that changed.
    #[tracing::instrument(skip(self))]
    pub async fn mark_all_as_read(&self, user_id: UserId) -> Result<u64, AppError> {
        let changed = self.notifications.mark_all_read(user_id).await?;
        if changed > 0 {
            metrics::counter!("notifications_read_total").increment(changed);
        }

        self.dispatcher.push_unread_count(user_id).await;
        tracing::info!(%user_id, changed, "marked all notifications read");
        Ok(changed)
    }
}
