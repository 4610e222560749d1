//! Notification entity.

use chrono::{DateTime, Utc};
use common::{NotificationId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::OrderEvent;

/// Errors that can occur during notification operations.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Notification belongs to a different user.
    #[error("Forbidden: notification {notification_id} does not belong to user {user_id}")]
    Forbidden {
        notification_id: NotificationId,
        user_id: UserId,
    },
}

/// The kind of notification, one per domain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationType {
    /// An order was created.
    OrderCreated,

    /// An order moved to a new status.
    OrderStatusChanged,

    /// An order was delivered.
    OrderDelivered,
}

impl NotificationType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::OrderCreated => "OrderCreated",
            NotificationType::OrderStatusChanged => "OrderStatusChanged",
            NotificationType::OrderDelivered => "OrderDelivered",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A read/unread message addressed to one user.
///
/// Materialized from a domain event and persisted regardless of whether the
/// user is connected; the real-time push is an optimization on top, never a
/// replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    user_id: UserId,
    kind: NotificationType,
    message: String,
    data: Option<serde_json::Value>,
    read: bool,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Notification {
    /// Materializes the notification row for a domain event.
    ///
    /// Each event maps to exactly one notification type; the recipient is
    /// always the order's owner. The event payload is kept as structured
    /// data so clients can deep-link without parsing the message text.
    pub fn from_event(event: &OrderEvent) -> Self {
        let (kind, message) = match event {
            OrderEvent::OrderCreated(data) => (
                NotificationType::OrderCreated,
                format!("Your order {} has been created", data.order_number),
            ),
            OrderEvent::OrderStatusChanged(data) => (
                NotificationType::OrderStatusChanged,
                format!(
                    "Your order {} moved from {} to {}",
                    data.order_number, data.old_status, data.new_status
                ),
            ),
            OrderEvent::OrderDelivered(data) => (
                NotificationType::OrderDelivered,
                format!("Your order {} has been delivered", data.order_number),
            ),
        };

        Self {
            id: NotificationId::new(),
            user_id: event.user_id(),
            kind,
            message,
            data: serde_json::to_value(event).ok(),
            read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    /// Marks the notification as read on behalf of `requesting_user`.
    ///
    /// Returns `Ok(true)` if the flag flipped, `Ok(false)` if it was already
    /// read (idempotent), and `Forbidden` if the notification belongs to a
    /// different user.
    pub fn mark_read(&mut self, requesting_user: UserId) -> Result<bool, NotificationError> {
        if self.user_id != requesting_user {
            return Err(NotificationError::Forbidden {
                notification_id: self.id,
                user_id: requesting_user,
            });
        }

        if self.read {
            return Ok(false);
        }

        self.read = true;
        self.read_at = Some(Utc::now());
        Ok(true)
    }

    /// Returns the notification ID.
    pub fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the target user's ID.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the notification type.
    pub fn kind(&self) -> NotificationType {
        self.kind
    }

    /// Returns the message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the structured payload, if any.
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Returns true if the notification has been read.
    pub fn is_read(&self) -> bool {
        self.read
    }

    /// Returns when the notification was read, if it has been.
    pub fn read_at(&self) -> Option<DateTime<Utc>> {
        self.read_at
    }

    /// Returns when the notification was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
