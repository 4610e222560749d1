//! Wire messages pushed to connected clients.

use chrono::{DateTime, Utc};
use common::{NotificationId, OrderId};
use domain::{Notification, NotificationType, OrderNumber, OrderStatus, OrderStatusChangedData};
use serde::{Deserialize, Serialize};

/// A message delivered over the real-time channel.
///
/// Serializes as an envelope with a `type` tag and a `data` payload. Payload
/// keys are camelCase, matching what browser clients expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PushMessage {
    /// A persisted notification, pushed to its target user.
    Notification(NotificationPayload),

    /// An order status change, pushed to watchers of the order.
    OrderStatusChanged(StatusChangePayload),

    /// The user's current unread notification count.
    UnreadCount(u64),

    /// A request-level failure, e.g. a rejected topic join.
    Error { message: String },
}

/// Payload for [`PushMessage::Notification`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Payload for [`PushMessage::OrderStatusChanged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangePayload {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

impl PushMessage {
    /// Builds the push for a persisted notification.
    pub fn notification(notification: &Notification) -> Self {
        PushMessage::Notification(NotificationPayload {
            id: notification.id(),
            kind: notification.kind(),
            message: notification.message().to_string(),
            data: notification.data().cloned(),
            created_at: notification.created_at(),
        })
    }

    /// Builds the push for a status change event.
    pub fn status_changed(data: &OrderStatusChangedData) -> Self {
        PushMessage::OrderStatusChanged(StatusChangePayload {
            order_id: data.order_id,
            order_number: data.order_number.clone(),
            old_status: data.old_status,
            new_status: data.new_status,
            changed_at: data.occurred_at,
        })
    }

    /// Builds an unread-count push.
    pub fn unread_count(count: u64) -> Self {
        PushMessage::UnreadCount(count)
    }

    /// Builds an error frame.
    pub fn error(message: impl Into<String>) -> Self {
        PushMessage::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use domain::{Money, OrderEvent};

    fn number() -> OrderNumber {
        OrderNumber::new("ORD-20250314-0001").unwrap()
    }

    #[test]
    fn test_notification_wire_shape() {
        let event = OrderEvent::order_created(
            OrderId::new(),
            number(),
            UserId::new(),
            Money::from_cents(1000),
        );
        let notification = Notification::from_event(&event);
        let push = PushMessage::notification(&notification);

        let json = serde_json::to_value(&push).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["data"]["id"], notification.id().to_string());
        assert_eq!(json["data"]["type"], "OrderCreated");
        assert!(json["data"]["message"].is_string());
        assert!(json["data"]["createdAt"].is_string());
        assert!(json["data"]["data"].is_object());
    }

    #[test]
    fn test_notification_without_data_omits_key() {
        let push = PushMessage::Notification(NotificationPayload {
            id: NotificationId::new(),
            kind: NotificationType::OrderCreated,
            message: "hello".to_string(),
            data: None,
            created_at: Utc::now(),
        });

        let json = serde_json::to_value(&push).unwrap();
        assert!(json["data"].get("data").is_none());
    }

    #[test]
    fn test_status_change_wire_shape() {
        let event = OrderEvent::status_changed(
            OrderId::new(),
            number(),
            UserId::new(),
            OrderStatus::Pending,
            OrderStatus::Confirmed,
        );
        let OrderEvent::OrderStatusChanged(data) = &event else {
            panic!("expected status change event");
        };
        let push = PushMessage::status_changed(data);

        let json = serde_json::to_value(&push).unwrap();
        assert_eq!(json["type"], "order_status_changed");
        assert_eq!(json["data"]["orderNumber"], "ORD-20250314-0001");
        assert_eq!(json["data"]["oldStatus"], "Pending");
        assert_eq!(json["data"]["newStatus"], "Confirmed");
        assert!(json["data"]["orderId"].is_string());
        assert!(json["data"]["changedAt"].is_string());
    }

    #[test]
    fn test_unread_count_is_bare_integer() {
        let json = serde_json::to_value(PushMessage::unread_count(3)).unwrap();
        assert_eq!(json["type"], "unread_count");
        assert_eq!(json["data"], 3);
    }

    #[test]
    fn test_error_frame() {
        let json = serde_json::to_value(PushMessage::error("not allowed")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["data"]["message"], "not allowed");
    }

    #[test]
    fn test_roundtrip() {
        let push = PushMessage::unread_count(7);
        let json = serde_json::to_string(&push).unwrap();
        let parsed: PushMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, push);
    }
}
