//! Order lifecycle state machine.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──► Confirmed ──► InTransit ──► Delivered
///    │
///    └──► Cancelled
/// ```
///
/// Delivered and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order was created and awaits confirmation.
    #[default]
    Pending,

    /// Order was confirmed and awaits shipping.
    Confirmed,

    /// Order is on its way to the delivery address.
    InTransit,

    /// Order reached its destination (terminal state).
    Delivered,

    /// Order was cancelled before confirmation (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order can be confirmed in this status.
    pub fn can_confirm(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if delivery can start in this status.
    pub fn can_start_delivery(&self) -> bool {
        matches!(self, OrderStatus::Confirmed)
    }

    /// Returns true if the order can be marked delivered in this status.
    pub fn can_mark_delivered(&self) -> bool {
        matches!(self, OrderStatus::InTransit)
    }

    /// Returns true if the order can be cancelled in this status.
    ///
    /// Only pending orders are cancellable; once confirmed, an order runs
    /// its course.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::InTransit => "InTransit",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Confirmed" => Ok(OrderStatus::Confirmed),
            "InTransit" => Ok(OrderStatus::InTransit),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(ValidationError::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_pending_can_confirm() {
        assert!(OrderStatus::Pending.can_confirm());
        assert!(!OrderStatus::Confirmed.can_confirm());
        assert!(!OrderStatus::InTransit.can_confirm());
        assert!(!OrderStatus::Delivered.can_confirm());
        assert!(!OrderStatus::Cancelled.can_confirm());
    }

    #[test]
    fn test_confirmed_can_start_delivery() {
        assert!(!OrderStatus::Pending.can_start_delivery());
        assert!(OrderStatus::Confirmed.can_start_delivery());
        assert!(!OrderStatus::InTransit.can_start_delivery());
        assert!(!OrderStatus::Delivered.can_start_delivery());
        assert!(!OrderStatus::Cancelled.can_start_delivery());
    }

    #[test]
    fn test_in_transit_can_mark_delivered() {
        assert!(!OrderStatus::Pending.can_mark_delivered());
        assert!(!OrderStatus::Confirmed.can_mark_delivered());
        assert!(OrderStatus::InTransit.can_mark_delivered());
        assert!(!OrderStatus::Delivered.can_mark_delivered());
        assert!(!OrderStatus::Cancelled.can_mark_delivered());
    }

    #[test]
    fn test_only_pending_can_cancel() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(!OrderStatus::Confirmed.can_cancel());
        assert!(!OrderStatus::InTransit.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(!OrderStatus::InTransit.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderStatus::Pending.to_string(), "Pending");
        assert_eq!(OrderStatus::Confirmed.to_string(), "Confirmed");
        assert_eq!(OrderStatus::InTransit.to_string(), "InTransit");
        assert_eq!(OrderStatus::Delivered.to_string(), "Delivered");
        assert_eq!(OrderStatus::Cancelled.to_string(), "Cancelled");
    }

    #[test]
    fn test_parse_round_trips_every_status() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InTransit,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let result: Result<OrderStatus, _> = "Shipped".parse();
        assert!(matches!(
            result,
            Err(ValidationError::UnknownStatus { value }) if value == "Shipped"
        ));
    }

    #[test]
    fn test_serialization() {
        let status = OrderStatus::InTransit;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"InTransit\"");
        let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
