use async_trait::async_trait;
use chrono::NaiveDate;
use common::{DeliveryId, NotificationId, OrderId, UserId};
use domain::{Delivery, Notification, Order, OrderNumber, OrderStatus};

use crate::Result;

/// Persistence contract for orders.
///
/// All implementations must be thread-safe (Send + Sync). Listing methods
/// return rows newest first.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Retrieves an order by its ID.
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Retrieves an order by its unique order number.
    async fn get_by_order_number(&self, number: &OrderNumber) -> Result<Option<Order>>;

    /// Retrieves all orders owned by a user.
    async fn get_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Retrieves all orders currently in a status.
    async fn get_by_status(&self, status: OrderStatus) -> Result<Vec<Order>>;

    /// Inserts a new order.
    ///
    /// Fails with `UniqueViolation` if the ID or order number is taken.
    async fn add(&self, order: &Order) -> Result<()>;

    /// Replaces an existing order row.
    ///
    /// Fails with `RowNotFound` if the order was never added.
    async fn update(&self, order: &Order) -> Result<()>;

    /// Counts the orders created on a calendar date (UTC).
    ///
    /// Used to derive the daily sequence for new order numbers.
    async fn count_created_on(&self, date: NaiveDate) -> Result<u64>;
}

/// Persistence contract for deliveries.
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    /// Retrieves the delivery registered for an order, if any.
    async fn get_by_order(&self, order_id: OrderId) -> Result<Option<Delivery>>;

    /// Retrieves all deliveries assigned to a deliverer.
    async fn get_by_deliverer(&self, deliverer_id: UserId) -> Result<Vec<Delivery>>;

    /// Returns true if a delivery exists for the order.
    async fn exists_for_order(&self, order_id: OrderId) -> Result<bool>;

    /// Inserts a new delivery.
    ///
    /// At most one delivery may exist per order; a second insert for the
    /// same order fails with `UniqueViolation` regardless of any earlier
    /// `exists_for_order` check. This is the backstop that keeps concurrent
    /// registrations from both succeeding.
    async fn add(&self, delivery: &Delivery) -> Result<()>;
}

/// Persistence contract for notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Retrieves a notification by its ID.
    async fn get_by_id(&self, id: NotificationId) -> Result<Option<Notification>>;

    /// Retrieves a user's notifications, optionally only unread ones.
    async fn get_by_user(&self, user_id: UserId, unread_only: bool) -> Result<Vec<Notification>>;

    /// Counts a user's unread notifications.
    async fn unread_count(&self, user_id: UserId) -> Result<u64>;

    /// Inserts a new notification.
    async fn add(&self, notification: &Notification) -> Result<()>;

    /// Replaces an existing notification row.
    async fn update(&self, notification: &Notification) -> Result<()>;

    /// Marks all of a user's unread notifications as read.
    ///
    /// Returns the number of rows that changed.
    async fn mark_all_read(&self, user_id: UserId) -> Result<u64>;
}
