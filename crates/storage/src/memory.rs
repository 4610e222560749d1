use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use common::{DeliveryId, NotificationId, OrderId, UserId};
use domain::{Delivery, Notification, Order, OrderNumber, OrderStatus};

use crate::{
    Result, StorageError,
    repository::{DeliveryRepository, NotificationRepository, OrderRepository},
};

/// In-memory order repository for testing and single-instance deployments.
///
/// This implementation keeps all rows in memory and provides the same
/// interface and constraint behavior as a database-backed implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    fail_updates: Arc<AtomicBool>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Makes subsequent `update` calls fail with `Unavailable`.
    ///
    /// Used by tests that exercise recovery from a partial write.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn get_by_order_number(&self, number: &OrderNumber) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .find(|o| o.order_number() == number)
            .cloned())
    }

    async fn get_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<_> = orders
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(matching)
    }

    async fn get_by_status(&self, status: OrderStatus) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matching: Vec<_> = orders
            .values()
            .filter(|o| o.status() == status)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(matching)
    }

    async fn add(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;

        if orders.contains_key(&order.id()) {
            return Err(StorageError::UniqueViolation {
                constraint: "orders.id",
            });
        }
        if orders
            .values()
            .any(|o| o.order_number() == order.order_number())
        {
            return Err(StorageError::UniqueViolation {
                constraint: "orders.order_number",
            });
        }

        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "simulated update failure".to_string(),
            });
        }

        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.id()) {
            return Err(StorageError::RowNotFound {
                entity: "order",
                id: order.id().into(),
            });
        }

        orders.insert(order.id(), order.clone());
        Ok(())
    }

    async fn count_created_on(&self, date: NaiveDate) -> Result<u64> {
        let orders = self.orders.read().await;
        let count = orders
            .values()
            .filter(|o| o.created_at().date_naive() == date)
            .count();
        Ok(count as u64)
    }
}

/// In-memory delivery repository.
///
/// The per-order uniqueness check and the insert happen under one write
/// lock, so concurrent registrations for the same order cannot both
/// succeed.
#[derive(Clone, Default)]
pub struct InMemoryDeliveryRepository {
    deliveries: Arc<RwLock<HashMap<DeliveryId, Delivery>>>,
}

impl InMemoryDeliveryRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of deliveries stored.
    pub async fn count(&self) -> usize {
        self.deliveries.read().await.len()
    }
}

#[async_trait]
impl DeliveryRepository for InMemoryDeliveryRepository {
    async fn get_by_order(&self, order_id: OrderId) -> Result<Option<Delivery>> {
        let deliveries = self.deliveries.read().await;
        Ok(deliveries
            .values()
            .find(|d| d.order_id() == order_id)
            .cloned())
    }

    async fn get_by_deliverer(&self, deliverer_id: UserId) -> Result<Vec<Delivery>> {
        let deliveries = self.deliveries.read().await;
        let mut matching: Vec<_> = deliveries
            .values()
            .filter(|d| d.deliverer_id() == deliverer_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(matching)
    }

    async fn exists_for_order(&self, order_id: OrderId) -> Result<bool> {
        let deliveries = self.deliveries.read().await;
        Ok(deliveries.values().any(|d| d.order_id() == order_id))
    }

    async fn add(&self, delivery: &Delivery) -> Result<()> {
        let mut deliveries = self.deliveries.write().await;

        if deliveries
            .values()
            .any(|d| d.order_id() == delivery.order_id())
        {
            return Err(StorageError::UniqueViolation {
                constraint: "deliveries.order_id",
            });
        }

        deliveries.insert(delivery.id(), delivery.clone());
        Ok(())
    }
}

/// In-memory notification repository.
#[derive(Clone, Default)]
pub struct InMemoryNotificationRepository {
    notifications: Arc<RwLock<HashMap<NotificationId, Notification>>>,
}

impl InMemoryNotificationRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of notifications stored.
    pub async fn count(&self) -> usize {
        self.notifications.read().await.len()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn get_by_id(&self, id: NotificationId) -> Result<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&id).cloned())
    }

    async fn get_by_user(&self, user_id: UserId, unread_only: bool) -> Result<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut matching: Vec<_> = notifications
            .values()
            .filter(|n| n.user_id() == user_id && (!unread_only || !n.is_read()))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(matching)
    }

    async fn unread_count(&self, user_id: UserId) -> Result<u64> {
        let notifications = self.notifications.read().await;
        let count = notifications
            .values()
            .filter(|n| n.user_id() == user_id && !n.is_read())
            .count();
        Ok(count as u64)
    }

    async fn add(&self, notification: &Notification) -> Result<()> {
        let mut notifications = self.notifications.write().await;

        if notifications.contains_key(&notification.id()) {
            return Err(StorageError::UniqueViolation {
                constraint: "notifications.id",
            });
        }

        notifications.insert(notification.id(), notification.clone());
        Ok(())
    }

    async fn update(&self, notification: &Notification) -> Result<()> {
        let mut notifications = self.notifications.write().await;
        if !notifications.contains_key(&notification.id()) {
            return Err(StorageError::RowNotFound {
                entity: "notification",
                id: notification.id().into(),
            });
        }

        notifications.insert(notification.id(), notification.clone());
        Ok(())
    }

    async fn mark_all_read(&self, user_id: UserId) -> Result<u64> {
        let mut notifications = self.notifications.write().await;
        let mut updated = 0;
        for notification in notifications.values_mut() {
            if notification.user_id() == user_id
                && notification.mark_read(user_id).unwrap_or(false)
            {
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{Address, Cep, Money, OrderEvent};

    fn sample_address() -> Address {
        Address::new(
            "Rua Augusta",
            "500",
            None,
            "Consolação",
            "São Paulo",
            "SP",
            Cep::new("01304-000").unwrap(),
        )
        .unwrap()
    }

    fn create_order(user_id: UserId, sequence: u64) -> Order {
        let number = OrderNumber::generate(Utc::now().date_naive(), sequence);
        let (order, _) = Order::create(
            number,
            "Test order",
            Money::from_cents(5000),
            sample_address(),
            user_id,
        )
        .unwrap();
        order
    }

    fn in_transit_order(user_id: UserId, sequence: u64) -> Order {
        let mut order = create_order(user_id, sequence);
        order.confirm().unwrap();
        order.start_delivery().unwrap();
        order
    }

    #[tokio::test]
    async fn add_and_get_order() {
        let repo = InMemoryOrderRepository::new();
        let order = create_order(UserId::new(), 1);

        repo.add(&order).await.unwrap();

        let by_id = repo.get_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(by_id.id(), order.id());

        let by_number = repo
            .get_by_order_number(order.order_number())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.id(), order.id());

        assert!(repo.get_by_id(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_order_number_rejected() {
        let repo = InMemoryOrderRepository::new();
        let first = create_order(UserId::new(), 1);
        let second = create_order(UserId::new(), 1);

        repo.add(&first).await.unwrap();
        let result = repo.add(&second).await;

        assert!(matches!(
            result,
            Err(StorageError::UniqueViolation {
                constraint: "orders.order_number"
            })
        ));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_order_id_rejected() {
        let repo = InMemoryOrderRepository::new();
        let order = create_order(UserId::new(), 1);

        repo.add(&order).await.unwrap();
        let result = repo.add(&order).await;

        assert!(matches!(
            result,
            Err(StorageError::UniqueViolation {
                constraint: "orders.id"
            })
        ));
    }

    #[tokio::test]
    async fn update_replaces_row() {
        let repo = InMemoryOrderRepository::new();
        let mut order = create_order(UserId::new(), 1);
        repo.add(&order).await.unwrap();

        order.confirm().unwrap();
        repo.update(&order).await.unwrap();

        let stored = repo.get_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn update_missing_row_fails() {
        let repo = InMemoryOrderRepository::new();
        let order = create_order(UserId::new(), 1);

        let result = repo.update(&order).await;
        assert!(matches!(result, Err(StorageError::RowNotFound { .. })));
    }

    #[tokio::test]
    async fn update_fails_when_toggled() {
        let repo = InMemoryOrderRepository::new();
        let mut order = create_order(UserId::new(), 1);
        repo.add(&order).await.unwrap();

        repo.set_fail_updates(true);
        order.confirm().unwrap();
        let result = repo.update(&order).await;
        assert!(matches!(result, Err(StorageError::Unavailable { .. })));

        // The stored row is untouched and the toggle can be cleared.
        let stored = repo.get_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Pending);

        repo.set_fail_updates(false);
        repo.update(&order).await.unwrap();
    }

    #[tokio::test]
    async fn get_by_user_filters_and_sorts() {
        let repo = InMemoryOrderRepository::new();
        let user_id = UserId::new();
        let other = UserId::new();

        for sequence in 1..=3 {
            repo.add(&create_order(user_id, sequence)).await.unwrap();
        }
        repo.add(&create_order(other, 4)).await.unwrap();

        let orders = repo.get_by_user(user_id).await.unwrap();
        assert_eq!(orders.len(), 3);
        assert!(orders.iter().all(|o| o.user_id() == user_id));
        assert!(
            orders
                .windows(2)
                .all(|w| w[0].created_at() >= w[1].created_at())
        );
    }

    #[tokio::test]
    async fn get_by_status_filters() {
        let repo = InMemoryOrderRepository::new();
        let user_id = UserId::new();

        let pending = create_order(user_id, 1);
        let mut confirmed = create_order(user_id, 2);
        confirmed.confirm().unwrap();

        repo.add(&pending).await.unwrap();
        repo.add(&confirmed).await.unwrap();

        let results = repo.get_by_status(OrderStatus::Confirmed).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id(), confirmed.id());
    }

    #[tokio::test]
    async fn count_created_on_date() {
        let repo = InMemoryOrderRepository::new();
        for sequence in 1..=3 {
            repo.add(&create_order(UserId::new(), sequence))
                .await
                .unwrap();
        }

        let today = Utc::now().date_naive();
        assert_eq!(repo.count_created_on(today).await.unwrap(), 3);

        let other_day = today - chrono::Days::new(1);
        assert_eq!(repo.count_created_on(other_day).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delivery_add_and_get() {
        let repo = InMemoryDeliveryRepository::new();
        let order = in_transit_order(UserId::new(), 1);
        let deliverer_id = UserId::new();
        let delivery = Delivery::register(&order, deliverer_id).unwrap();

        assert!(!repo.exists_for_order(order.id()).await.unwrap());
        repo.add(&delivery).await.unwrap();
        assert!(repo.exists_for_order(order.id()).await.unwrap());

        let stored = repo.get_by_order(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.id(), delivery.id());

        let by_deliverer = repo.get_by_deliverer(deliverer_id).await.unwrap();
        assert_eq!(by_deliverer.len(), 1);
    }

    #[tokio::test]
    async fn second_delivery_for_same_order_rejected() {
        let repo = InMemoryDeliveryRepository::new();
        let order = in_transit_order(UserId::new(), 1);

        let first = Delivery::register(&order, UserId::new()).unwrap();
        let second = Delivery::register(&order, UserId::new()).unwrap();

        repo.add(&first).await.unwrap();
        let result = repo.add(&second).await;

        assert!(matches!(
            result,
            Err(StorageError::UniqueViolation {
                constraint: "deliveries.order_id"
            })
        ));
        assert_eq!(repo.count().await, 1);
    }

    fn create_notification(user_id: UserId) -> Notification {
        let event = OrderEvent::order_created(
            OrderId::new(),
            OrderNumber::new("ORD-20250314-0001").unwrap(),
            user_id,
            Money::from_cents(1000),
        );
        Notification::from_event(&event)
    }

    #[tokio::test]
    async fn notification_add_and_unread_count() {
        let repo = InMemoryNotificationRepository::new();
        let user_id = UserId::new();

        for _ in 0..3 {
            repo.add(&create_notification(user_id)).await.unwrap();
        }
        repo.add(&create_notification(UserId::new())).await.unwrap();

        assert_eq!(repo.unread_count(user_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn notification_unread_only_listing() {
        let repo = InMemoryNotificationRepository::new();
        let user_id = UserId::new();

        let mut read = create_notification(user_id);
        read.mark_read(user_id).unwrap();
        repo.add(&read).await.unwrap();
        repo.add(&create_notification(user_id)).await.unwrap();

        let all = repo.get_by_user(user_id, false).await.unwrap();
        assert_eq!(all.len(), 2);

        let unread = repo.get_by_user(user_id, true).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert!(!unread[0].is_read());
    }

    #[tokio::test]
    async fn notification_update_persists_read_flag() {
        let repo = InMemoryNotificationRepository::new();
        let user_id = UserId::new();
        let mut notification = create_notification(user_id);
        repo.add(&notification).await.unwrap();

        notification.mark_read(user_id).unwrap();
        repo.update(&notification).await.unwrap();

        let stored = repo.get_by_id(notification.id()).await.unwrap().unwrap();
        assert!(stored.is_read());
        assert_eq!(repo.unread_count(user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_all_read_flips_only_unread() {
        let repo = InMemoryNotificationRepository::new();
        let user_id = UserId::new();
        let other = UserId::new();

        let mut already_read = create_notification(user_id);
        already_read.mark_read(user_id).unwrap();
        repo.add(&already_read).await.unwrap();
        repo.add(&create_notification(user_id)).await.unwrap();
        repo.add(&create_notification(user_id)).await.unwrap();
        repo.add(&create_notification(other)).await.unwrap();

        let updated = repo.mark_all_read(user_id).await.unwrap();
        assert_eq!(updated, 2);
        assert_eq!(repo.unread_count(user_id).await.unwrap(), 0);

        // The other user's row is untouched, and a rerun changes nothing.
        assert_eq!(repo.unread_count(other).await.unwrap(), 1);
        assert_eq!(repo.mark_all_read(user_id).await.unwrap(), 0);
    }
}
