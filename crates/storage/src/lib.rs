pub mod error;
pub mod memory;
pub mod repository;

pub use error::{Result, StorageError};
pub use memory::{InMemoryDeliveryRepository, InMemoryNotificationRepository, InMemoryOrderRepository};
pub use repository::{DeliveryRepository, NotificationRepository, OrderRepository};
