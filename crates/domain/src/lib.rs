//! Domain layer for the order tracking system.
//!
//! This crate provides the core domain model including:
//! - Validated value objects (CEP, email, order number, money, address)
//! - Order aggregate with a status state machine
//! - Delivery and Notification entities
//! - Domain events emitted by order state changes

pub mod delivery;
pub mod error;
pub mod notification;
pub mod order;
pub mod value_objects;

pub use delivery::{Delivery, DeliveryError};
pub use error::ValidationError;
pub use notification::{Notification, NotificationError, NotificationType};
pub use order::{
    Order, OrderCreatedData, OrderDeliveredData, OrderError, OrderEvent, OrderStatus,
    OrderStatusChangedData,
};
pub use value_objects::{Address, Cep, Email, Money, OrderNumber, PasswordHash};
