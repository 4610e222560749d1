//! Application services for the order tracking system.
//!
//! Sits between the HTTP layer and the domain: each service loads state
//! through a repository, applies an aggregate operation, persists the
//! result, and hands the emitted event to the dispatcher, which turns it
//! into push frames for the owner's and the order's live sessions.

pub mod deliveries;
pub mod dispatcher;
pub mod error;
pub mod locks;
pub mod notifications;
pub mod orders;

pub use deliveries::DeliveryService;
pub use dispatcher::Dispatcher;
pub use error::AppError;
pub use locks::OrderLocks;
pub use notifications::NotificationService;
pub use orders::{OrderDetails, OrderService};
