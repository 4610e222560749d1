//! Shared types for the order tracking system.
//!
//! Provides the strongly-typed identifiers used across every crate in the
//! workspace so order, user, delivery, notification and connection IDs can
//! never be confused for one another.

pub mod types;

pub use types::{ConnectionId, DeliveryId, NotificationId, OrderId, UserId};
