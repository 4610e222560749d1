//! Order aggregate and related types.

mod aggregate;
mod events;
mod status;

pub use aggregate::Order;
pub use events::{OrderCreatedData, OrderDeliveredData, OrderEvent, OrderStatusChangedData};
pub use status::OrderStatus;

use thiserror::Error;

/// Errors that can occur during order state transitions.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Requested transition is not in the allowed edge set.
    #[error("Invalid transition: cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
