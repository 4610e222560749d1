//! HTTP and WebSocket route handlers.

pub mod deliveries;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod orders;
pub mod ws;

use axum::http::HeaderMap;
use common::{OrderId, UserId};

use crate::error::ApiError;

/// Header naming the authenticated user on whose behalf a request runs.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extracts the acting user from the `x-user-id` header.
pub(crate) fn principal(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {USER_ID_HEADER} header")))?;

    let uuid = uuid::Uuid::parse_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {USER_ID_HEADER} header: {e}")))?;

    Ok(UserId::from_uuid(uuid))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
