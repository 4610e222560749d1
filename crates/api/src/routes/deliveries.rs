//! Delivery registration and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use common::UserId;
use domain::Delivery;
use serde::{Deserialize, Serialize};
use storage::{DeliveryRepository, NotificationRepository, OrderRepository};

use crate::error::ApiError;
use crate::routes::orders::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListDeliveriesQuery {
    pub deliverer_id: Option<uuid::Uuid>,
}

// -- Response types --

#[derive(Serialize)]
pub struct DeliveryResponse {
    pub id: String,
    pub order_id: String,
    pub order_number: String,
    pub user_id: String,
    pub deliverer_id: String,
    pub delivered_at: String,
    pub created_at: String,
}

impl DeliveryResponse {
    pub(crate) fn from_delivery(delivery: &Delivery) -> Self {
        Self {
            id: delivery.id().to_string(),
            order_id: delivery.order_id().to_string(),
            order_number: delivery.order_number().to_string(),
            user_id: delivery.user_id().to_string(),
            deliverer_id: delivery.deliverer_id().to_string(),
            delivered_at: delivery.delivered_at().to_rfc3339(),
            created_at: delivery.created_at().to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /orders/{id}/delivery — register the delivery of an in-transit order.
///
/// The requesting user is recorded as the deliverer.
#[tracing::instrument(skip(state, headers))]
pub async fn register<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<(axum::http::StatusCode, Json<DeliveryResponse>), ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let deliverer_id = super::principal(&headers)?;
    let order_id = super::parse_order_id(&id)?;

    let delivery = state
        .delivery_service
        .register_delivery(order_id, deliverer_id)
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(DeliveryResponse::from_delivery(&delivery)),
    ))
}

/// GET /orders/{id}/delivery — fetch the delivery registered for an order.
#[tracing::instrument(skip(state))]
pub async fn get_for_order<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    Path(id): Path<String>,
) -> Result<Json<DeliveryResponse>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let order_id = super::parse_order_id(&id)?;
    let delivery = state
        .delivery_service
        .get_delivery_for_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No delivery registered for order {id}")))?;

    Ok(Json(DeliveryResponse::from_delivery(&delivery)))
}

/// GET /deliveries — list the deliveries registered by a deliverer.
#[tracing::instrument(skip(state))]
pub async fn list<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    Query(query): Query<ListDeliveriesQuery>,
) -> Result<Json<Vec<DeliveryResponse>>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let deliverer_id = query
        .deliverer_id
        .ok_or_else(|| ApiError::BadRequest("Missing deliverer_id query parameter".to_string()))?;

    let deliveries = state
        .delivery_service
        .list_deliverer_deliveries(UserId::from_uuid(deliverer_id))
        .await?;

    let responses: Vec<DeliveryResponse> = deliveries
        .iter()
        .map(DeliveryResponse::from_delivery)
        .collect();
    Ok(Json(responses))
}
