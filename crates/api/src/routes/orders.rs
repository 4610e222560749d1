//! Order creation, lookup and lifecycle endpoints.

use std::sync::Arc;

use app::{
    AppError, DeliveryService, Dispatcher, NotificationService, OrderDetails, OrderService,
};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use common::UserId;
use domain::{Address, Cep, Money, Order, OrderNumber, OrderStatus};
use serde::{Deserialize, Serialize};
use storage::{DeliveryRepository, NotificationRepository, OrderRepository};

use crate::error::ApiError;
use crate::routes::deliveries::DeliveryResponse;

/// Shared application state accessible from all handlers.
pub struct AppState<O, D, N>
where
    O: OrderRepository,
    D: DeliveryRepository,
    N: NotificationRepository,
{
    pub order_service: OrderService<O, D, N>,
    pub delivery_service: DeliveryService<O, D, N>,
    pub notification_service: NotificationService<O, N>,
    pub dispatcher: Dispatcher<O, N>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub description: String,
    /// Decimal amount string, e.g. `"149.90"`.
    pub value: String,
    pub address: AddressRequest,
}

#[derive(Deserialize)]
pub struct AddressRequest {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub cep: String,
}

impl AddressRequest {
    fn into_domain(self) -> Result<Address, ApiError> {
        let cep = Cep::new(self.cep).map_err(AppError::from)?;
        let address = Address::new(
            self.street,
            self.number,
            self.complement,
            self.neighborhood,
            self.city,
            self.state,
            cep,
        )
        .map_err(AppError::from)?;
        Ok(address)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub user_id: Option<uuid::Uuid>,
    pub status: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub user_id: String,
    pub description: String,
    pub value_cents: i64,
    pub status: String,
    pub address: AddressResponse,
    pub created_at: String,
    pub updated_at: String,
}

impl OrderResponse {
    pub(crate) fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            order_number: order.order_number().to_string(),
            user_id: order.user_id().to_string(),
            description: order.description().to_string(),
            value_cents: order.value().cents(),
            status: order.status().as_str().to_string(),
            address: AddressResponse::from_address(order.address()),
            created_at: order.created_at().to_rfc3339(),
            updated_at: order.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct AddressResponse {
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub cep: String,
}

impl AddressResponse {
    fn from_address(address: &Address) -> Self {
        Self {
            street: address.street().to_string(),
            number: address.number().to_string(),
            complement: address.complement().map(String::from),
            neighborhood: address.neighborhood().to_string(),
            city: address.city().to_string(),
            state: address.state().to_string(),
            cep: address.cep().to_string(),
        }
    }
}

/// Order detail with its delivery record and reconciled status.
#[derive(Serialize)]
pub struct OrderDetailResponse {
    pub order: OrderResponse,
    pub effective_status: String,
    pub delivery: Option<DeliveryResponse>,
}

impl OrderDetailResponse {
    fn from_details(details: &OrderDetails) -> Self {
        Self {
            order: OrderResponse::from_order(&details.order),
            effective_status: details.effective_status().as_str().to_string(),
            delivery: details
                .delivery
                .as_ref()
                .map(DeliveryResponse::from_delivery),
        }
    }
}

// -- Handlers --

/// POST /orders — create an order for the requesting user.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let user_id = super::principal(&headers)?;
    let value = Money::parse(&req.value).map_err(AppError::from)?;
    let address = req.address.into_domain()?;

    let order = state
        .order_service
        .create_order(user_id, req.description, value, address)
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(OrderResponse::from_order(&order)),
    ))
}

/// GET /orders/{id} — load an order with its delivery record.
#[tracing::instrument(skip(state))]
pub async fn get<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailResponse>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let order_id = super::parse_order_id(&id)?;
    let details = state
        .order_service
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(OrderDetailResponse::from_details(&details)))
}

/// GET /orders/by-number/{number} — load an order by its human-facing number.
#[tracing::instrument(skip(state))]
pub async fn get_by_number<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    Path(number): Path<String>,
) -> Result<Json<OrderDetailResponse>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let order_number = OrderNumber::new(number.clone()).map_err(AppError::from)?;
    let details = state
        .order_service
        .get_order_by_number(&order_number)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {number} not found")))?;

    Ok(Json(OrderDetailResponse::from_details(&details)))
}

/// GET /orders — list orders for a user or in a status.
///
/// Exactly one of `user_id` and `status` must be given.
#[tracing::instrument(skip(state))]
pub async fn list<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let orders = match (query.user_id, query.status.as_deref()) {
        (Some(user_id), None) => {
            state
                .order_service
                .list_user_orders(UserId::from_uuid(user_id))
                .await?
        }
        (None, Some(status)) => {
            let status: OrderStatus = status.parse().map_err(AppError::from)?;
            state.order_service.list_orders_by_status(status).await?
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Provide exactly one of user_id or status".to_string(),
            ));
        }
    };

    let responses: Vec<OrderResponse> = orders.iter().map(OrderResponse::from_order).collect();
    Ok(Json(responses))
}

/// POST /orders/{id}/confirm — confirm a pending order.
#[tracing::instrument(skip(state))]
pub async fn confirm<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let order_id = super::parse_order_id(&id)?;
    let order = state.order_service.confirm_order(order_id).await?;
    Ok(Json(OrderResponse::from_order(&order)))
}

/// POST /orders/{id}/start-delivery — move a confirmed order into transit.
#[tracing::instrument(skip(state))]
pub async fn start_delivery<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let order_id = super::parse_order_id(&id)?;
    let order = state.order_service.start_delivery(order_id).await?;
    Ok(Json(OrderResponse::from_order(&order)))
}

/// POST /orders/{id}/cancel — cancel a pending order.
#[tracing::instrument(skip(state))]
pub async fn cancel<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let order_id = super::parse_order_id(&id)?;
    let order = state.order_service.cancel_order(order_id).await?;
    Ok(Json(OrderResponse::from_order(&order)))
}
