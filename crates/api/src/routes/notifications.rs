//! Notification feed endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use common::NotificationId;
use domain::Notification;
use serde::{Deserialize, Serialize};
use storage::{DeliveryRepository, NotificationRepository, OrderRepository};

use crate::error::ApiError;
use crate::routes::orders::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

// -- Response types --

#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub read: bool,
    pub read_at: Option<String>,
    pub created_at: String,
}

impl NotificationResponse {
    fn from_notification(notification: &Notification) -> Self {
        Self {
            id: notification.id().to_string(),
            user_id: notification.user_id().to_string(),
            kind: notification.kind().as_str().to_string(),
            message: notification.message().to_string(),
            data: notification.data().cloned(),
            read: notification.is_read(),
            read_at: notification.read_at().map(|at| at.to_rfc3339()),
            created_at: notification.created_at().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

// -- Handlers --

/// GET /notifications — list the requesting user's notifications, newest first.
#[tracing::instrument(skip(state, headers))]
pub async fn list<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    headers: HeaderMap,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let user_id = super::principal(&headers)?;
    let notifications = state
        .notification_service
        .list_notifications(user_id, query.unread_only)
        .await?;

    let responses: Vec<NotificationResponse> = notifications
        .iter()
        .map(NotificationResponse::from_notification)
        .collect();
    Ok(Json(responses))
}

/// GET /notifications/unread-count — count the requesting user's unread notifications.
#[tracing::instrument(skip(state, headers))]
pub async fn unread_count<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    headers: HeaderMap,
) -> Result<Json<UnreadCountResponse>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let user_id = super::principal(&headers)?;
    let count = state.notification_service.unread_count(user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// POST /notifications/{id}/read — mark one notification as read.
#[tracing::instrument(skip(state, headers))]
pub async fn mark_read<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let user_id = super::principal(&headers)?;
    let notification_id = parse_notification_id(&id)?;

    let notification = state
        .notification_service
        .mark_as_read(notification_id, user_id)
        .await?;

    Ok(Json(NotificationResponse::from_notification(&notification)))
}

/// POST /notifications/read-all — mark all of the requesting user's notifications as read.
#[tracing::instrument(skip(state, headers))]
pub async fn mark_all_read<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    headers: HeaderMap,
) -> Result<Json<MarkAllReadResponse>, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let user_id = super::principal(&headers)?;
    let updated = state.notification_service.mark_all_as_read(user_id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

fn parse_notification_id(id: &str) -> Result<NotificationId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(NotificationId::from_uuid(uuid))
}
