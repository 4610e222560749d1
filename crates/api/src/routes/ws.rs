//! Live push stream over WebSocket.
//!
//! A session carries the user's own notification feed from the moment it
//! connects; `join_order` / `leave_order` frames let it follow individual
//! orders as well.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use common::{ConnectionId, OrderId, UserId};
use futures_util::sink::SinkExt;
use futures_util::stream::{SplitSink, StreamExt};
use realtime::PushMessage;
use serde::Deserialize;
use storage::{DeliveryRepository, NotificationRepository, OrderRepository};

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub user_id: Option<uuid::Uuid>,
}

/// Frames a client may send over an open session.
#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ClientFrame {
    JoinOrder {
        #[serde(rename = "orderId")]
        order_id: uuid::Uuid,
    },
    LeaveOrder {
        #[serde(rename = "orderId")]
        order_id: uuid::Uuid,
    },
}

/// GET /ws — upgrade to a push session for the given user.
#[tracing::instrument(skip(state, ws))]
pub async fn connect<O, D, N>(
    State(state): State<Arc<AppState<O, D, N>>>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let user_id = query
        .user_id
        .map(UserId::from_uuid)
        .ok_or_else(|| ApiError::BadRequest("Missing user_id query parameter".to_string()))?;

    Ok(ws.on_upgrade(move |socket| client_session(state, socket, user_id)))
}

async fn client_session<O, D, N>(state: Arc<AppState<O, D, N>>, socket: WebSocket, user_id: UserId)
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    metrics::counter!("ws_connections_total").increment(1);

    let mut session = state.dispatcher.connect(user_id).await;
    let connection_id = session.connection_id();
    tracing::info!(%connection_id, %user_id, "websocket session opened");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            push = session.recv() => {
                let Some(push) = push else { break };
                if send_frame(&mut sink, &push).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) =
                            handle_frame(&state, connection_id, user_id, text.as_str()).await
                        {
                            if send_frame(&mut sink, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if sink.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(%connection_id, error = %e, "websocket read error");
                        break;
                    }
                }
            }
        }
    }

    state.dispatcher.disconnect(connection_id).await;
    tracing::info!(%connection_id, %user_id, "websocket session closed");
}

async fn handle_frame<O, D, N>(
    state: &AppState<O, D, N>,
    connection_id: ConnectionId,
    user_id: UserId,
    text: &str,
) -> Option<PushMessage>
where
    O: OrderRepository + Clone + 'static,
    D: DeliveryRepository + 'static,
    N: NotificationRepository + Clone + 'static,
{
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(_) => return Some(PushMessage::error("Unrecognized frame")),
    };

    match frame {
        ClientFrame::JoinOrder { order_id } => {
            let order_id = OrderId::from_uuid(order_id);
            match state
                .dispatcher
                .join_order(connection_id, user_id, order_id)
                .await
            {
                Ok(()) => None,
                Err(e) => Some(PushMessage::error(e.to_string())),
            }
        }
        ClientFrame::LeaveOrder { order_id } => {
            state
                .dispatcher
                .leave_order(connection_id, OrderId::from_uuid(order_id))
                .await;
            None
        }
    }
}

async fn send_frame(
    sink: &mut SplitSink<WebSocket, Message>,
    frame: &PushMessage,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(frame) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize push frame");
            return Ok(());
        }
    };
    sink.send(Message::Text(text.into())).await
}
