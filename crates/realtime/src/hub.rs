//! Session registry and topic fan-out.

use std::collections::{HashMap, HashSet};

use common::{ConnectionId, OrderId, UserId};
use tokio::sync::{RwLock, mpsc};

use crate::message::PushMessage;

/// A fan-out topic. Every session is subscribed to its owner's user topic;
/// order topics are joined and left explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    User(UserId),
    Order(OrderId),
}

impl Topic {
    /// Returns the canonical topic key.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::User(user_id) => write!(f, "user:{user_id}"),
            Topic::Order(order_id) => write!(f, "order:{order_id}"),
        }
    }
}

/// The receiving side of a connected session.
///
/// Held by the transport layer; messages published to any topic the session
/// belongs to arrive on this handle. Dropping it marks the session dead, and
/// the next `disconnect` removes the bookkeeping.
pub struct SessionHandle {
    connection_id: ConnectionId,
    user_id: UserId,
    receiver: mpsc::UnboundedReceiver<PushMessage>,
}

impl SessionHandle {
    /// Returns the connection ID of this session.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Returns the authenticated user who owns this session.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Waits for the next pushed message.
    ///
    /// Returns `None` once the session has been disconnected from the hub.
    pub async fn recv(&mut self) -> Option<PushMessage> {
        self.receiver.recv().await
    }

    /// Returns the next pushed message without waiting, if one is queued.
    pub fn try_recv(&mut self) -> Option<PushMessage> {
        self.receiver.try_recv().ok()
    }
}

struct Session {
    user_id: UserId,
    sender: mpsc::UnboundedSender<PushMessage>,
    topics: HashSet<Topic>,
}

#[derive(Default)]
struct HubState {
    sessions: HashMap<ConnectionId, Session>,
    topics: HashMap<Topic, HashSet<ConnectionId>>,
}

/// In-process pub/sub hub for real-time pushes.
///
/// Sessions register on connect and are added to their user topic
/// automatically. Publishing snapshots the subscriber list under a read
/// lock and sends outside it, so a slow or dead session never blocks the
/// hub or its siblings.
///
/// This is the single-instance seam: a multi-instance deployment would put
/// an external pub/sub behind the same publish surface.
#[derive(Default)]
pub struct Hub {
    state: RwLock<HubState>,
}

impl Hub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session for an authenticated user.
    ///
    /// The session is subscribed to the user's own topic before this
    /// returns, so a publish racing with connect is either delivered or
    /// predates the session.
    pub async fn connect(&self, user_id: UserId) -> SessionHandle {
        let connection_id = ConnectionId::new();
        let (sender, receiver) = mpsc::unbounded_channel();
        let user_topic = Topic::User(user_id);

        let mut state = self.state.write().await;
        state.sessions.insert(
            connection_id,
            Session {
                user_id,
                sender,
                topics: HashSet::from([user_topic]),
            },
        );
        state
            .topics
            .entry(user_topic)
            .or_default()
            .insert(connection_id);
        drop(state);

        metrics::counter!("realtime_sessions_connected").increment(1);
        tracing::debug!(%connection_id, %user_id, "session connected");

        SessionHandle {
            connection_id,
            user_id,
            receiver,
        }
    }

    /// Removes a session and all of its topic memberships.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let mut state = self.state.write().await;
        let Some(session) = state.sessions.remove(&connection_id) else {
            return;
        };

        for topic in &session.topics {
            if let Some(members) = state.topics.get_mut(topic) {
                members.remove(&connection_id);
                if members.is_empty() {
                    state.topics.remove(topic);
                }
            }
        }
        drop(state);

        tracing::debug!(%connection_id, "session disconnected");
    }

    /// Adds a session to a topic. Returns false if the session is unknown.
    pub async fn join(&self, connection_id: ConnectionId, topic: Topic) -> bool {
        let mut state = self.state.write().await;
        let Some(session) = state.sessions.get_mut(&connection_id) else {
            return false;
        };

        session.topics.insert(topic);
        state.topics.entry(topic).or_default().insert(connection_id);
        drop(state);

        tracing::debug!(%connection_id, %topic, "joined topic");
        true
    }

    /// Removes a session from a topic. Returns false if the session is
    /// unknown or was not a member.
    pub async fn leave(&self, connection_id: ConnectionId, topic: Topic) -> bool {
        let mut state = self.state.write().await;
        let Some(session) = state.sessions.get_mut(&connection_id) else {
            return false;
        };
        if !session.topics.remove(&topic) {
            return false;
        }

        if let Some(members) = state.topics.get_mut(&topic) {
            members.remove(&connection_id);
            if members.is_empty() {
                state.topics.remove(&topic);
            }
        }
        drop(state);

        tracing::debug!(%connection_id, %topic, "left topic");
        true
    }

    /// Delivers a message to every session subscribed to the topic.
    ///
    /// Returns the number of sessions the message was handed to. Sessions
    /// whose receiver is gone are skipped; they are cleaned up when their
    /// transport calls `disconnect`.
    #[tracing::instrument(skip(self, message), fields(topic = %topic))]
    pub async fn publish(&self, topic: &Topic, message: PushMessage) -> usize {
        let recipients: Vec<(ConnectionId, mpsc::UnboundedSender<PushMessage>)> = {
            let state = self.state.read().await;
            let Some(members) = state.topics.get(topic) else {
                return 0;
            };
            members
                .iter()
                .filter_map(|id| {
                    state
                        .sessions
                        .get(id)
                        .map(|session| (*id, session.sender.clone()))
                })
                .collect()
        };

        let mut delivered = 0;
        for (connection_id, sender) in recipients {
            if sender.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(%connection_id, "skipping dead session");
            }
        }

        metrics::counter!("realtime_messages_delivered").increment(delivered as u64);
        delivered
    }

    /// Returns the number of connected sessions.
    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    /// Returns the number of sessions subscribed to a topic.
    pub async fn subscriber_count(&self, topic: &Topic) -> usize {
        self.state
            .read()
            .await
            .topics
            .get(topic)
            .map_or(0, |members| members.len())
    }
}
