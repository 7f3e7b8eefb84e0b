//! Per-date room registry and broadcast fan-out.
//!
//! The membership table is the one hot shared mutable structure in the
//! process. Every mutation path (join, leave, disconnect, broadcast pruning)
//! goes through the single RwLock below, so a join and a concurrent
//! broadcast can interleave but never corrupt membership.

use axum::extract::ws::Message;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::realtime::models::WsMessage;

/// Bound on the per-connection outbound buffer. A subscriber that falls this
/// far behind is disconnected rather than allowed to block the broadcaster.
pub const CONNECTION_BUFFER: usize = 64;

struct RegistryInner {
    /// connection_id -> outbound channel
    connections: HashMap<String, mpsc::Sender<Message>>,
    /// date key -> subscribed connection ids
    rooms: HashMap<String, HashSet<String>>,
    /// connection_id -> joined date keys, for cleanup on disconnect
    subscriptions: HashMap<String, HashSet<String>>,
}

/// Manages date-room membership for live report updates
#[derive(Clone)]
pub struct RoomRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner {
                connections: HashMap::new(),
                rooms: HashMap::new(),
                subscriptions: HashMap::new(),
            })),
        }
    }

    /// Register a new connection with its outbound channel
    pub async fn register(&self, connection_id: String, sender: mpsc::Sender<Message>) {
        let mut inner = self.inner.write().await;
        inner.connections.insert(connection_id.clone(), sender);
        inner.subscriptions.insert(connection_id.clone(), HashSet::new());

        info!(connection_id = %connection_id, "Realtime connection registered");
    }

    /// Remove a connection from the registry and from every room it joined.
    /// Disconnects are not errors; the client re-joins on reconnect and the
    /// server never replays missed events.
    pub async fn unregister(&self, connection_id: &str) {
        let mut inner = self.inner.write().await;
        Self::remove_locked(&mut inner, connection_id);

        info!(connection_id = %connection_id, "Realtime connection unregistered");
    }

    fn remove_locked(inner: &mut RegistryInner, connection_id: &str) {
        inner.connections.remove(connection_id);
        if let Some(dates) = inner.subscriptions.remove(connection_id) {
            for date in dates {
                if let Some(members) = inner.rooms.get_mut(&date) {
                    members.remove(connection_id);
                    if members.is_empty() {
                        inner.rooms.remove(&date);
                    }
                }
            }
        }
    }

    /// Idempotently subscribe a connection to a date room.
    /// Returns false for an unknown connection.
    pub async fn join(&self, connection_id: &str, date: &str) -> bool {
        let mut inner = self.inner.write().await;

        if !inner.connections.contains_key(connection_id) {
            return false;
        }

        inner
            .rooms
            .entry(date.to_string())
            .or_default()
            .insert(connection_id.to_string());
        if let Some(dates) = inner.subscriptions.get_mut(connection_id) {
            dates.insert(date.to_string());
        }

        debug!(connection_id = %connection_id, date = %date, "Joined date room");
        true
    }

    /// Idempotently unsubscribe a connection from a date room
    pub async fn leave(&self, connection_id: &str, date: &str) {
        let mut inner = self.inner.write().await;

        if let Some(members) = inner.rooms.get_mut(date) {
            members.remove(connection_id);
            if members.is_empty() {
                inner.rooms.remove(date);
            }
        }
        if let Some(dates) = inner.subscriptions.get_mut(connection_id) {
            dates.remove(date);
        }

        debug!(connection_id = %connection_id, date = %date, "Left date room");
    }

    /// Deliver a message to every connection subscribed to `date`, at most
    /// once per connection. Fan-out never blocks: a subscriber whose buffer
    /// is full (or whose channel is closed) is dropped from the registry.
    /// Returns the number of connections the message was handed to.
    pub async fn broadcast(&self, date: &str, message: &WsMessage) -> usize {
        let payload = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize broadcast message");
                return 0;
            }
        };

        let mut inner = self.inner.write().await;

        let members: Vec<String> = match inner.rooms.get(date) {
            Some(members) => members.iter().cloned().collect(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut dead: Vec<String> = Vec::new();

        for connection_id in members {
            let Some(sender) = inner.connections.get(&connection_id) else {
                dead.push(connection_id);
                continue;
            };
            match sender.try_send(Message::Text(payload.clone())) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        connection_id = %connection_id,
                        date = %date,
                        error = %e,
                        "Dropping unresponsive subscriber"
                    );
                    dead.push(connection_id);
                }
            }
        }

        for connection_id in dead {
            Self::remove_locked(&mut inner, &connection_id);
        }

        delivered
    }

    /// Send a message to one connection, dropping it if unreachable
    pub async fn send_to(&self, connection_id: &str, message: &WsMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(_) => return,
        };

        let mut inner = self.inner.write().await;
        let dead = match inner.connections.get(connection_id) {
            Some(sender) => sender.try_send(Message::Text(payload)).is_err(),
            None => false,
        };
        if dead {
            Self::remove_locked(&mut inner, connection_id);
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    pub async fn room_size(&self, date: &str) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(date)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    pub async fn is_subscribed(&self, connection_id: &str, date: &str) -> bool {
        self.inner
            .read()
            .await
            .rooms
            .get(date)
            .map(|m| m.contains(connection_id))
            .unwrap_or(false)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
