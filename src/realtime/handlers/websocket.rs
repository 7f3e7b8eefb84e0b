//! WebSocket handler for the daily-report realtime channel

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, WebSocketUpgrade,
    },
    response::IntoResponse,
    Extension,
};
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::common::{ApiError, AppState};
use crate::realtime::models::WsMessage;
use crate::realtime::services::{RoomRegistry, CONNECTION_BUFFER};
use crate::reports::services::validate_date_key;
use crate::services::jwt;

/// GET /ws/daily-report?token=<jwt>
///
/// The session token gates the upgrade: without valid claims the connection
/// is rejected before any room operation is possible.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = params
        .get("token")
        .ok_or_else(|| ApiError::Unauthorized("missing authentication token".to_string()))?;

    let state = state_lock.read().await.clone();

    let claims = jwt::validate(token, &state.jwt_secret)
        .ok_or_else(|| ApiError::Unauthorized("invalid token".to_string()))?;

    info!(user_id = %claims.sub, "WebSocket connection authenticated");

    let rooms = state.rooms.clone();
    let user_id = claims.sub;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, user_id, rooms)))
}

async fn handle_socket(socket: WebSocket, user_id: String, rooms: RoomRegistry) {
    let connection_id = uuid::Uuid::new_v4().to_string();

    info!(
        user_id = %user_id,
        connection_id = %connection_id,
        "WebSocket connection established"
    );

    let (mut sender, mut receiver) = socket.split();

    // Bounded outbound buffer; the registry drops us if it ever fills up
    let (tx, mut rx) = mpsc::channel::<Message>(CONNECTION_BUFFER);

    rooms.register(connection_id.clone(), tx).await;

    let connected = WsMessage::Connected {
        user_id: user_id.clone(),
    };
    if let Ok(json) = serde_json::to_string(&connected) {
        let _ = sender.send(Message::Text(json)).await;
    }

    // Forward queued messages to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let recv_rooms = rooms.clone();
    let recv_connection_id = connection_id.clone();
    let recv_user_id = user_id.clone();

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            handle_message(msg, &recv_user_id, &recv_connection_id, &recv_rooms).await;
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    // Drop membership; missed events are not replayed, the client re-fetches
    // and re-joins after reconnecting
    rooms.unregister(&connection_id).await;

    info!(
        user_id = %user_id,
        connection_id = %connection_id,
        "WebSocket connection closed"
    );
}

async fn handle_message(msg: Message, user_id: &str, connection_id: &str, rooms: &RoomRegistry) {
    match msg {
        Message::Text(text) => {
            let parsed: Result<WsMessage, _> = serde_json::from_str(&text);
            match parsed {
                Ok(ws_msg) => {
                    handle_ws_message(ws_msg, user_id, connection_id, rooms).await;
                }
                Err(e) => {
                    debug!(
                        connection_id = %connection_id,
                        error = %e,
                        "Received malformed realtime message"
                    );
                    rooms
                        .send_to(
                            connection_id,
                            &WsMessage::Error {
                                code: "BAD_MESSAGE".to_string(),
                                message: format!("invalid message format: {}", e),
                            },
                        )
                        .await;
                }
            }
        }
        Message::Ping(_) | Message::Pong(_) => {
            debug!(connection_id = %connection_id, "Transport heartbeat");
        }
        Message::Close(_) => {
            debug!(connection_id = %connection_id, "Received close frame");
        }
        Message::Binary(_) => {
            warn!(connection_id = %connection_id, "Ignoring binary message");
        }
    }
}

async fn handle_ws_message(
    msg: WsMessage,
    user_id: &str,
    connection_id: &str,
    rooms: &RoomRegistry,
) {
    match msg {
        WsMessage::JoinDateRoom { date } => {
            if validate_date_key(&date).is_err() {
                rooms
                    .send_to(
                        connection_id,
                        &WsMessage::Error {
                            code: "BAD_DATE".to_string(),
                            message: format!("invalid date key: {}", date),
                        },
                    )
                    .await;
                return;
            }

            rooms.join(connection_id, &date).await;
            debug!(
                user_id = %user_id,
                connection_id = %connection_id,
                date = %date,
                "Subscribed to date room"
            );
        }
        WsMessage::LeaveDateRoom { date } => {
            rooms.leave(connection_id, &date).await;
            debug!(
                user_id = %user_id,
                connection_id = %connection_id,
                date = %date,
                "Unsubscribed from date room"
            );
        }
        WsMessage::Ping => {
            rooms.send_to(connection_id, &WsMessage::Pong).await;
        }
        other => {
            warn!(
                connection_id = %connection_id,
                message = ?other,
                "Received unsupported message type from client"
            );
        }
    }
}
