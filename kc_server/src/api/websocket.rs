//! WebSocket handler for real-time game communication.
//!
//! A client connects with `GET /ws?name=...`. The handler seats the
//! player before upgrading, so capacity and name rejections come back as
//! plain HTTP errors. After the upgrade the connection splits into a send
//! task (room notifications and command rejections out) and a receive
//! loop (client commands in). Closing the socket disconnects the player,
//! which aborts an in-progress game.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use king_chu::{Card, GameView, PlayerId, RoomMessage, RoomNotification, RoomResponse};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use super::{AppState, rate_limiter::RateLimiter};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    name: String,
}

/// Commands a client may send over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    StartGame,
    Bid { amount: u8 },
    PlayCard { card: Card },
    Chat { text: String },
    Emoji { symbol: String },
}

/// Frames sent to the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerFrame {
    /// A fresh projection of the game for this player.
    State { view: GameView },
    /// A broadcast game event line.
    Event { message: String },
    Chat { from: String, text: String },
    Emoji { from: String, symbol: String },
    /// A rejected command or transport problem; only the sender sees it.
    Error { message: String },
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let (tx, rx) = oneshot::channel();
    let join = RoomMessage::Join {
        name: query.name,
        response: tx,
    };
    if state.room.send(join).await.is_err() {
        return (StatusCode::SERVICE_UNAVAILABLE, "room is closed").into_response();
    }

    match rx.await {
        Ok(Ok(player_id)) => ws.on_upgrade(move |socket| handle_socket(socket, player_id, state)),
        Ok(Err(rejection)) => (StatusCode::CONFLICT, rejection.to_string()).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "room is closed").into_response(),
    }
}

async fn handle_socket(socket: WebSocket, player_id: PlayerId, state: AppState) {
    info!("websocket connected: player={player_id}");
    let (mut sender, mut receiver) = socket.split();

    let mut burst_limiter = RateLimiter::burst();
    let mut sustained_limiter = RateLimiter::sustained();

    // Rejections for this connection's own commands.
    let (response_tx, mut response_rx) = mpsc::channel::<String>(state.ws_queue_depth);
    // Room notifications fanned out to every subscriber.
    let (notification_tx, mut notification_rx) =
        mpsc::channel::<RoomNotification>(state.ws_queue_depth);

    let subscribe = RoomMessage::Subscribe {
        player_id,
        sender: notification_tx,
    };
    if state.room.send(subscribe).await.is_err() {
        return;
    }

    let send_state = state.clone();
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                notification = notification_rx.recv() => {
                    let Some(notification) = notification else { break };
                    let Some(frame) = render(notification, player_id, &send_state).await else {
                        continue;
                    };
                    match serde_json::to_string(&frame) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => error!("failed to serialize frame: {e}"),
                    }
                }
                response = response_rx.recv() => {
                    let Some(json) = response else { break };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if !burst_limiter.check() || !sustained_limiter.check() {
                    warn!("rate limit exceeded for player {player_id}");
                    send_error(&response_tx, "Rate limit exceeded. Please slow down.").await;
                    continue;
                }

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(command) => {
                        if let Some(reason) = forward(command, player_id, &state).await {
                            send_error(&response_tx, &reason).await;
                        }
                    }
                    Err(e) => {
                        warn!("failed to parse client message: {e}");
                        send_error(&response_tx, "Invalid message format").await;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("websocket closing: player={player_id}");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!("websocket error for player {player_id}: {e}");
                break;
            }
        }
    }

    send_task.abort();
    let _ = state.room.send(RoomMessage::Unsubscribe { player_id }).await;
    let _ = state.room.send(RoomMessage::Disconnect { player_id }).await;
    info!("websocket disconnected: player={player_id}");
}

/// Turn a room notification into an outbound frame. `StateChanged` costs a
/// view round-trip; the rest are direct translations.
async fn render(
    notification: RoomNotification,
    player_id: PlayerId,
    state: &AppState,
) -> Option<ServerFrame> {
    match notification {
        RoomNotification::StateChanged => {
            let (tx, rx) = oneshot::channel();
            let get_view = RoomMessage::GetView {
                player_id,
                response: tx,
            };
            state.room.send(get_view).await.ok()?;
            let view = rx.await.ok()??;
            Some(ServerFrame::State { view })
        }
        RoomNotification::Event(message) => Some(ServerFrame::Event { message }),
        RoomNotification::Chat { from, text } => Some(ServerFrame::Chat {
            from: from.to_string(),
            text,
        }),
        RoomNotification::Emoji { from, symbol } => Some(ServerFrame::Emoji {
            from: from.to_string(),
            symbol,
        }),
    }
}

/// Forward a parsed client command to the room; returns the rejection
/// reason if the room refused it.
async fn forward(command: ClientMessage, player_id: PlayerId, state: &AppState) -> Option<String> {
    match command {
        ClientMessage::StartGame => {
            act(state, |response| RoomMessage::StartGame {
                player_id,
                response,
            })
            .await
        }
        ClientMessage::Bid { amount } => {
            act(state, |response| RoomMessage::Bid {
                player_id,
                value: amount,
                response,
            })
            .await
        }
        ClientMessage::PlayCard { card } => {
            act(state, |response| RoomMessage::PlayCard {
                player_id,
                card,
                response,
            })
            .await
        }
        ClientMessage::Chat { text } => {
            let _ = state.room.send(RoomMessage::Chat { player_id, text }).await;
            None
        }
        ClientMessage::Emoji { symbol } => {
            let _ = state
                .room
                .send(RoomMessage::Emoji { player_id, symbol })
                .await;
            None
        }
    }
}

async fn act<F>(state: &AppState, make: F) -> Option<String>
where
    F: FnOnce(oneshot::Sender<RoomResponse>) -> RoomMessage,
{
    let (tx, rx) = oneshot::channel();
    if state.room.send(make(tx)).await.is_err() {
        return Some("room is closed".to_string());
    }
    match rx.await {
        Ok(response) => response.error_message(),
        Err(_) => Some("room is closed".to_string()),
    }
}

async fn send_error(response_tx: &mpsc::Sender<String>, message: &str) {
    let frame = ServerFrame::Error {
        message: message.to_string(),
    };
    if let Ok(json) = serde_json::to_string(&frame) {
        let _ = response_tx.send(json).await;
    }
}
