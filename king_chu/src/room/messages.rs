//! Messages understood by the room actor.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::game::{ActionError, Card, GameView, Phase, PlayerId, PlayerName};

/// Commands sent to the room actor. Replies travel on oneshot channels so
/// a slow caller never blocks the actor.
#[derive(Debug)]
pub enum RoomMessage {
    /// Seat a new player; the reply carries their stable id.
    Join {
        name: String,
        response: oneshot::Sender<Result<PlayerId, ActionError>>,
    },
    StartGame {
        player_id: PlayerId,
        response: oneshot::Sender<RoomResponse>,
    },
    Bid {
        player_id: PlayerId,
        value: u8,
        response: oneshot::Sender<RoomResponse>,
    },
    PlayCard {
        player_id: PlayerId,
        card: Card,
        response: oneshot::Sender<RoomResponse>,
    },
    /// Fetch the caller's projection of the game.
    GetView {
        player_id: PlayerId,
        response: oneshot::Sender<Option<GameView>>,
    },
    /// Room summary for health reporting.
    GetStatus {
        response: oneshot::Sender<RoomStatus>,
    },
    /// Relayed to subscribers; never touches game state.
    Chat { player_id: PlayerId, text: String },
    /// Relayed to subscribers; never touches game state.
    Emoji { player_id: PlayerId, symbol: String },
    /// The player's connection is gone; aborts an in-progress game.
    Disconnect { player_id: PlayerId },
    /// Register a notification channel for this player's connection.
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<RoomNotification>,
    },
    Unsubscribe { player_id: PlayerId },
}

/// Outcome of a player action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoomResponse {
    Success,
    Rejected(ActionError),
}

impl RoomResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, RoomResponse::Success)
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            RoomResponse::Success => None,
            RoomResponse::Rejected(error) => Some(error.to_string()),
        }
    }
}

/// Summary used by the health endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct RoomStatus {
    pub phase: Phase,
    pub round_number: u8,
    pub player_count: usize,
}

/// Pushed to subscribed connections. Delivery is best-effort: the actor
/// uses `try_send` and a full subscriber simply misses the notification.
#[derive(Clone, Debug)]
pub enum RoomNotification {
    /// The authoritative state changed; fetch a fresh view.
    StateChanged,
    /// A broadcast game event line, already rendered.
    Event(String),
    Chat { from: PlayerName, text: String },
    Emoji { from: PlayerName, symbol: String },
}
