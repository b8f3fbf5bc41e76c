//! Room actor: owns the game state and serializes all mutation.

use std::collections::HashMap;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    time::{Duration, interval},
};

use super::messages::{RoomMessage, RoomNotification, RoomResponse, RoomStatus};
use crate::game::{ActionError, GameState, PlayerId};

const INBOX_DEPTH: usize = 100;

/// The room's inbox has been dropped; no more messages will be handled.
#[derive(Clone, Copy, Debug, Error)]
#[error("room is closed")]
pub struct RoomClosed;

/// Handle for sending messages to the room.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
}

impl RoomHandle {
    pub async fn send(&self, message: RoomMessage) -> Result<(), RoomClosed> {
        self.sender.send(message).await.map_err(|_| RoomClosed)
    }
}

/// Actor managing a single room. Runs as one tokio task; the 1-second tick
/// drives the state machine's timed phases.
pub struct RoomActor {
    state: GameState,
    inbox: mpsc::Receiver<RoomMessage>,
    subscribers: HashMap<PlayerId, mpsc::Sender<RoomNotification>>,
}

impl RoomActor {
    pub fn new() -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_DEPTH);
        let actor = Self {
            state: GameState::new(),
            inbox,
            subscribers: HashMap::new(),
        };
        (actor, RoomHandle { sender })
    }

    /// Event loop: runs until every handle is dropped.
    pub async fn run(mut self) {
        info!("room starting");

        let mut tick_interval = interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else { break };
                    if self.handle_message(message) {
                        self.broadcast_changes();
                    }
                }
                _ = tick_interval.tick() => {
                    if self.state.tick() {
                        self.broadcast_changes();
                    }
                }
            }
        }

        info!("room closed");
    }

    /// Returns whether the message may have changed observable state.
    fn handle_message(&mut self, message: RoomMessage) -> bool {
        match message {
            RoomMessage::Join { name, response } => {
                let result = self.state.join(&name);
                let changed = result.is_ok();
                let _ = response.send(result);
                changed
            }
            RoomMessage::StartGame {
                player_id,
                response,
            } => Self::respond(self.state.start_game(player_id), response),
            RoomMessage::Bid {
                player_id,
                value,
                response,
            } => Self::respond(self.state.place_bid(player_id, value), response),
            RoomMessage::PlayCard {
                player_id,
                card,
                response,
            } => Self::respond(self.state.play_card(player_id, card), response),
            RoomMessage::GetView {
                player_id,
                response,
            } => {
                let _ = response.send(self.state.view_for(player_id));
                false
            }
            RoomMessage::GetStatus { response } => {
                let _ = response.send(RoomStatus {
                    phase: self.state.phase(),
                    round_number: self.state.round_number(),
                    player_count: self.state.players().len(),
                });
                false
            }
            RoomMessage::Chat { player_id, text } => {
                if let Some(from) = self.state.player_name(player_id) {
                    self.notify(RoomNotification::Chat { from, text });
                }
                false
            }
            RoomMessage::Emoji { player_id, symbol } => {
                if let Some(from) = self.state.player_name(player_id) {
                    self.notify(RoomNotification::Emoji { from, symbol });
                }
                false
            }
            RoomMessage::Disconnect { player_id } => {
                self.subscribers.remove(&player_id);
                self.state.leave(player_id)
            }
            RoomMessage::Subscribe { player_id, sender } => {
                // Prime the new subscriber so it renders the current state.
                let _ = sender.try_send(RoomNotification::StateChanged);
                self.subscribers.insert(player_id, sender);
                debug!("player {player_id} subscribed ({} total)", self.subscribers.len());
                false
            }
            RoomMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
                false
            }
        }
    }

    fn respond(
        result: Result<(), ActionError>,
        response: tokio::sync::oneshot::Sender<RoomResponse>,
    ) -> bool {
        let changed = result.is_ok();
        let reply = match result {
            Ok(()) => RoomResponse::Success,
            Err(error) => RoomResponse::Rejected(error),
        };
        let _ = response.send(reply);
        changed
    }

    /// Drains queued announcements and tells every subscriber to refresh.
    fn broadcast_changes(&mut self) {
        for event in self.state.drain_events() {
            debug!("{event}");
            self.notify(RoomNotification::Event(event.to_string()));
        }
        self.notify(RoomNotification::StateChanged);
    }

    /// Best-effort fan-out. A full subscriber misses this notification; a
    /// closed one is removed.
    fn notify(&mut self, notification: RoomNotification) {
        self.subscribers
            .retain(|player_id, sender| match sender.try_send(notification.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("subscriber {player_id} is lagging, dropping notification");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("subscriber {player_id} disconnected, removing");
                    false
                }
            });
    }
}
