//! # King Chu Bridge
//!
//! Authoritative engine for King Chu Bridge, a four-player trick-taking
//! card game played over thirteen rounds of increasing size. Round N deals
//! N cards per player; players bid the number of tricks they expect to win,
//! then play out the round under must-follow-suit rules with a flipped
//! trump suit (round 13 uses a dynamic trump set by each trick's lead).
//! Exact bids score `10 + bid²`, misses score `-(bid - won)²`.
//!
//! ## Architecture
//!
//! - [`game`] — cards, trick resolution, scoring, the round/game state
//!   machine, and per-player view projection.
//! - [`room`] — the async actor that owns a single [`game::GameState`],
//!   serializes all mutation through an mpsc inbox, drives timed phases
//!   with a once-per-second tick, and fans notifications out to
//!   subscribed connections.
//!
//! The engine is transport-agnostic: a server crate bridges WebSocket
//! clients to [`room::RoomMessage`]s and renders [`game::GameView`]s.

pub mod game;
pub mod room;

pub use game::{
    ActionError, Announcement, Card, Deck, GameState, GameView, Phase, Player, PlayerId,
    PlayerName, PlayerView, Rank, Suit, Trick,
};
pub use room::{
    RoomActor, RoomClosed, RoomHandle, RoomMessage, RoomNotification, RoomResponse, RoomStatus,
};
