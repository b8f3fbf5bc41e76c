//! Game engine: cards, trick resolution, scoring, and the round/game
//! state machine.
//!
//! [`GameState`] is the single authoritative state for one room. It is not
//! internally synchronized; the room actor owns it and serializes every
//! mutation. Timed phases advance through discrete [`GameState::tick`]
//! steps rather than wall-clock timers, so the state machine is fully
//! deterministic under test.

pub mod cards;
pub mod scoring;
pub mod state;
pub mod trick;
pub mod view;

/// Seat position at the table, `0..SEATS`.
pub type SeatIndex = usize;

pub use cards::{Card, Deck, Rank, Suit};
pub use state::{ActionError, Announcement, GameState, Phase, Player, PlayerId, PlayerName};
pub use trick::{Trick, TrickPlay, TrickRecord};
pub use view::{GameView, PlayerView};
