//! Per-player projections of the authoritative state.
//!
//! Views are the only game data that ever leaves the room actor. A view
//! contains the recipient's own hand and, for everyone else, just a hand
//! size; nothing in a serialized [`GameView`] discloses another player's
//! cards.

use serde::{Deserialize, Serialize};

use super::SeatIndex;
use super::cards::{Card, Suit};
use super::state::{GameState, Phase, PlayerId, PlayerName};
use super::trick::TrickPlay;

/// What every recipient may know about a seated player.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlayerView {
    pub name: PlayerName,
    pub seat: SeatIndex,
    pub is_host: bool,
    pub bid: Option<u8>,
    pub tricks_won: u8,
    pub score: i32,
    pub hand_size: usize,
}

/// One recipient's complete picture of the game.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GameView {
    pub phase: Phase,
    pub round_number: u8,
    pub player_count: usize,
    pub players: Vec<PlayerView>,
    pub current_seat: Option<SeatIndex>,
    pub trump: Option<Suit>,
    pub dynamic_trump: Option<Suit>,
    pub lead_suit: Option<Suit>,
    pub trick: Vec<TrickPlay>,
    /// The recipient's own cards; always empty for other players' views.
    pub hand: Vec<Card>,
    pub trick_winner: Option<SeatIndex>,
    /// Remaining ticks of the current timed phase, if any.
    pub countdown: Option<u8>,
    /// Present only once the game completes; ties appear as a group.
    pub winners: Option<Vec<PlayerName>>,
}

impl GameState {
    /// Projection for one recipient, or `None` if the id isn't seated.
    pub fn view_for(&self, id: PlayerId) -> Option<GameView> {
        let seat = self.seat_of(id)?;
        let players = self
            .players()
            .iter()
            .map(|player| PlayerView {
                name: player.name.clone(),
                seat: player.seat,
                is_host: player.is_host,
                bid: self.bids()[player.seat],
                tricks_won: self.tricks_won()[player.seat],
                score: self.scores()[player.seat],
                hand_size: self.hand(player.seat).len(),
            })
            .collect();

        let countdown = match self.phase() {
            Phase::TrickDisplay | Phase::RoundComplete | Phase::GameComplete | Phase::Ended => {
                Some(self.phase_ticks())
            }
            _ => None,
        };
        let winners = (self.phase() == Phase::GameComplete).then(|| self.winners());

        Some(GameView {
            phase: self.phase(),
            round_number: self.round_number(),
            player_count: self.players().len(),
            players,
            current_seat: self.current_seat(),
            trump: self.trump(),
            dynamic_trump: self.dynamic_trump(),
            lead_suit: self.trick().lead_suit(),
            trick: self.trick().plays().to_vec(),
            hand: self.hand(seat).to_vec(),
            trick_winner: self.trick_winner(),
            countdown,
            winners,
        })
    }

    /// Projections for every seated player.
    pub fn views(&self) -> Vec<(PlayerId, GameView)> {
        self.players()
            .iter()
            .filter_map(|player| Some((player.id, self.view_for(player.id)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::state::{GameState, SEATS};
    use super::*;

    #[test]
    fn views_disclose_only_the_recipients_hand() {
        let mut state = GameState::new();
        let ids: Vec<PlayerId> = ["alice", "bob", "carol", "dave"]
            .iter()
            .map(|name| state.join(name).unwrap())
            .collect();
        state.start_game(ids[0]).unwrap();

        let views = state.views();
        assert_eq!(views.len(), SEATS);
        for (id, view) in views {
            let seat = state.seat_of(id).unwrap();
            assert_eq!(view.hand, state.hand(seat));
            for player in &view.players {
                assert_eq!(player.hand_size, 1);
            }
        }
    }

    #[test]
    fn serialized_view_never_contains_other_hands() {
        let mut state = GameState::new();
        let ids: Vec<PlayerId> = ["alice", "bob", "carol", "dave"]
            .iter()
            .map(|name| state.join(name).unwrap())
            .collect();
        state.start_game(ids[0]).unwrap();

        let view = state.view_for(ids[0]).unwrap();
        let json = serde_json::to_string(&view).unwrap();
        for seat in 1..SEATS {
            for card in state.hand(seat) {
                let encoded = serde_json::to_string(card).unwrap();
                assert!(
                    !json.contains(&encoded),
                    "view for seat 0 leaks a card of seat {seat}"
                );
            }
        }
    }

    #[test]
    fn unknown_recipient_gets_no_view() {
        let state = GameState::new();
        assert!(state.view_for(PlayerId::new_v4()).is_none());
    }
}
