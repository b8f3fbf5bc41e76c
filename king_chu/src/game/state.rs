//! The round/game state machine.
//!
//! One [`GameState`] per room, owned and mutated only by the room actor, so
//! no internal locking. Player actions validate against the current phase
//! and turn; a rejected action returns an [`ActionError`] and leaves the
//! state untouched. Timed phases (trick display, round pause, abort grace,
//! game-over linger) advance by discrete [`GameState::tick`] steps. Each
//! completed countdown changes the phase discriminant, so a transition can
//! never fire twice.

use std::collections::VecDeque;
use std::fmt;

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::SeatIndex;
use super::cards::{Card, Deck, Suit};
use super::scoring::{self, Score};
use super::trick::{self, Trick, TrickRecord};

/// Number of seats at the table.
pub const SEATS: usize = 4;

/// Rounds per game; round N deals N cards to each player.
pub const FINAL_ROUND: u8 = 13;

/// Ticks a resolved trick stays on display before the winner leads.
pub const TRICK_DISPLAY_TICKS: u8 = 3;

/// Ticks between a round's scoring and the next deal.
pub const ROUND_PAUSE_TICKS: u8 = 3;

/// Ticks an aborted game lingers before the room resets to the lobby.
pub const ABORT_GRACE_TICKS: u8 = 5;

/// Ticks the final standings stay up before returning to the lobby.
pub const GAME_OVER_TICKS: u8 = 10;

/// Opaque stable player identifier, assigned at join time. Never derived
/// from the display name.
pub type PlayerId = Uuid;

/// Display name: trimmed, inner whitespace collapsed to underscores, and
/// length-capped.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    const MAX_LEN: usize = 24;

    pub fn new(raw: &str) -> Self {
        let mut name: String = raw
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        name.truncate(Self::MAX_LEN);
        Self(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(PlayerName::new(&raw))
    }
}

/// A seated player. Seat indices are a permutation of `0..SEATS` and stay
/// fixed for the duration of a game; exactly one player is host at a time.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    pub seat: SeatIndex,
    pub is_host: bool,
}

/// State machine discriminant.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Lobby: players join and leave freely.
    Waiting,
    /// Transient: deck shuffled, hands dealt, trump flipped.
    Dealing,
    /// Players bid in turn order.
    Bidding,
    /// Players play cards in turn order.
    Playing,
    /// A resolved trick is shown for a short countdown.
    #[serde(rename = "trick_winner_display")]
    TrickDisplay,
    /// Round scored; pause before the next deal.
    RoundComplete,
    /// Final standings shown, then the room returns to the lobby.
    GameComplete,
    /// A player left mid-game; short grace period, then reset.
    Ended,
}

/// Why a player action was rejected. Returned only to the acting player.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ActionError {
    #[error("name can't be empty")]
    EmptyName,
    #[error("name already taken")]
    NameTaken,
    #[error("room is full")]
    RoomFull,
    #[error("game already in progress")]
    GameInProgress,
    #[error("only the host can start the game")]
    NotHost,
    #[error("need {SEATS} players to start")]
    NotEnoughPlayers,
    #[error("not your turn")]
    OutOfTurn,
    #[error("that action isn't allowed right now")]
    WrongPhase,
    #[error("bid must be between 0 and {max}")]
    BidOutOfRange { max: u8 },
    #[error("bid already placed this round")]
    AlreadyBid,
    #[error("a bid of {value} would make total bids equal the round size")]
    ForbiddenBid { value: u8 },
    #[error("that card isn't in your hand")]
    CardNotHeld,
    #[error("must follow the lead suit")]
    MustFollowSuit,
    #[error("unknown player")]
    UnknownPlayer,
}

/// Broadcastable game events, queued by mutations and drained by the room
/// actor after each action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Announcement {
    Joined(PlayerName),
    Left(PlayerName),
    GameStarted,
    RoundDealt { round: u8, trump: Option<Suit> },
    BidPlaced { name: PlayerName, value: u8 },
    CardPlayed { name: PlayerName, card: Card },
    TrickWon { name: PlayerName },
    RoundScored { round: u8 },
    GameOver { winners: Vec<PlayerName> },
    GameAborted { name: PlayerName },
    RoomReset,
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Announcement::Joined(name) => write!(f, "{name} joined the table"),
            Announcement::Left(name) => write!(f, "{name} left the table"),
            Announcement::GameStarted => write!(f, "game started"),
            Announcement::RoundDealt { round, trump } => match trump {
                Some(suit) => write!(f, "round {round} dealt, trump is {suit}"),
                None => write!(f, "round {round} dealt, no fixed trump"),
            },
            Announcement::BidPlaced { name, value } => write!(f, "{name} bid {value}"),
            Announcement::CardPlayed { name, card } => write!(f, "{name} played {card}"),
            Announcement::TrickWon { name } => write!(f, "{name} won the trick"),
            Announcement::RoundScored { round } => write!(f, "round {round} scored"),
            Announcement::GameOver { winners } => {
                let names: Vec<String> = winners.iter().map(PlayerName::to_string).collect();
                write!(f, "game over, winner: {}", names.join(", "))
            }
            Announcement::GameAborted { name } => {
                write!(f, "{name} disconnected, game aborted")
            }
            Announcement::RoomReset => write!(f, "table is open again"),
        }
    }
}

/// The authoritative state of one room.
#[derive(Debug)]
pub struct GameState {
    phase: Phase,
    players: Vec<Player>,
    hands: [Vec<Card>; SEATS],
    bids: [Option<u8>; SEATS],
    tricks_won: [u8; SEATS],
    scores: [Score; SEATS],
    round_number: u8,
    trump: Option<Suit>,
    dynamic_trump: Option<Suit>,
    round_start_seat: SeatIndex,
    current_seat: Option<SeatIndex>,
    trick: Trick,
    history: Vec<TrickRecord>,
    trick_winner: Option<SeatIndex>,
    phase_ticks: u8,
    events: VecDeque<Announcement>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Waiting,
            players: Vec::with_capacity(SEATS),
            hands: std::array::from_fn(|_| Vec::new()),
            bids: [None; SEATS],
            tricks_won: [0; SEATS],
            scores: [0; SEATS],
            round_number: 0,
            trump: None,
            dynamic_trump: None,
            round_start_seat: 0,
            current_seat: None,
            trick: Trick::new(),
            history: Vec::new(),
            trick_winner: None,
            phase_ticks: 0,
            events: VecDeque::new(),
        }
    }

    // Actions ---------------------------------------------------------------

    /// Seats a new player. Only possible in the lobby; the first player to
    /// join becomes host.
    pub fn join(&mut self, name: &str) -> Result<PlayerId, ActionError> {
        if self.phase != Phase::Waiting {
            return Err(ActionError::GameInProgress);
        }
        if self.players.len() >= SEATS {
            return Err(ActionError::RoomFull);
        }
        let name = PlayerName::new(name);
        if name.is_empty() {
            return Err(ActionError::EmptyName);
        }
        if self.players.iter().any(|p| p.name == name) {
            return Err(ActionError::NameTaken);
        }

        let id = Uuid::new_v4();
        let is_host = self.players.is_empty();
        let seat = self.players.len();
        info!("{name} joined seat {seat} (host: {is_host})");
        self.players.push(Player {
            id,
            name: name.clone(),
            seat,
            is_host,
        });
        self.events.push_back(Announcement::Joined(name));
        Ok(id)
    }

    /// Removes a player. In the lobby the remaining seats compact and the
    /// host role transfers if needed; mid-game the game aborts into
    /// [`Phase::Ended`] and resets after a grace period. Unknown ids are a
    /// no-op. Returns whether anything changed.
    pub fn leave(&mut self, id: PlayerId) -> bool {
        let Some(index) = self.players.iter().position(|p| p.id == id) else {
            return false;
        };
        let player = self.players.remove(index);
        info!("{} left during {:?}", player.name, self.phase);
        self.events.push_back(Announcement::Left(player.name.clone()));

        match self.phase {
            Phase::Waiting => self.compact_seats(),
            // Already aborting or finished; the pending reset handles seats.
            Phase::Ended | Phase::GameComplete => {}
            _ => {
                self.phase = Phase::Ended;
                self.phase_ticks = ABORT_GRACE_TICKS;
                self.current_seat = None;
                self.events
                    .push_back(Announcement::GameAborted { name: player.name });
            }
        }
        true
    }

    /// Starts a game. Host only, lobby only, and all four seats must be
    /// filled. The round-1 start seat is drawn uniformly at random.
    pub fn start_game(&mut self, id: PlayerId) -> Result<(), ActionError> {
        if self.phase != Phase::Waiting {
            return Err(ActionError::GameInProgress);
        }
        let player = self.player(id).ok_or(ActionError::UnknownPlayer)?;
        if !player.is_host {
            return Err(ActionError::NotHost);
        }
        if self.players.len() != SEATS {
            return Err(ActionError::NotEnoughPlayers);
        }

        self.scores = [0; SEATS];
        self.round_number = 1;
        self.round_start_seat = rand::rng().random_range(0..SEATS);
        info!("game started, seat {} opens round 1", self.round_start_seat);
        self.events.push_back(Announcement::GameStarted);
        self.deal_round();
        Ok(())
    }

    /// Places a bid for the acting player's seat. Bids run in turn order
    /// from the round-start seat; the final bidder may not bring the total
    /// to the round's trick count.
    pub fn place_bid(&mut self, id: PlayerId, value: u8) -> Result<(), ActionError> {
        if self.phase != Phase::Bidding {
            return Err(ActionError::WrongPhase);
        }
        let seat = self.seat_of(id).ok_or(ActionError::UnknownPlayer)?;
        if self.current_seat != Some(seat) {
            return Err(ActionError::OutOfTurn);
        }
        if self.bids[seat].is_some() {
            return Err(ActionError::AlreadyBid);
        }
        if value > self.round_number {
            return Err(ActionError::BidOutOfRange {
                max: self.round_number,
            });
        }
        if let Some(forbidden) = scoring::forbidden_bid(&self.bids, self.round_number) {
            if value == forbidden {
                return Err(ActionError::ForbiddenBid { value });
            }
        }

        self.bids[seat] = Some(value);
        let name = self.name_at(seat);
        self.events.push_back(Announcement::BidPlaced { name, value });

        if self.bids.iter().all(Option::is_some) {
            debug!("all bids in, round {} play begins", self.round_number);
            self.phase = Phase::Playing;
            self.current_seat = Some(self.round_start_seat);
        } else {
            self.current_seat = Some((seat + 1) % SEATS);
        }
        Ok(())
    }

    /// Plays a card for the acting player's seat, enforcing turn order and
    /// must-follow-suit. In round 13 the first card of each trick sets the
    /// dynamic trump. The fourth card resolves the trick.
    pub fn play_card(&mut self, id: PlayerId, card: Card) -> Result<(), ActionError> {
        if self.phase != Phase::Playing {
            return Err(ActionError::WrongPhase);
        }
        let seat = self.seat_of(id).ok_or(ActionError::UnknownPlayer)?;
        if self.current_seat != Some(seat) {
            return Err(ActionError::OutOfTurn);
        }
        let Some(position) = self.hands[seat].iter().position(|&held| held == card) else {
            return Err(ActionError::CardNotHeld);
        };
        if !trick::is_playable(&self.hands[seat], &self.trick, card) {
            return Err(ActionError::MustFollowSuit);
        }

        self.hands[seat].remove(position);
        if self.trick.is_empty() && self.round_number == FINAL_ROUND {
            self.dynamic_trump = Some(card.suit);
        }
        self.trick.push(seat, card);
        let name = self.name_at(seat);
        self.events.push_back(Announcement::CardPlayed { name, card });

        if self.trick.is_complete() {
            self.finish_trick();
        } else {
            self.current_seat = Some((seat + 1) % SEATS);
        }
        Ok(())
    }

    /// Advances the timed, non-interactive phases by one step. Returns
    /// whether the call changed anything observable.
    pub fn tick(&mut self) -> bool {
        match self.phase {
            Phase::TrickDisplay => {
                self.phase_ticks = self.phase_ticks.saturating_sub(1);
                if self.phase_ticks == 0 {
                    self.clear_trick();
                    let winner = self.trick_winner.take();
                    if self.hands.iter().all(Vec::is_empty) {
                        self.finish_round();
                    } else {
                        self.phase = Phase::Playing;
                        self.current_seat = winner;
                    }
                }
                true
            }
            Phase::RoundComplete => {
                self.phase_ticks = self.phase_ticks.saturating_sub(1);
                if self.phase_ticks == 0 {
                    if self.round_number == FINAL_ROUND {
                        self.finish_game();
                    } else {
                        self.round_number += 1;
                        self.round_start_seat = (self.round_start_seat + 1) % SEATS;
                        self.deal_round();
                    }
                }
                true
            }
            Phase::GameComplete | Phase::Ended => {
                self.phase_ticks = self.phase_ticks.saturating_sub(1);
                if self.phase_ticks == 0 {
                    self.reset_to_lobby();
                }
                true
            }
            Phase::Waiting | Phase::Dealing | Phase::Bidding | Phase::Playing => false,
        }
    }

    /// Takes all queued announcements, leaving the queue empty.
    pub fn drain_events(&mut self) -> VecDeque<Announcement> {
        std::mem::take(&mut self.events)
    }

    // Accessors -------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn round_number(&self) -> u8 {
        self.round_number
    }

    pub fn current_seat(&self) -> Option<SeatIndex> {
        self.current_seat
    }

    pub fn trump(&self) -> Option<Suit> {
        self.trump
    }

    pub fn dynamic_trump(&self) -> Option<Suit> {
        self.dynamic_trump
    }

    pub fn bids(&self) -> &[Option<u8>; SEATS] {
        &self.bids
    }

    pub fn tricks_won(&self) -> &[u8; SEATS] {
        &self.tricks_won
    }

    pub fn scores(&self) -> &[Score; SEATS] {
        &self.scores
    }

    pub fn hand(&self, seat: SeatIndex) -> &[Card] {
        &self.hands[seat]
    }

    pub fn trick(&self) -> &Trick {
        &self.trick
    }

    pub fn history(&self) -> &[TrickRecord] {
        &self.history
    }

    pub fn trick_winner(&self) -> Option<SeatIndex> {
        self.trick_winner
    }

    pub fn phase_ticks(&self) -> u8 {
        self.phase_ticks
    }

    pub fn seat_of(&self, id: PlayerId) -> Option<SeatIndex> {
        self.player(id).map(|p| p.seat)
    }

    pub fn player_name(&self, id: PlayerId) -> Option<PlayerName> {
        self.player(id).map(|p| p.name.clone())
    }

    /// Names of the seats tied for the top cumulative score. Seats vacated
    /// during the game-over linger are skipped.
    pub fn winners(&self) -> Vec<PlayerName> {
        scoring::winners(&self.scores)
            .into_iter()
            .filter_map(|seat| self.player_at(seat).map(|p| p.name.clone()))
            .collect()
    }

    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_at(&self, seat: SeatIndex) -> Option<&Player> {
        self.players.iter().find(|p| p.seat == seat)
    }

    // Every seat is occupied while a round is in play; a leave mid-game
    // moves the phase to Ended before any further play happens.
    fn name_at(&self, seat: SeatIndex) -> PlayerName {
        self.player_at(seat)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| PlayerName::new("unknown"))
    }

    // Transitions -----------------------------------------------------------

    fn deal_round(&mut self) {
        self.phase = Phase::Dealing;
        let mut deck = Deck::shuffled();
        let round = usize::from(self.round_number);
        self.hands = std::array::from_fn(|_| Vec::with_capacity(round));
        for _ in 0..round {
            for seat in 0..SEATS {
                if let Some(card) = deck.draw() {
                    self.hands[seat].push(card);
                }
            }
        }
        for hand in &mut self.hands {
            hand.sort_unstable_by_key(|card| (card.suit, card.rank));
        }

        self.trump = if self.round_number == FINAL_ROUND {
            None
        } else {
            match deck.draw() {
                Some(card) => Some(card.suit),
                None => Some(Suit::ALL[rand::rng().random_range(0..Suit::ALL.len())]),
            }
        };
        self.dynamic_trump = None;
        self.bids = [None; SEATS];
        self.tricks_won = [0; SEATS];
        self.trick = Trick::new();
        self.history.clear();
        self.trick_winner = None;

        debug!(
            "round {} dealt, trump {:?}, seat {} bids first",
            self.round_number, self.trump, self.round_start_seat
        );
        self.events.push_back(Announcement::RoundDealt {
            round: self.round_number,
            trump: self.trump,
        });
        self.phase = Phase::Bidding;
        self.current_seat = Some(self.round_start_seat);
    }

    fn finish_trick(&mut self) {
        let trump = self.dynamic_trump.or(self.trump);
        let (Some(winner), Some(lead)) = (self.trick.winner(trump), self.trick.lead_suit()) else {
            return;
        };
        self.tricks_won[winner] += 1;
        self.history.push(TrickRecord {
            plays: self.trick.plays().to_vec(),
            winner,
            lead_suit: lead,
            trump,
        });
        self.trick_winner = Some(winner);
        self.current_seat = None;
        self.phase = Phase::TrickDisplay;
        self.phase_ticks = TRICK_DISPLAY_TICKS;
        let name = self.name_at(winner);
        debug!("trick won by seat {winner} ({name})");
        self.events.push_back(Announcement::TrickWon { name });
    }

    fn clear_trick(&mut self) {
        self.trick.clear();
        self.dynamic_trump = None;
    }

    fn finish_round(&mut self) {
        for seat in 0..SEATS {
            if let Some(bid) = self.bids[seat] {
                self.scores[seat] += scoring::round_score(bid, self.tricks_won[seat]);
            }
        }
        self.trick_winner = None;
        self.phase = Phase::RoundComplete;
        self.phase_ticks = ROUND_PAUSE_TICKS;
        info!(
            "round {} scored, totals {:?}",
            self.round_number, self.scores
        );
        self.events.push_back(Announcement::RoundScored {
            round: self.round_number,
        });
    }

    fn finish_game(&mut self) {
        let winners = self.winners();
        info!("game complete, winners {winners:?}");
        self.phase = Phase::GameComplete;
        self.phase_ticks = GAME_OVER_TICKS;
        self.events.push_back(Announcement::GameOver { winners });
    }

    /// Full reset back to the lobby. Seated players stay (seats compacted,
    /// host role ensured); everything round- or game-scoped is cleared.
    fn reset_to_lobby(&mut self) {
        self.compact_seats();
        self.hands = std::array::from_fn(|_| Vec::new());
        self.bids = [None; SEATS];
        self.tricks_won = [0; SEATS];
        self.scores = [0; SEATS];
        self.round_number = 0;
        self.trump = None;
        self.dynamic_trump = None;
        self.trick.clear();
        self.history.clear();
        self.trick_winner = None;
        self.current_seat = None;
        self.phase = Phase::Waiting;
        self.phase_ticks = 0;
        info!("room reset to lobby with {} players", self.players.len());
        self.events.push_back(Announcement::RoomReset);
    }

    fn compact_seats(&mut self) {
        for (index, player) in self.players.iter_mut().enumerate() {
            player.seat = index;
        }
        if !self.players.is_empty() && !self.players.iter().any(|p| p.is_host) {
            self.players[0].is_host = true;
        }
    }
}
