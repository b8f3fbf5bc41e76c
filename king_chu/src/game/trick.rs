//! Trick state, resolution, and the must-follow-suit rule.

use serde::{Deserialize, Serialize};

use super::SeatIndex;
use super::cards::{Card, Suit};

/// A single play into a trick.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TrickPlay {
    pub seat: SeatIndex,
    pub card: Card,
}

/// An in-progress trick: up to four plays in the order they were made.
/// The lead suit is the suit of the first play.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Trick {
    plays: Vec<TrickPlay>,
}

impl Trick {
    pub fn new() -> Self {
        Self {
            plays: Vec::with_capacity(4),
        }
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn plays(&self) -> &[TrickPlay] {
        &self.plays
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.plays.len() == 4
    }

    pub fn push(&mut self, seat: SeatIndex, card: Card) {
        self.plays.push(TrickPlay { seat, card });
    }

    pub fn clear(&mut self) {
        self.plays.clear();
    }

    /// Seat holding the winning play, or `None` while the trick is empty.
    pub fn winner(&self, trump: Option<Suit>) -> Option<SeatIndex> {
        let lead = self.lead_suit()?;
        Some(self.plays[resolve(&self.plays, lead, trump)].seat)
    }
}

/// Index of the winning play.
///
/// Left-to-right running-best scan; each later play challenges the current
/// best under, in order: trump beats non-trump, higher trump beats lower
/// trump, non-trump never beats trump, higher lead-suit card beats lower
/// lead-suit card, lead-suit beats off-suit. An off-suit non-trump card can
/// never take a trick, so the lead play is always a valid starting best.
pub fn resolve(plays: &[TrickPlay], lead: Suit, trump: Option<Suit>) -> usize {
    let mut best = 0;
    for (i, play) in plays.iter().enumerate().skip(1) {
        let challenger = play.card;
        let incumbent = plays[best].card;
        let challenger_trump = trump == Some(challenger.suit);
        let incumbent_trump = trump == Some(incumbent.suit);

        let wins = if challenger_trump && !incumbent_trump {
            true
        } else if challenger_trump && incumbent_trump {
            challenger.value() > incumbent.value()
        } else if incumbent_trump {
            false
        } else if challenger.suit == lead && incumbent.suit == lead {
            challenger.value() > incumbent.value()
        } else {
            challenger.suit == lead
        };

        if wins {
            best = i;
        }
    }
    best
}

/// Must-follow-suit legality: a card is playable if it leads the trick,
/// follows the lead suit, or the hand holds no card of the lead suit.
/// `hand` still contains `card` when this is checked.
pub fn is_playable(hand: &[Card], trick: &Trick, card: Card) -> bool {
    match trick.lead_suit() {
        None => true,
        Some(lead) => card.suit == lead || !hand.iter().any(|held| held.suit == lead),
    }
}

/// A resolved trick kept in the round history.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TrickRecord {
    pub plays: Vec<TrickPlay>,
    pub winner: SeatIndex,
    pub lead_suit: Suit,
    pub trump: Option<Suit>,
}
