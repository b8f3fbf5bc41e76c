//! Round scoring, the forbidden-bid rule, and winner selection.

use super::SeatIndex;

/// Cumulative score type. Round scores can be negative and totals can dip
/// below zero.
pub type Score = i32;

/// Score for one seat at the end of a round: `10 + bid²` on an exact bid,
/// otherwise `-(bid - tricks_won)²`.
pub fn round_score(bid: u8, tricks_won: u8) -> Score {
    let bid = Score::from(bid);
    let won = Score::from(tricks_won);
    if bid == won {
        10 + bid * bid
    } else {
        let miss = bid - won;
        -(miss * miss)
    }
}

/// The one value the final bidder may not choose, keeping the round's total
/// bids from equaling its trick count. Applies only when exactly three of
/// the four bids are placed; `None` otherwise, or when `round - sum` falls
/// outside `[0, round]`.
pub fn forbidden_bid(bids: &[Option<u8>; 4], round: u8) -> Option<u8> {
    let placed: Vec<u8> = bids.iter().flatten().copied().collect();
    if placed.len() != 3 {
        return None;
    }
    let sum: i32 = placed.iter().map(|&bid| i32::from(bid)).sum();
    let remainder = i32::from(round) - sum;
    if (0..=i32::from(round)).contains(&remainder) {
        Some(remainder as u8)
    } else {
        None
    }
}

/// Seats tied for the maximum cumulative score. Ties are reported as a
/// group, never broken.
pub fn winners(scores: &[Score; 4]) -> Vec<SeatIndex> {
    let max = scores.iter().copied().max().unwrap_or_default();
    scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score == max)
        .map(|(seat, _)| seat)
        .collect()
}
