//! Property-based tests for scoring, bidding restrictions, and trick
//! resolution.

use king_chu::game::cards::{Card, Rank, Suit};
use king_chu::game::trick::{self, TrickPlay};
use king_chu::game::scoring;
use proptest::prelude::*;

fn card_strategy() -> impl Strategy<Value = Card> {
    (0usize..13, 0usize..4).prop_map(|(rank, suit)| Card::new(Rank::ALL[rank], Suit::ALL[suit]))
}

/// Four distinct cards assigned to seats 0..3 in play order.
fn trick_strategy() -> impl Strategy<Value = Vec<TrickPlay>> {
    proptest::collection::vec(card_strategy(), 4)
        .prop_filter("cards must be distinct", |cards| {
            cards
                .iter()
                .all(|card| cards.iter().filter(|other| *other == card).count() == 1)
        })
        .prop_map(|cards| {
            cards
                .into_iter()
                .enumerate()
                .map(|(seat, card)| TrickPlay { seat, card })
                .collect()
        })
}

proptest! {
    #[test]
    fn exact_bids_score_ten_plus_bid_squared(bid in 0u8..=13) {
        let expected = 10 + i32::from(bid) * i32::from(bid);
        prop_assert_eq!(scoring::round_score(bid, bid), expected);
    }

    #[test]
    fn missed_bids_always_score_negative(bid in 0u8..=13, won in 0u8..=13) {
        prop_assume!(bid != won);
        let miss = i32::from(bid) - i32::from(won);
        let score = scoring::round_score(bid, won);
        prop_assert_eq!(score, -(miss * miss));
        prop_assert!(score < 0);
    }

    #[test]
    fn forbidden_bid_blocks_exactly_the_round_total(
        b0 in 0u8..=13,
        b1 in 0u8..=13,
        b2 in 0u8..=13,
        round in 1u8..=13,
    ) {
        let bids = [Some(b0), Some(b1), Some(b2), None];
        let sum = i32::from(b0) + i32::from(b1) + i32::from(b2);
        let remainder = i32::from(round) - sum;

        let forbidden = scoring::forbidden_bid(&bids, round);
        if (0..=i32::from(round)).contains(&remainder) {
            prop_assert_eq!(forbidden, Some(remainder as u8));
            // Blocking this value makes an exact total unreachable.
            prop_assert!(sum + i32::from(forbidden.unwrap()) == i32::from(round));
        } else {
            prop_assert_eq!(forbidden, None);
        }
    }

    #[test]
    fn a_played_trump_always_takes_the_trick(plays in trick_strategy(), trump_index in 0usize..4) {
        let trump = Suit::ALL[trump_index];
        let lead = plays[0].card.suit;
        let winner = &plays[trick::resolve(&plays, lead, Some(trump))].card;

        if plays.iter().any(|play| play.card.suit == trump) {
            prop_assert_eq!(winner.suit, trump);
            for play in &plays {
                if play.card.suit == trump {
                    prop_assert!(winner.value() >= play.card.value());
                }
            }
        }
    }

    #[test]
    fn without_trump_the_best_lead_suit_card_wins(plays in trick_strategy()) {
        let lead = plays[0].card.suit;
        let winner = &plays[trick::resolve(&plays, lead, None)].card;

        prop_assert_eq!(winner.suit, lead);
        for play in &plays {
            if play.card.suit == lead {
                prop_assert!(winner.value() >= play.card.value());
            }
        }
    }

    #[test]
    fn resolution_ignores_an_unplayed_trump_suit(plays in trick_strategy(), trump_index in 0usize..4) {
        let trump = Suit::ALL[trump_index];
        prop_assume!(plays.iter().all(|play| play.card.suit != trump));

        let lead = plays[0].card.suit;
        prop_assert_eq!(
            trick::resolve(&plays, lead, Some(trump)),
            trick::resolve(&plays, lead, None)
        );
    }
}
