//! Full-game integration tests driving the state machine end to end
//! through its public API, with randomized deals.

use king_chu::game::state::{FINAL_ROUND, SEATS};
use king_chu::game::{ActionError, Card, GameState, Phase, PlayerId};

fn join_four(state: &mut GameState) -> Vec<PlayerId> {
    ["alice", "bob", "carol", "dave"]
        .iter()
        .map(|name| state.join(name).unwrap())
        .collect()
}

fn current_player(state: &GameState) -> PlayerId {
    let seat = state.current_seat().expect("somebody's turn");
    state.players()[seat].id
}

/// Bid 0, falling back to 1 when 0 is the forbidden value.
fn place_legal_bid(state: &mut GameState) {
    let id = current_player(state);
    match state.place_bid(id, 0) {
        Ok(()) => {}
        Err(ActionError::ForbiddenBid { .. }) => state.place_bid(id, 1).unwrap(),
        Err(error) => panic!("unexpected bid rejection: {error}"),
    }
}

/// Play the first card the rules accept.
fn play_any_legal(state: &mut GameState) {
    let seat = state.current_seat().expect("somebody's turn");
    let id = state.players()[seat].id;
    let hand: Vec<Card> = state.hand(seat).to_vec();
    for card in hand {
        match state.play_card(id, card) {
            Ok(()) => return,
            Err(ActionError::MustFollowSuit) => continue,
            Err(error) => panic!("unexpected play rejection: {error}"),
        }
    }
    panic!("no playable card at seat {seat}");
}

fn tick_past_timed_phases(state: &mut GameState) {
    while matches!(state.phase(), Phase::TrickDisplay | Phase::RoundComplete) {
        state.tick();
    }
}

#[test]
fn full_game_runs_thirteen_rounds_to_completion() {
    let mut state = GameState::new();
    let ids = join_four(&mut state);
    state.start_game(ids[0]).unwrap();

    for round in 1..=FINAL_ROUND {
        assert_eq!(state.round_number(), round);
        assert_eq!(state.phase(), Phase::Bidding);
        if round == FINAL_ROUND {
            assert_eq!(state.trump(), None);
        } else {
            assert!(state.trump().is_some());
        }

        for _ in 0..SEATS {
            place_legal_bid(&mut state);
        }
        assert_eq!(state.phase(), Phase::Playing);

        // The forbidden-bid rule kept the total off the round size.
        let total: u32 = state.bids().iter().flatten().map(|&b| u32::from(b)).sum();
        assert_ne!(total, u32::from(round));

        for trick_no in 0..round {
            for _ in 0..SEATS {
                play_any_legal(&mut state);

                // Card conservation: dealt cards are either in hands, in
                // the current trick, or in the round history. A completed
                // trick is already in the history while it stays on the
                // table for the display window, so count it once.
                let in_hands: usize = (0..SEATS).map(|seat| state.hand(seat).len()).sum();
                let on_table = if state.phase() == Phase::TrickDisplay {
                    0
                } else {
                    state.trick().len()
                };
                let played = state.history().len() * SEATS + on_table;
                assert_eq!(in_hands + played, SEATS * usize::from(round));

                if round == FINAL_ROUND {
                    assert_eq!(state.dynamic_trump(), state.trick().lead_suit());
                }
            }
            assert_eq!(state.phase(), Phase::TrickDisplay);
            let winner = state.trick_winner().expect("trick has a winner");

            if trick_no + 1 < round {
                while state.phase() == Phase::TrickDisplay {
                    state.tick();
                }
                assert_eq!(state.phase(), Phase::Playing);
                assert_eq!(state.current_seat(), Some(winner), "winner leads");
            }
        }

        // Every trick of the round went to exactly one seat.
        let tricks: usize = state.tricks_won().iter().map(|&t| usize::from(t)).sum();
        assert_eq!(tricks, usize::from(round));

        tick_past_timed_phases(&mut state);
    }

    assert_eq!(state.phase(), Phase::GameComplete);
    let winners = state.winners();
    assert!(!winners.is_empty());
    let top = *state.scores().iter().max().unwrap();
    for (seat, &score) in state.scores().iter().enumerate() {
        let name = &state.players()[seat].name;
        assert_eq!(winners.contains(name), score == top);
    }
}

#[test]
fn game_over_linger_returns_the_room_to_the_lobby() {
    let mut state = GameState::new();
    let ids = join_four(&mut state);
    state.start_game(ids[0]).unwrap();

    while state.phase() != Phase::GameComplete {
        match state.phase() {
            Phase::Bidding => place_legal_bid(&mut state),
            Phase::Playing => play_any_legal(&mut state),
            _ => {
                state.tick();
            }
        }
    }

    while state.phase() == Phase::GameComplete {
        state.tick();
    }
    assert_eq!(state.phase(), Phase::Waiting);
    assert_eq!(state.players().len(), SEATS);
    assert_eq!(state.scores(), &[0; SEATS]);

    // The same table can immediately start another game.
    state.start_game(ids[0]).unwrap();
    assert_eq!(state.phase(), Phase::Bidding);
    assert_eq!(state.round_number(), 1);
}

#[test]
fn views_track_the_game_for_every_player() {
    let mut state = GameState::new();
    let ids = join_four(&mut state);
    state.start_game(ids[0]).unwrap();

    for _ in 0..SEATS {
        place_legal_bid(&mut state);
    }
    play_any_legal(&mut state);

    for (id, view) in state.views() {
        let seat = state.seat_of(id).unwrap();
        assert_eq!(view.phase, Phase::Playing);
        assert_eq!(view.round_number, 1);
        assert_eq!(view.player_count, SEATS);
        assert_eq!(view.trick.len(), 1);
        assert_eq!(view.lead_suit, state.trick().lead_suit());
        assert_eq!(view.hand, state.hand(seat));
        for player in &view.players {
            assert!(player.bid.is_some());
        }
    }
}
