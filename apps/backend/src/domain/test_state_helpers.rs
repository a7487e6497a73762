//! Hand-built `GameState` fixtures for engine tests.

use crate::domain::cards_types::{Card, Rank, Suit};
use crate::domain::state::{GameState, Phase};

pub fn card(id: u8, suit: Suit, rank: Rank) -> Card {
    Card { id, suit, rank }
}

/// Baseline mid-hand state: player 0 attacks, clubs are trump, deck and
/// hands empty until the builder fills them in.
pub fn game_with(build: impl FnOnce(&mut GameState)) -> GameState {
    let mut game = GameState {
        deck: Vec::new(),
        trump_card: card(0, Suit::Clubs, Rank::Six),
        trump: Suit::Clubs,
        hands: [Vec::new(), Vec::new()],
        table: Vec::new(),
        phase: Phase::Attacking,
        attacker: 0,
        defender: 1,
        defender_takes: false,
        winner: None,
    };
    build(&mut game);
    game
}
