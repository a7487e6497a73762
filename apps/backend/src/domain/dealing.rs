//! Deck construction and the opening deal.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::cards_logic::lowest_trump;
use crate::domain::cards_types::{Card, Rank, Suit};
use crate::domain::rules::{DECK_SIZE, HAND_SIZE, PLAYERS};
use crate::domain::state::{opponent, GameState, Phase, PlayerId};

/// Generate the full 36-card deck in standard order, ids 0..36.
fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut id = 0u8;
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card { id, suit, rank });
            id += 1;
        }
    }
    deck
}

/// Deal a fresh hand deterministically from `seed`.
///
/// The shuffled deck keeps its bottom card (`deck[0]`) face up as the trump
/// card; it is drawn last. Six cards go to each player alternating from the
/// draw end. The first attacker is the explicit override if given (dealer
/// policy, e.g. loser starts the rematch), otherwise the owner of the lowest
/// trump, otherwise player 0.
pub fn deal(seed: u64, first_attacker: Option<PlayerId>) -> GameState {
    let mut deck = full_deck();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);

    let trump_card = deck[0];
    let trump = trump_card.suit;

    let mut hands: [Vec<Card>; PLAYERS] = Default::default();
    for _ in 0..HAND_SIZE {
        for hand in hands.iter_mut() {
            // full_deck holds 36 cards and we take 12; the pops cannot fail
            if let Some(card) = deck.pop() {
                hand.push(card);
            }
        }
    }

    let attacker = first_attacker.unwrap_or_else(|| pick_first_attacker(&hands, trump));

    GameState {
        deck,
        trump_card,
        trump,
        hands,
        table: Vec::new(),
        phase: Phase::Attacking,
        attacker,
        defender: opponent(attacker),
        defender_takes: false,
        winner: None,
    }
}

/// Owner of the lowest trump attacks first; player 0 if nobody holds one.
fn pick_first_attacker(hands: &[Vec<Card>; PLAYERS], trump: Suit) -> PlayerId {
    let mut best: Option<(Rank, PlayerId)> = None;
    for (player, hand) in hands.iter().enumerate() {
        if let Some(card) = lowest_trump(hand, trump) {
            let candidate = (card.rank, player as PlayerId);
            if best.is_none_or(|(rank, _)| card.rank < rank) {
                best = Some(candidate);
            }
        }
    }
    best.map(|(_, player)| player).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deal_is_deterministic() {
        let a = deal(12345, None);
        let b = deal(12345, None);
        assert_eq!(a.hands, b.hands);
        assert_eq!(a.deck, b.deck);
        assert_eq!(a.trump_card, b.trump_card);
    }

    #[test]
    fn different_seeds_differ() {
        let a = deal(12345, None);
        let b = deal(54321, None);
        assert_ne!(a.hands, b.hands);
    }

    #[test]
    fn deal_counts_and_trump() {
        let game = deal(7, None);
        assert_eq!(game.hands[0].len(), HAND_SIZE);
        assert_eq!(game.hands[1].len(), HAND_SIZE);
        assert_eq!(game.deck.len(), DECK_SIZE - 2 * HAND_SIZE);
        assert_eq!(game.trump_card, game.deck[0]);
        assert_eq!(game.trump, game.trump_card.suit);
        assert_eq!(game.phase, Phase::Attacking);
        assert!(game.table.is_empty());
        assert!(game.winner.is_none());
    }

    #[test]
    fn every_card_dealt_exactly_once() {
        let game = deal(42, None);
        let mut seen: HashSet<u8> = HashSet::new();
        for card in game
            .deck
            .iter()
            .chain(game.hands[0].iter())
            .chain(game.hands[1].iter())
        {
            assert!(seen.insert(card.id), "duplicate card id {}", card.id);
        }
        assert_eq!(seen.len(), DECK_SIZE);
    }

    #[test]
    fn attacker_and_defender_are_distinct() {
        for seed in 0..20 {
            let game = deal(seed, None);
            assert_ne!(game.attacker, game.defender);
        }
    }

    #[test]
    fn explicit_first_attacker_wins_over_trump_rule() {
        for seed in 0..5 {
            let game = deal(seed, Some(1));
            assert_eq!(game.attacker, 1);
            assert_eq!(game.defender, 0);
        }
    }

    #[test]
    fn first_attacker_holds_the_lowest_trump() {
        for seed in 0..50u64 {
            let game = deal(seed, None);
            let low0 = lowest_trump(&game.hands[0], game.trump);
            let low1 = lowest_trump(&game.hands[1], game.trump);
            match (low0, low1) {
                (Some(a), Some(b)) => {
                    let expected = if a.rank < b.rank { 0 } else { 1 };
                    assert_eq!(game.attacker, expected);
                }
                (Some(_), None) => assert_eq!(game.attacker, 0),
                (None, Some(_)) => assert_eq!(game.attacker, 1),
                (None, None) => assert_eq!(game.attacker, 0),
            }
        }
    }
}
