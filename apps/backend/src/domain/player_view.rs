//! Player view of game state - what information is visible to one seat.
//!
//! The projection reveals the viewer's own hand and legal moves, the shared
//! table, and only the size of the opponent's hand. It is recomputed and
//! pushed after every successful mutation, and on reconnect.

use serde::Serialize;

use crate::domain::attacks::legal_moves;
use crate::domain::cards_types::{Card, CardId, Suit};
use crate::domain::state::{opponent, GameState, Phase, PlayerId, TablePair, Winner};

/// Everything a single player is allowed to see, plus their legal moves.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub player_index: PlayerId,
    pub hand: Vec<Card>,
    pub opponent_count: usize,
    pub table: Vec<TablePair>,
    /// Face-up trump card; hidden once the deck is exhausted and the card
    /// has been dealt into a hand.
    pub trump_card: Option<Card>,
    pub trump: Suit,
    pub deck_count: usize,
    pub phase: Phase,
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub is_attacker: bool,
    pub is_defender: bool,
    pub defender_takes: bool,
    pub playable_card_ids: Vec<CardId>,
    pub winner: Option<Winner>,
}

/// Project the authoritative state down to what `who` may see.
pub fn view_for(state: &GameState, who: PlayerId) -> PlayerView {
    PlayerView {
        player_index: who,
        hand: state.hand(who).to_vec(),
        opponent_count: state.hand(opponent(who)).len(),
        table: state.table.clone(),
        trump_card: (!state.deck.is_empty()).then_some(state.trump_card),
        trump: state.trump,
        deck_count: state.deck.len(),
        phase: state.phase,
        attacker: state.attacker,
        defender: state.defender,
        is_attacker: who == state.attacker,
        is_defender: who == state.defender,
        defender_takes: state.defender_takes,
        playable_card_ids: legal_moves(state, who),
        winner: state.winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards_types::Rank;
    use crate::domain::dealing::deal;
    use crate::domain::test_state_helpers::{card, game_with};

    #[test]
    fn view_hides_opponent_hand() {
        let game = deal(9, None);
        let view = view_for(&game, 0);
        assert_eq!(view.hand, game.hands[0]);
        assert_eq!(view.opponent_count, game.hands[1].len());
        assert_eq!(view.deck_count, game.deck.len());
        assert_eq!(view.trump_card, Some(game.trump_card));
    }

    #[test]
    fn role_flags_track_seats() {
        let game = deal(9, Some(1));
        let view0 = view_for(&game, 0);
        let view1 = view_for(&game, 1);
        assert!(view1.is_attacker && !view1.is_defender);
        assert!(view0.is_defender && !view0.is_attacker);
        assert_eq!(view0.attacker, 1);
    }

    #[test]
    fn trump_card_hidden_once_deck_is_out() {
        let game = game_with(|g| {
            g.hands[0] = vec![card(1, Suit::Clubs, Rank::Six)];
            g.hands[1] = vec![card(2, Suit::Clubs, Rank::Eight)];
        });
        let view = view_for(&game, 0);
        assert_eq!(view.trump_card, None);
        assert_eq!(view.deck_count, 0);
    }

    #[test]
    fn playable_ids_match_legal_moves() {
        let game = deal(11, None);
        let view = view_for(&game, game.attacker);
        assert_eq!(view.playable_card_ids, legal_moves(&game, game.attacker));
        // Opening attacker can play the whole hand.
        assert_eq!(view.playable_card_ids.len(), 6);
    }
}
