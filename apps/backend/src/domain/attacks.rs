//! Legal-move computation and card play, enforcing phase, role, and the
//! beat relation.

use crate::domain::cards_logic::{can_beat, table_ranks};
use crate::domain::cards_types::CardId;
use crate::domain::rules::attack_cap;
use crate::domain::state::{GameState, Phase, PlayerId, TablePair};
use crate::errors::domain::{DomainError, ValidationKind};

/// Compute the card ids `who` may legally play right now. Pure and
/// read-only; `play_card` rejects anything outside this set.
pub fn legal_moves(state: &GameState, who: PlayerId) -> Vec<CardId> {
    let hand = state.hand(who);

    match state.phase {
        Phase::Attacking => {
            if who != state.attacker {
                return Vec::new();
            }
            if state.table.is_empty() {
                // Opening attack: anything in hand.
                return hand.iter().map(|c| c.id).collect();
            }
            // A pending defense blocks further attacks.
            if state.uncovered_index().is_some() {
                return Vec::new();
            }
            let cap = attack_cap(state.hand(state.defender).len());
            if state.table.len() >= cap {
                return Vec::new();
            }
            let ranks = table_ranks(&state.table);
            hand.iter()
                .filter(|c| ranks.contains(&c.rank))
                .map(|c| c.id)
                .collect()
        }

        Phase::Defending => {
            if who != state.defender {
                return Vec::new();
            }
            let Some(idx) = state.uncovered_index() else {
                return Vec::new();
            };
            let attack = state.table[idx].attack;
            hand.iter()
                .filter(|c| can_beat(attack, **c, state.trump))
                .map(|c| c.id)
                .collect()
        }

        Phase::ThrowingIn => {
            // The defender has conceded; only the attacker may add cards.
            if who == state.defender {
                return Vec::new();
            }
            if state.table.len() >= crate::domain::rules::MAX_TABLE_PAIRS {
                return Vec::new();
            }
            let ranks = table_ranks(&state.table);
            hand.iter()
                .filter(|c| ranks.contains(&c.rank))
                .map(|c| c.id)
                .collect()
        }

        Phase::GameOver => Vec::new(),
    }
}

/// Play `card_id` from `who`'s hand. `target_pair` selects the pair to
/// cover while defending; it defaults to the first uncovered pair.
///
/// Rejections leave the state untouched.
pub fn play_card(
    state: &mut GameState,
    who: PlayerId,
    card_id: CardId,
    target_pair: Option<usize>,
) -> Result<(), DomainError> {
    let hand = state.hand(who);
    let Some(pos) = hand.iter().position(|c| c.id == card_id) else {
        return Err(DomainError::validation(
            ValidationKind::CardNotInHand,
            "Card not in hand",
        ));
    };

    if !legal_moves(state, who).contains(&card_id) {
        return Err(DomainError::validation(
            ValidationKind::IllegalCard,
            "Card cannot be played now",
        ));
    }

    match state.phase {
        Phase::Attacking => {
            let card = state.hands[who as usize].remove(pos);
            state.table.push(TablePair::open(card));
            state.phase = Phase::Defending;
            Ok(())
        }

        Phase::Defending => {
            // Resolve the pair to cover before touching the hand.
            let pair_idx = match target_pair {
                Some(idx) => idx,
                None => state.uncovered_index().ok_or_else(|| {
                    DomainError::validation(ValidationKind::NoUncoveredPair, "Nothing to cover")
                })?,
            };
            if pair_idx >= state.table.len() {
                return Err(DomainError::validation(
                    ValidationKind::TargetOutOfRange,
                    "No such pair on the table",
                ));
            }
            if state.table[pair_idx].is_covered() {
                return Err(DomainError::validation(
                    ValidationKind::PairAlreadyCovered,
                    "That attack is already beaten",
                ));
            }
            let card = state.hands[who as usize][pos];
            if !can_beat(state.table[pair_idx].attack, card, state.trump) {
                return Err(DomainError::validation(
                    ValidationKind::CannotBeat,
                    "Card does not beat that attack",
                ));
            }

            state.hands[who as usize].remove(pos);
            state.table[pair_idx].defense = Some(card);
            if state.all_covered() {
                // Attacker may extend with matching ranks or declare the
                // round beaten.
                state.phase = Phase::Attacking;
            }
            Ok(())
        }

        Phase::ThrowingIn => {
            let card = state.hands[who as usize].remove(pos);
            state.table.push(TablePair::open(card));
            Ok(())
        }

        Phase::GameOver => Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "The hand is over",
        )),
    }
}
