//! Round settlement: the attacker's "beaten", the defender's "take", the
//! throw-in window, hand replenishment, and win detection.

use crate::domain::rules::HAND_SIZE;
use crate::domain::state::{opponent, GameState, Phase, PlayerId, Winner};
use crate::errors::domain::{DomainError, ValidationKind};

/// Attacker declares the round beaten. Requires a non-empty, fully covered
/// table. Discards the table, refills hands, and swaps roles unless the
/// hand just ended.
pub fn declare_beaten(state: &mut GameState, who: PlayerId) -> Result<(), DomainError> {
    if who != state.attacker {
        return Err(DomainError::validation(
            ValidationKind::WrongRole,
            "Only the attacker can declare the round beaten",
        ));
    }
    if state.phase != Phase::Attacking {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Cannot declare beaten now",
        ));
    }
    if state.table.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::TableEmpty,
            "No cards on the table",
        ));
    }
    if !state.all_covered() {
        return Err(DomainError::validation(
            ValidationKind::UncoveredPairs,
            "Not every attack is beaten",
        ));
    }

    // Beaten cards leave play permanently.
    state.table.clear();
    replenish_hands(state);

    if check_game_over(state) {
        return Ok(());
    }

    let new_attacker = state.defender;
    state.attacker = new_attacker;
    state.defender = opponent(new_attacker);
    state.phase = Phase::Attacking;
    Ok(())
}

/// Defender concedes the round, opening the throw-in window.
pub fn declare_take(state: &mut GameState, who: PlayerId) -> Result<(), DomainError> {
    if who != state.defender {
        return Err(DomainError::validation(
            ValidationKind::WrongRole,
            "Only the defender can take",
        ));
    }
    if state.phase != Phase::Defending && state.phase != Phase::ThrowingIn {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Cannot take now",
        ));
    }

    state.defender_takes = true;
    state.phase = Phase::ThrowingIn;
    Ok(())
}

/// Attacker closes the throw-in window: the defender collects the whole
/// table, hands refill, and roles stay as they are.
pub fn finish_throwing_in(state: &mut GameState, who: PlayerId) -> Result<(), DomainError> {
    if who != state.attacker {
        return Err(DomainError::validation(
            ValidationKind::WrongRole,
            "Only the attacker can close the throw-in",
        ));
    }
    if state.phase != Phase::ThrowingIn {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "Cannot finish the throw-in now",
        ));
    }

    let defender = state.defender as usize;
    let table = std::mem::take(&mut state.table);
    for pair in table {
        state.hands[defender].push(pair.attack);
        if let Some(defense) = pair.defense {
            state.hands[defender].push(defense);
        }
    }
    state.defender_takes = false;

    replenish_hands(state);

    if check_game_over(state) {
        return Ok(());
    }

    // The defender who took stays defender.
    state.phase = Phase::Attacking;
    Ok(())
}

/// Refill both hands to six, attacker strictly first. When the deck runs
/// short the attacker's priority can leave the defender underfilled; that
/// asymmetry is part of the rules.
fn replenish_hands(state: &mut GameState) {
    let order = [state.attacker, state.defender];
    for player in order {
        let hand = &mut state.hands[player as usize];
        while hand.len() < HAND_SIZE {
            match state.deck.pop() {
                Some(card) => hand.push(card),
                None => break,
            }
        }
    }
}

/// Decide the hand once the deck is empty. Returns true when the game just
/// ended; the empty-handed player wins and the one left holding cards is
/// the fool.
fn check_game_over(state: &mut GameState) -> bool {
    if !state.deck.is_empty() {
        return false;
    }

    let empty0 = state.hands[0].is_empty();
    let empty1 = state.hands[1].is_empty();
    let winner = match (empty0, empty1) {
        (true, true) => Winner::Draw,
        (true, false) => Winner::Player(0),
        (false, true) => Winner::Player(1),
        (false, false) => return false,
    };

    state.phase = Phase::GameOver;
    state.winner = Some(winner);
    true
}
