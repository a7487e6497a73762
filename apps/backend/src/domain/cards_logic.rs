//! Card game logic: the beat relation and hand/table scans.

use std::collections::HashSet;

use super::cards_types::{Card, Rank, Suit};
use super::state::TablePair;

/// Whether `defense` beats `attack` under the given trump suit.
///
/// Same suit: strictly higher rank wins. Off suit: only a trump beats a
/// non-trump. Two trumps fall under the same-suit rule.
pub fn can_beat(attack: Card, defense: Card, trump: Suit) -> bool {
    if defense.suit == attack.suit {
        return defense.rank > attack.rank;
    }
    defense.suit == trump && attack.suit != trump
}

/// Ranks currently present on the table, counting both attack and defense
/// cards. Throw-ins and follow-up attacks must match one of these.
pub fn table_ranks(table: &[TablePair]) -> HashSet<Rank> {
    let mut ranks = HashSet::new();
    for pair in table {
        ranks.insert(pair.attack.rank);
        if let Some(defense) = pair.defense {
            ranks.insert(defense.rank);
        }
    }
    ranks
}

/// Lowest trump card in a hand, if any. Decides the opening attacker.
pub fn lowest_trump(hand: &[Card], trump: Suit) -> Option<Card> {
    hand.iter()
        .filter(|c| c.suit == trump)
        .min_by_key(|c| c.rank)
        .copied()
}
