use serde::{Serialize, Serializer};

use crate::domain::cards_types::{Card, Suit};
use crate::domain::rules::PLAYERS;

pub type PlayerId = u8; // 0..=1

/// Overall game progression phases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Attacker opens or extends the table with a new attack card.
    Attacking,
    /// Defender must cover the single uncovered pair.
    Defending,
    /// Defender has declared "take"; attacker may pile on matching ranks.
    ThrowingIn,
    /// Winner (or draw) decided; no further moves are legal.
    GameOver,
}

/// Final outcome of a hand.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Winner {
    Player(PlayerId),
    Draw,
}

// Wire format: 0, 1, or "draw".
impl Serialize for Winner {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Winner::Player(p) => serializer.serialize_u8(*p),
            Winner::Draw => serializer.serialize_str("draw"),
        }
    }
}

/// One contested slot on the table. Uncovered while `defense` is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TablePair {
    pub attack: Card,
    pub defense: Option<Card>,
}

impl TablePair {
    pub fn open(attack: Card) -> Self {
        Self {
            attack,
            defense: None,
        }
    }

    pub fn is_covered(&self) -> bool {
        self.defense.is_some()
    }
}

/// Entire game container, sufficient for pure domain operations.
///
/// The deck is drawn from the back; `deck[0]` is the face-up trump card and
/// is dealt last. Cards discarded at round settlement leave play entirely.
#[derive(Debug, Clone)]
pub struct GameState {
    pub deck: Vec<Card>,
    pub trump_card: Card,
    pub trump: Suit,
    pub hands: [Vec<Card>; PLAYERS],
    pub table: Vec<TablePair>,
    pub phase: Phase,
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub defender_takes: bool,
    pub winner: Option<Winner>,
}

/// The other seat at a two-player table.
#[inline]
pub fn opponent(p: PlayerId) -> PlayerId {
    1 - p
}

impl GameState {
    pub fn hand(&self, who: PlayerId) -> &[Card] {
        &self.hands[who as usize]
    }

    /// Index of the single pair awaiting a defense, if any.
    pub fn uncovered_index(&self) -> Option<usize> {
        self.table.iter().position(|p| !p.is_covered())
    }

    pub fn all_covered(&self) -> bool {
        self.table.iter().all(TablePair::is_covered)
    }
}
