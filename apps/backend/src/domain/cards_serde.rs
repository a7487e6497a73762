//! Serialization and deserialization for card types

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::cards_types::{Rank, Suit};

// Suit serde
impl Serialize for Suit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match self {
            Suit::Clubs => "CLUBS",
            Suit::Diamonds => "DIAMONDS",
            Suit::Hearts => "HEARTS",
            Suit::Spades => "SPADES",
        };
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for Suit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "CLUBS" => Ok(Suit::Clubs),
            "DIAMONDS" => Ok(Suit::Diamonds),
            "HEARTS" => Ok(Suit::Hearts),
            "SPADES" => Ok(Suit::Spades),
            _ => Err(serde::de::Error::custom(format!("Invalid suit: {s}"))),
        }
    }
}

// Rank serde
impl Serialize for Rank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match self {
            Rank::Six => "SIX",
            Rank::Seven => "SEVEN",
            Rank::Eight => "EIGHT",
            Rank::Nine => "NINE",
            Rank::Ten => "TEN",
            Rank::Jack => "JACK",
            Rank::Queen => "QUEEN",
            Rank::King => "KING",
            Rank::Ace => "ACE",
        };
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "SIX" => Ok(Rank::Six),
            "SEVEN" => Ok(Rank::Seven),
            "EIGHT" => Ok(Rank::Eight),
            "NINE" => Ok(Rank::Nine),
            "TEN" => Ok(Rank::Ten),
            "JACK" => Ok(Rank::Jack),
            "QUEEN" => Ok(Rank::Queen),
            "KING" => Ok(Rank::King),
            "ACE" => Ok(Rank::Ace),
            _ => Err(serde::de::Error::custom(format!("Invalid rank: {s}"))),
        }
    }
}
