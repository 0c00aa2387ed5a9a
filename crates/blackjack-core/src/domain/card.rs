//! Playing cards as they travel on the wire.
//!
//! A card is a `(rank, suit)` pair.  Rank 1 is the Ace, 11/12/13 are the
//! Jack, Queen and King.  Suits use the wire codes 0..=3.

use serde::{Deserialize, Serialize};

/// Lowest valid rank (Ace).
pub const MIN_RANK: u8 = 1;

/// Highest valid rank (King).
pub const MAX_RANK: u8 = 13;

/// Card suit, carried on the wire as a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    /// All four suits in wire-code order.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    /// Returns `true` for the red suits.
    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }
}

impl TryFrom<u8> for Suit {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Suit::Hearts),
            1 => Ok(Suit::Diamonds),
            2 => Ok(Suit::Clubs),
            3 => Ok(Suit::Spades),
            _ => Err(()),
        }
    }
}

/// A single immutable playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    rank: u8,
    suit: Suit,
}

impl Card {
    /// Creates a card, returning `None` when `rank` is outside `1..=13`.
    pub fn new(rank: u8, suit: Suit) -> Option<Self> {
        (MIN_RANK..=MAX_RANK)
            .contains(&rank)
            .then_some(Self { rank, suit })
    }

    /// Builds a card from raw wire codes.
    pub fn from_codes(rank: u8, suit: u8) -> Option<Self> {
        let suit = Suit::try_from(suit).ok()?;
        Self::new(rank, suit)
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn is_ace(&self) -> bool {
        self.rank == MIN_RANK
    }

    /// Point contribution before any Ace demotion: Ace 11, 10..=13 count 10.
    pub fn points(&self) -> u8 {
        match self.rank {
            1 => 11,
            r if r >= 10 => 10,
            r => r,
        }
    }

    /// Short rank name: `A`, `2`..`10`, `J`, `Q`, `K`.
    pub fn rank_label(&self) -> &'static str {
        const LABELS: [&str; 13] = [
            "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
        ];
        LABELS[usize::from(self.rank - MIN_RANK)]
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank_label(), self.suit.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_rank_zero_and_fourteen() {
        assert!(Card::new(0, Suit::Hearts).is_none());
        assert!(Card::new(14, Suit::Hearts).is_none());
    }

    #[test]
    fn test_from_codes_rejects_unknown_suit() {
        assert!(Card::from_codes(5, 4).is_none());
        assert_eq!(
            Card::from_codes(5, 3),
            Card::new(5, Suit::Spades),
        );
    }

    #[test]
    fn test_points_for_ace_face_and_numeric() {
        let ace = Card::new(1, Suit::Clubs).unwrap();
        let king = Card::new(13, Suit::Clubs).unwrap();
        let ten = Card::new(10, Suit::Clubs).unwrap();
        let seven = Card::new(7, Suit::Clubs).unwrap();

        assert_eq!(ace.points(), 11);
        assert_eq!(king.points(), 10);
        assert_eq!(ten.points(), 10);
        assert_eq!(seven.points(), 7);
    }

    #[test]
    fn test_display_uses_letters_for_ace_and_faces() {
        assert_eq!(Card::new(1, Suit::Hearts).unwrap().to_string(), "A♥");
        assert_eq!(Card::new(10, Suit::Clubs).unwrap().to_string(), "10♣");
        assert_eq!(Card::new(11, Suit::Spades).unwrap().to_string(), "J♠");
        assert_eq!(Card::new(13, Suit::Diamonds).unwrap().to_string(), "K♦");
    }

    #[test]
    fn test_red_suits() {
        assert!(Suit::Hearts.is_red());
        assert!(Suit::Diamonds.is_red());
        assert!(!Suit::Clubs.is_red());
        assert!(!Suit::Spades.is_red());
    }
}
