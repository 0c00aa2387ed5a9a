//! A single-use 52-card deck.
//!
//! A new deck is shuffled for every round.  Cards are drawn from the end of
//! the backing vector, so a deck never yields the same card twice.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use super::card::{Card, Suit, MAX_RANK, MIN_RANK};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("deck exhausted")]
    Exhausted,
}

/// An ordered, non-restartable sequence of cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 52 rank × suit combinations in a fixed order.
    pub fn ordered() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for rank in MIN_RANK..=MAX_RANK {
            for suit in Suit::ALL {
                // Rank range is fixed above, so construction cannot fail.
                if let Some(card) = Card::new(rank, suit) {
                    cards.push(card);
                }
            }
        }
        Self { cards }
    }

    /// A full deck shuffled with the thread-local RNG.
    pub fn shuffled() -> Self {
        Self::shuffled_with(&mut rand::thread_rng())
    }

    /// A full deck shuffled with the caller's RNG (seeded RNGs give
    /// reproducible decks).
    pub fn shuffled_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.cards.shuffle(rng);
        deck
    }

    /// A deck that yields `cards` in the given order.
    pub fn from_draw_order(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut cards: Vec<Card> = cards.into_iter().collect();
        cards.reverse();
        Self { cards }
    }

    /// Removes and returns the next card.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Exhausted`] when no cards remain.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::Exhausted)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
