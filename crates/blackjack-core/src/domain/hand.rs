//! Hands and the soft-ace hand evaluator.

use serde::{Deserialize, Serialize};

use super::card::Card;

/// Target total; anything above it is a bust.
pub const BLACKJACK: u8 = 21;

/// Computes the value of `cards` under the soft-ace rule.
///
/// Every Ace starts at 11.  While the total is over 21 and an Ace is still
/// counted as 11, one Ace is demoted to 1.  The value may exceed 21 when no
/// demotion is left (a bust).  Card order does not affect the result.
pub fn hand_value(cards: &[Card]) -> u8 {
    let (total, _) = evaluate(cards);
    total
}

/// Returns `(total, soft_aces)` where `soft_aces` is how many Aces are still
/// counted as 11.
fn evaluate(cards: &[Card]) -> (u8, u8) {
    let mut total: u32 = cards.iter().map(|c| u32::from(c.points())).sum();
    let mut soft_aces = cards.iter().filter(|c| c.is_ace()).count() as u32;

    while total > u32::from(BLACKJACK) && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }

    // A 52-card deck cannot produce a total beyond u8 range.
    (total.min(u32::from(u8::MAX)) as u8, soft_aces as u8)
}

/// Cards held by one party during a round.  Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Recomputed from the full hand on every call.
    pub fn value(&self) -> u8 {
        hand_value(&self.cards)
    }

    /// `true` while at least one Ace is still counted as 11.
    pub fn is_soft(&self) -> bool {
        evaluate(&self.cards).1 > 0
    }

    pub fn is_bust(&self) -> bool {
        self.value() > BLACKJACK
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}
