//! Round rules: the opening deal, dealer policy, and settlement.
//!
//! [`Round`] holds the live deck and both hands for one round.  It performs
//! no I/O; the session layer decides when to call each step and what to
//! transmit.

use serde::{Deserialize, Serialize};

use super::card::Card;
use super::deck::{Deck, DeckError};
use super::hand::{Hand, BLACKJACK};

/// The dealer draws while below this total and stands on any 17, soft or hard.
pub const DEALER_STANDS_AT: u8 = 17;

/// Who a dealt card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Player,
    Dealer,
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Party::Player => write!(f, "player"),
            Party::Dealer => write!(f, "dealer"),
        }
    }
}

/// Round status carried in the `result` byte of a card update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoundResult {
    /// Round still in progress (non-terminal packet).
    Active = 0x0,
    Tie = 0x1,
    /// Dealer wins.
    PlayerLoss = 0x2,
    PlayerWin = 0x3,
}

impl RoundResult {
    pub fn is_terminal(self) -> bool {
        self != RoundResult::Active
    }
}

impl std::fmt::Display for RoundResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoundResult::Active => "in progress",
            RoundResult::Tie => "tie",
            RoundResult::PlayerLoss => "player loss",
            RoundResult::PlayerWin => "player win",
        };
        f.write_str(s)
    }
}

impl TryFrom<u8> for RoundResult {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x0 => Ok(RoundResult::Active),
            0x1 => Ok(RoundResult::Tie),
            0x2 => Ok(RoundResult::PlayerLoss),
            0x3 => Ok(RoundResult::PlayerWin),
            _ => Err(()),
        }
    }
}

/// Settles a round from the final totals.
///
/// A player bust loses even when the dealer would also bust.
pub fn settle(player_total: u8, dealer_total: u8) -> RoundResult {
    if player_total > BLACKJACK {
        RoundResult::PlayerLoss
    } else if dealer_total > BLACKJACK {
        RoundResult::PlayerWin
    } else if player_total > dealer_total {
        RoundResult::PlayerWin
    } else if player_total < dealer_total {
        RoundResult::PlayerLoss
    } else {
        RoundResult::Tie
    }
}

/// The deck and both hands for one round.
#[derive(Debug, Clone)]
pub struct Round {
    deck: Deck,
    player: Hand,
    dealer: Hand,
    up_card: Card,
    hole_card: Card,
}

impl Round {
    /// Deals the opening hands in the fixed order player, player, dealer,
    /// dealer.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Exhausted`] if `deck` holds fewer than 4 cards.
    pub fn deal(mut deck: Deck) -> Result<Self, DeckError> {
        let p1 = deck.draw()?;
        let p2 = deck.draw()?;
        let up_card = deck.draw()?;
        let hole_card = deck.draw()?;

        Ok(Self {
            deck,
            player: [p1, p2].into_iter().collect(),
            dealer: [up_card, hole_card].into_iter().collect(),
            up_card,
            hole_card,
        })
    }

    /// The three cards revealed at the start of a round: both player cards
    /// and the dealer's up-card.
    pub fn opening_cards(&self) -> [Card; 3] {
        let p = self.player.cards();
        [p[0], p[1], self.up_card]
    }

    pub fn up_card(&self) -> Card {
        self.up_card
    }

    /// The dealer's second card, withheld until the dealer phase.
    pub fn hole_card(&self) -> Card {
        self.hole_card
    }

    pub fn player(&self) -> &Hand {
        &self.player
    }

    pub fn dealer(&self) -> &Hand {
        &self.dealer
    }

    /// `true` while the player is below 21 and must choose hit or stand.
    pub fn player_must_act(&self) -> bool {
        self.player.value() < BLACKJACK
    }

    /// Draws a card into the player's hand.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Exhausted`] if the deck is empty.
    pub fn hit_player(&mut self) -> Result<Card, DeckError> {
        let card = self.deck.draw()?;
        self.player.push(card);
        Ok(card)
    }

    pub fn dealer_should_draw(&self) -> bool {
        self.dealer.value() < DEALER_STANDS_AT
    }

    /// Draws a card into the dealer's hand.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::Exhausted`] if the deck is empty.
    pub fn hit_dealer(&mut self) -> Result<Card, DeckError> {
        let card = self.deck.draw()?;
        self.dealer.push(card);
        Ok(card)
    }

    pub fn outcome(&self) -> RoundResult {
        settle(self.player.value(), self.dealer.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::Suit;

    fn card(rank: u8, suit: Suit) -> Card {
        Card::new(rank, suit).unwrap()
    }

    #[test]
    fn test_settle_player_bust_loses_even_if_dealer_busts() {
        assert_eq!(settle(22, 25), RoundResult::PlayerLoss);
    }

    #[test]
    fn test_settle_dealer_bust_player_wins() {
        assert_eq!(settle(12, 22), RoundResult::PlayerWin);
    }

    #[test]
    fn test_settle_comparisons() {
        assert_eq!(settle(20, 18), RoundResult::PlayerWin);
        assert_eq!(settle(17, 19), RoundResult::PlayerLoss);
        assert_eq!(settle(18, 18), RoundResult::Tie);
        assert_eq!(settle(21, 21), RoundResult::Tie);
    }

    #[test]
    fn test_round_result_wire_codes() {
        assert_eq!(RoundResult::Active as u8, 0x0);
        assert_eq!(RoundResult::Tie as u8, 0x1);
        assert_eq!(RoundResult::PlayerLoss as u8, 0x2);
        assert_eq!(RoundResult::PlayerWin as u8, 0x3);
        assert_eq!(RoundResult::try_from(0x4), Err(()));
    }

    #[test]
    fn test_deal_order_is_player_player_dealer_dealer() {
        // Arrange
        let deck = Deck::from_draw_order([
            card(5, Suit::Hearts),
            card(6, Suit::Diamonds),
            card(10, Suit::Clubs),
            card(7, Suit::Spades),
        ]);

        // Act
        let round = Round::deal(deck).unwrap();

        // Assert
        assert_eq!(
            round.opening_cards(),
            [card(5, Suit::Hearts), card(6, Suit::Diamonds), card(10, Suit::Clubs)]
        );
        assert_eq!(round.hole_card(), card(7, Suit::Spades));
        assert_eq!(round.player().value(), 11);
        assert_eq!(round.dealer().value(), 17);
    }

    #[test]
    fn test_deal_from_short_deck_fails() {
        let deck = Deck::from_draw_order([card(2, Suit::Hearts), card(3, Suit::Hearts)]);
        assert_eq!(Round::deal(deck).unwrap_err(), DeckError::Exhausted);
    }

    #[test]
    fn test_dealer_stands_on_soft_seventeen() {
        let deck = Deck::from_draw_order([
            card(9, Suit::Hearts),
            card(9, Suit::Clubs),
            card(1, Suit::Spades),
            card(6, Suit::Spades),
        ]);
        let round = Round::deal(deck).unwrap();
        assert_eq!(round.dealer().value(), 17);
        assert!(round.dealer().is_soft());
        assert!(!round.dealer_should_draw());
    }

    #[test]
    fn test_player_with_natural_does_not_act() {
        let deck = Deck::from_draw_order([
            card(1, Suit::Hearts),
            card(13, Suit::Clubs),
            card(2, Suit::Spades),
            card(3, Suit::Spades),
        ]);
        let round = Round::deal(deck).unwrap();
        assert!(!round.player_must_act());
    }

    #[test]
    fn test_hit_player_appends_and_outcome_reflects_bust() {
        let deck = Deck::from_draw_order([
            card(10, Suit::Hearts),
            card(6, Suit::Clubs),
            card(9, Suit::Spades),
            card(8, Suit::Spades),
            card(13, Suit::Diamonds),
        ]);
        let mut round = Round::deal(deck).unwrap();

        let drawn = round.hit_player().unwrap();

        assert_eq!(drawn, card(13, Suit::Diamonds));
        assert_eq!(round.player().len(), 3);
        assert!(round.player().is_bust());
        assert_eq!(round.outcome(), RoundResult::PlayerLoss);
    }
}
