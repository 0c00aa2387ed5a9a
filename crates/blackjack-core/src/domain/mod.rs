//! Game domain: cards, decks, hands, and round rules.
//!
//! Pure logic with no I/O.  Everything here is owned by exactly one session
//! at a time, so none of these types need synchronisation.

pub mod card;
pub mod deck;
pub mod hand;
pub mod round;
