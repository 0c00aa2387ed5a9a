//! Protocol message types and wire constants.
//!
//! Every packet starts with the 4-byte magic cookie followed by a 1-byte type
//! tag.  All multi-byte integers are big-endian and every layout is fixed, so
//! the size of each packet is known before reading it.

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::round::RoundResult;

/// Sentinel that prefixes every packet.
pub const MAGIC_COOKIE: u32 = 0xABCD_DCBA;

/// Cookie (4 bytes) + type tag (1 byte).
pub const HEADER_SIZE: usize = 5;

/// Width of the fixed name field in Offer and Request packets.
pub const NAME_FIELD_LEN: usize = 32;

/// Width of the fixed decision token in Decision packets.
pub const DECISION_FIELD_LEN: usize = 5;

/// Well-known UDP port for discovery broadcasts.
pub const DISCOVERY_PORT: u16 = 13122;

/// Name advertised by a server when none is configured.
pub const DEFAULT_SERVER_NAME: &str = "pyjack";

pub const OFFER_TAG: u8 = 0x02;
pub const REQUEST_TAG: u8 = 0x03;
/// Shared by CardUpdate (server→client) and Decision (client→server); the
/// direction of travel tells them apart.
pub const PAYLOAD_TAG: u8 = 0x04;

pub const OFFER_SIZE: usize = HEADER_SIZE + 2 + NAME_FIELD_LEN;
pub const REQUEST_SIZE: usize = HEADER_SIZE + 1 + NAME_FIELD_LEN;
pub const CARD_UPDATE_SIZE: usize = HEADER_SIZE + 4;
pub const DECISION_SIZE: usize = HEADER_SIZE + 1 + DECISION_FIELD_LEN;

pub const HIT_TOKEN: &str = "Hittt";
pub const STAND_TOKEN: &str = "Stand";

/// Discovery broadcast advertising a session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferMessage {
    pub tcp_port: u16,
    pub server_name: String,
}

/// Opens a session and declares how many rounds to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub rounds: u8,
    pub client_name: String,
}

/// A dealt card, or the terminal result of a round.
///
/// Non-terminal updates carry `result == Active` and a card.  The terminal
/// update carries the outcome and no card (rank 0, suit 0 on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUpdateMessage {
    pub result: RoundResult,
    pub card: Option<Card>,
}

impl CardUpdateMessage {
    pub fn dealt(card: Card) -> Self {
        Self {
            result: RoundResult::Active,
            card: Some(card),
        }
    }

    pub fn finished(result: RoundResult) -> Self {
        Self { result, card: None }
    }

    pub fn is_terminal(&self) -> bool {
        self.result.is_terminal()
    }
}

/// The player's choice during their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Hit,
    Stand,
}

impl Decision {
    /// The exact 5-byte ASCII token sent on the wire.
    pub fn token(self) -> &'static str {
        match self {
            Decision::Hit => HIT_TOKEN,
            Decision::Stand => STAND_TOKEN,
        }
    }

    /// Matches a trimmed token against the two literal values.  Partial
    /// matches such as `"Hit"` are rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            HIT_TOKEN => Some(Decision::Hit),
            STAND_TOKEN => Some(Decision::Stand),
            _ => None,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Hit => write!(f, "hit"),
            Decision::Stand => write!(f, "stand"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionMessage {
    pub decision: Decision,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_packet_sizes() {
        assert_eq!(OFFER_SIZE, 39);
        assert_eq!(REQUEST_SIZE, 38);
        assert_eq!(CARD_UPDATE_SIZE, 9);
        assert_eq!(DECISION_SIZE, 11);
    }

    #[test]
    fn test_decision_tokens_are_five_bytes() {
        assert_eq!(Decision::Hit.token().len(), DECISION_FIELD_LEN);
        assert_eq!(Decision::Stand.token().len(), DECISION_FIELD_LEN);
    }

    #[test]
    fn test_from_token_requires_exact_match() {
        assert_eq!(Decision::from_token("Hittt"), Some(Decision::Hit));
        assert_eq!(Decision::from_token("Stand"), Some(Decision::Stand));
        assert_eq!(Decision::from_token("Hit"), None);
        assert_eq!(Decision::from_token("Hitxx"), None);
        assert_eq!(Decision::from_token("stand"), None);
    }
}
