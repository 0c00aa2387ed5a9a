//! Binary codec for the four fixed-layout packets.
//!
//! Wire format:
//! ```text
//! [cookie:4][tag:1][body:N]
//!
//! Offer       tag 0x02  [tcp_port:2][name:32]              39 bytes
//! Request     tag 0x03  [rounds:1][name:32]                38 bytes
//! CardUpdate  tag 0x04  [result:1][rank:1][rsvd:1][suit:1]  9 bytes
//! Decision    tag 0x04  [rsvd:1][decision:5]               11 bytes
//! ```
//! Text fields are right-padded with NUL bytes.  The decoder strips trailing
//! NUL and space bytes before interpreting them.

use thiserror::Error;

use crate::domain::card::Card;
use crate::domain::round::RoundResult;
use crate::protocol::messages::{
    CardUpdateMessage, Decision, DecisionMessage, OfferMessage, RequestMessage, CARD_UPDATE_SIZE,
    DECISION_FIELD_LEN, DECISION_SIZE, HEADER_SIZE, MAGIC_COOKIE, NAME_FIELD_LEN, OFFER_SIZE,
    OFFER_TAG, PAYLOAD_TAG, REQUEST_SIZE, REQUEST_TAG,
};

/// Ways a packet can fail structural validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedPacket {
    /// Fewer bytes than the fixed layout size.
    #[error("truncated packet: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    #[error("bad magic cookie: 0x{0:08X}")]
    BadCookie(u32),

    #[error("unexpected type tag: expected 0x{expected:02X}, found 0x{found:02X}")]
    WrongType { expected: u8, found: u8 },

    /// A field holds a value outside its domain (unknown suit, rank > 13, ...).
    #[error("invalid field: {0}")]
    InvalidField(String),
}

/// Errors that can occur while decoding a packet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("malformed packet: {0}")]
    Malformed(#[from] MalformedPacket),

    /// The decision token was neither `"Hittt"` nor `"Stand"`.
    #[error("unknown decision token: {0:?}")]
    UnknownDecision(String),
}

/// A packet with a fixed type tag and a fixed on-wire size.
pub trait WireMessage: Sized {
    const TYPE_TAG: u8;
    /// Total packet size including the header.
    const WIRE_SIZE: usize;

    /// Appends exactly `WIRE_SIZE - HEADER_SIZE` bytes.
    fn encode_body(&self, buf: &mut Vec<u8>);

    /// Parses a body of exactly `WIRE_SIZE - HEADER_SIZE` bytes.
    fn decode_body(body: &[u8]) -> Result<Self, ProtocolError>;
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes `msg` into its exact byte layout, header included.
///
/// # Examples
///
/// ```rust
/// use blackjack_core::protocol::{encode_message, decode_message};
/// use blackjack_core::protocol::messages::RequestMessage;
///
/// let msg = RequestMessage { rounds: 3, client_name: "alice".into() };
/// let bytes = encode_message(&msg);
/// assert_eq!(bytes.len(), 38);
/// assert_eq!(decode_message::<RequestMessage>(&bytes).unwrap(), msg);
/// ```
pub fn encode_message<M: WireMessage>(msg: &M) -> Vec<u8> {
    let mut buf = Vec::with_capacity(M::WIRE_SIZE);
    buf.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
    buf.push(M::TYPE_TAG);
    msg.encode_body(&mut buf);
    debug_assert_eq!(buf.len(), M::WIRE_SIZE);
    buf
}

/// Decodes one packet of type `M` from the front of `bytes`.
///
/// Bytes beyond `M::WIRE_SIZE` are ignored.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] if `bytes` is too short, the cookie
/// does not match, the tag is not `M::TYPE_TAG`, or a field is out of range.
/// Returns [`ProtocolError::UnknownDecision`] for an unrecognised decision
/// token.
pub fn decode_message<M: WireMessage>(bytes: &[u8]) -> Result<M, ProtocolError> {
    require_len(bytes, M::WIRE_SIZE)?;

    let cookie = read_u32(bytes, 0);
    if cookie != MAGIC_COOKIE {
        return Err(MalformedPacket::BadCookie(cookie).into());
    }

    let tag = bytes[4];
    if tag != M::TYPE_TAG {
        return Err(MalformedPacket::WrongType {
            expected: M::TYPE_TAG,
            found: tag,
        }
        .into());
    }

    M::decode_body(&bytes[HEADER_SIZE..M::WIRE_SIZE])
}

// ── Per-message codecs ────────────────────────────────────────────────────────

impl WireMessage for OfferMessage {
    const TYPE_TAG: u8 = OFFER_TAG;
    const WIRE_SIZE: usize = OFFER_SIZE;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.tcp_port.to_be_bytes());
        write_fixed_text(buf, &self.server_name, NAME_FIELD_LEN);
    }

    fn decode_body(body: &[u8]) -> Result<Self, ProtocolError> {
        Ok(Self {
            tcp_port: u16::from_be_bytes([body[0], body[1]]),
            server_name: read_fixed_text(&body[2..2 + NAME_FIELD_LEN]),
        })
    }
}

impl WireMessage for RequestMessage {
    const TYPE_TAG: u8 = REQUEST_TAG;
    const WIRE_SIZE: usize = REQUEST_SIZE;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.push(self.rounds);
        write_fixed_text(buf, &self.client_name, NAME_FIELD_LEN);
    }

    fn decode_body(body: &[u8]) -> Result<Self, ProtocolError> {
        Ok(Self {
            rounds: body[0],
            client_name: read_fixed_text(&body[1..1 + NAME_FIELD_LEN]),
        })
    }
}

impl WireMessage for CardUpdateMessage {
    const TYPE_TAG: u8 = PAYLOAD_TAG;
    const WIRE_SIZE: usize = CARD_UPDATE_SIZE;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        let (rank, suit) = match self.card {
            Some(card) => (card.rank(), card.suit() as u8),
            None => (0, 0),
        };
        buf.push(self.result as u8);
        buf.push(rank);
        buf.push(0); // reserved
        buf.push(suit);
    }

    fn decode_body(body: &[u8]) -> Result<Self, ProtocolError> {
        let result = RoundResult::try_from(body[0]).map_err(|_| {
            MalformedPacket::InvalidField(format!("unknown result code {}", body[0]))
        })?;
        let rank = body[1];
        let suit = body[3];

        let card = if rank == 0 {
            None
        } else {
            Some(Card::from_codes(rank, suit).ok_or_else(|| {
                MalformedPacket::InvalidField(format!("invalid card rank={rank} suit={suit}"))
            })?)
        };

        if card.is_none() && !result.is_terminal() {
            return Err(
                MalformedPacket::InvalidField("active update without a card".to_string()).into(),
            );
        }

        Ok(Self { result, card })
    }
}

impl WireMessage for DecisionMessage {
    const TYPE_TAG: u8 = PAYLOAD_TAG;
    const WIRE_SIZE: usize = DECISION_SIZE;

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.push(0); // reserved
        write_fixed_text(buf, self.decision.token(), DECISION_FIELD_LEN);
    }

    fn decode_body(body: &[u8]) -> Result<Self, ProtocolError> {
        let token = read_fixed_text(&body[1..1 + DECISION_FIELD_LEN]);
        Decision::from_token(&token)
            .map(|decision| Self { decision })
            .ok_or(ProtocolError::UnknownDecision(token))
    }
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn require_len(bytes: &[u8], needed: usize) -> Result<(), ProtocolError> {
    if bytes.len() < needed {
        Err(MalformedPacket::Truncated {
            needed,
            available: bytes.len(),
        }
        .into())
    } else {
        Ok(())
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Writes `text` into a NUL-padded field of exactly `width` bytes, cutting
/// on a UTF-8 boundary if it is too long.
fn write_fixed_text(buf: &mut Vec<u8>, text: &str, width: usize) {
    let mut end = text.len().min(width);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    buf.extend_from_slice(&text.as_bytes()[..end]);
    buf.resize(buf.len() + (width - end), 0);
}

fn read_fixed_text(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != 0 && b != b' ')
        .map_or(0, |i| i + 1);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
