//! # blackjack-core
//!
//! Shared library for the networked blackjack service containing the wire
//! codec, async framing helpers, and the card, deck, and hand rules.
//!
//! This crate is used by both the server and client applications.  It opens
//! no sockets itself; framing works over any `AsyncRead`/`AsyncWrite`.
//!
//! # Architecture overview (for beginners)
//!
//! A server advertises itself with a UDP broadcast (the *Offer*).  A client
//! that hears the offer connects over TCP and sends a *Request* naming how
//! many rounds it wants.  For each round the server deals cards, streaming
//! one *CardUpdate* per revealed card, and the client answers with *Decision*
//! packets ("hit" or "stand") while its hand is below 21.  Each round ends
//! with a terminal CardUpdate carrying the result.
//!
//! This crate defines:
//!
//! - **`protocol`** – How bytes travel over the network.  Four fixed-size,
//!   big-endian packet layouts, each prefixed with a magic cookie and a type
//!   tag, plus helpers that read and write whole packets with an idle
//!   timeout.
//!
//! - **`domain`** – Pure game logic with no I/O: cards, a single-use shuffled
//!   deck, the soft-ace hand evaluator, and the dealer/settlement rules.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `blackjack_core::Hand` instead of `blackjack_core::domain::hand::Hand`.
pub use domain::card::{Card, Suit};
pub use domain::deck::{Deck, DeckError};
pub use domain::hand::{hand_value, Hand, BLACKJACK};
pub use domain::round::{settle, Party, Round, RoundResult, DEALER_STANDS_AT};
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::framing::{read_message, write_message, FrameError};
