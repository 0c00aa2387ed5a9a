//! Protocol module containing message types, the binary codec, and async
//! framing helpers.

pub mod codec;
pub mod framing;
pub mod messages;

pub use codec::{decode_message, encode_message, MalformedPacket, ProtocolError, WireMessage};
pub use framing::{read_message, write_message, FrameError};
pub use messages::*;
