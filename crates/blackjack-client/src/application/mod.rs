//! Application layer use cases for the player client.
//!
//! # Sub-modules
//!
//! - **`play_rounds`** – Sends the Request, consumes the server's card
//!   updates, works out whose card each one is, asks a [`DecisionMaker`] for
//!   hit or stand, and tallies the results.
//!
//! The use case talks to the server through any `AsyncRead + AsyncWrite`
//! stream and to the player through traits, so it runs unchanged against a
//! TCP socket, an in-memory pipe, or a scripted mock.
//!
//! [`DecisionMaker`]: play_rounds::DecisionMaker

pub mod play_rounds;
