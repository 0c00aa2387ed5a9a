//! Infrastructure layer for the player client.
//!
//! Contains OS-facing adapters: UDP offer discovery, the TCP connection to
//! the dealer, and the terminal UI.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `blackjack_core`, but MUST NOT be imported by the `application` layer.

pub mod console;
pub mod network;
