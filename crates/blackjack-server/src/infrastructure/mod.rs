//! Infrastructure layer for the dealer server.
//!
//! Contains OS-facing adapters: the TCP acceptor, the UDP offer announcer,
//! and TOML configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `blackjack_core`, but MUST NOT be imported by the `application` layer.

pub mod network;
pub mod storage;
