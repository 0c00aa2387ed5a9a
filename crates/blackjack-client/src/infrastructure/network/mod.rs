//! Network infrastructure for the player client.
//!
//! # Sub-modules
//!
//! - **`offer_listener`** – Listens on the discovery port for a server's
//!   UDP Offer and reports where its session listener is.
//!
//! - **`connector`** – Opens the TCP session to the chosen server with a
//!   bounded connect timeout.

pub mod connector;
pub mod offer_listener;

use std::net::SocketAddr;

use thiserror::Error;

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum ClientNetworkError {
    /// The discovery port could not be bound (often another client holds it).
    #[error("failed to bind discovery port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    /// Receiving a datagram failed.
    #[error("failed to receive offer: {0}")]
    Recv(#[source] std::io::Error),
    /// TCP connection to the server failed.
    #[error("failed to connect to server at {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out connecting to server at {0}")]
    ConnectTimeout(SocketAddr),
}
