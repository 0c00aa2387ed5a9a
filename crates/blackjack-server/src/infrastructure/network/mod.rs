//! Network infrastructure for the dealer server.
//!
//! # Sub-modules
//!
//! - **`acceptor`** – Binds the TCP listener and spawns one independent
//!   session task per accepted connection.  Accept failures are logged and
//!   retried; they never stop the server.
//!
//! - **`announcer`** – Broadcasts an Offer over UDP on a fixed interval so
//!   clients on the LAN can find the server without manual configuration.

pub mod acceptor;
pub mod announcer;
