//! Application layer use cases for the dealer server.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure game rules in `blackjack_core`) and the infrastructure (sockets,
//! files, threads).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a goal (e.g., "play R rounds of
//!   blackjack against the peer on this stream").
//! - **Depend on abstractions** (traits and generic streams) rather than
//!   concrete sockets, so every use case can be driven from an in-memory
//!   pipe in tests.
//!
//! # Sub-modules
//!
//! - **`play_session`** – The per-connection session state machine.  Reads
//!   the Request, deals each round, consumes Decisions, and settles.
//!
//! - **`session_events`** – Structured progress events emitted by a session
//!   and the observer trait that renders them (log lines by default).

pub mod play_session;
pub mod session_events;
