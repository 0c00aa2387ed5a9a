//! Structured progress events emitted by a running session.
//!
//! The state machine never formats output itself.  It reports what happened
//! through a [`SessionObserver`], and the observer decides how to present it.
//! The server binary uses [`TracingObserver`], which turns each event into a
//! log line inside the session's tracing span.

use blackjack_core::protocol::messages::Decision;
use blackjack_core::{Card, Party, RoundResult};
use tracing::{debug, info, warn};

use super::play_session::SessionSummary;

/// One step of progress within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RequestReceived {
        peer_name: String,
        rounds: u8,
    },
    /// `round` is 1-based.
    RoundStarted {
        round: u8,
        of: u8,
    },
    CardDealt {
        to: Party,
        card: Card,
    },
    DecisionReceived {
        decision: Decision,
        player_total: u8,
    },
    RoundFinished {
        round: u8,
        outcome: RoundResult,
        player_total: u8,
        dealer_total: u8,
    },
    SessionFinished(SessionSummary),
    SessionAborted {
        reason: String,
    },
}

/// Receives session progress.  Must be cheap; it is called inline between
/// packet writes.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: &SessionEvent);
}

/// Default observer: logs every event with `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::RequestReceived { peer_name, rounds } => {
                info!("player {peer_name:?} requested {rounds} round(s)");
            }
            SessionEvent::RoundStarted { round, of } => info!("round {round}/{of} started"),
            SessionEvent::CardDealt { to, card } => debug!("dealt {card} to {to}"),
            SessionEvent::DecisionReceived {
                decision,
                player_total,
            } => debug!("player chose {decision} at {player_total}"),
            SessionEvent::RoundFinished {
                round,
                outcome,
                player_total,
                dealer_total,
            } => info!("round {round} finished: {outcome} (player {player_total}, dealer {dealer_total})"),
            SessionEvent::SessionFinished(summary) => info!(
                "session with {:?} complete: {} played, {} won, {} lost, {} tied",
                summary.peer_name, summary.rounds_played, summary.wins, summary.losses, summary.ties
            ),
            SessionEvent::SessionAborted { reason } => warn!("session aborted: {reason}"),
        }
    }
}
