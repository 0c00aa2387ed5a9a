//! PlaySessionUseCase: drives one blackjack session end-to-end for one peer.
//!
//! A session owns its stream, and each round owns a fresh deck and both
//! hands.  Nothing here is shared with other sessions, so any number of
//! sessions can run concurrently without locks.
//!
//! # Session lifecycle (for beginners)
//!
//! ```text
//! AwaitingRequest ──► PlayingRound(0) ──► RoundSettling(0) ──► PlayingRound(1) ...
//!        │                  │                                       │
//!        │ (R == 0)         │ any error                             ▼
//!        ▼                  ▼                                  SessionDone
//!   SessionDone       SessionAborted
//! ```
//!
//! Within a round the server:
//!
//! 1. Deals player, player, dealer, dealer from a freshly shuffled deck and
//!    sends the first three cards.  The dealer's second card stays hidden.
//! 2. Reads one Decision per turn while the player is below 21.  A hit adds a
//!    card and sends it; a stand ends the turn.
//! 3. If the player busts the round is lost immediately.  Otherwise the
//!    hidden card is revealed and the dealer draws while below 17.
//! 4. Sends one terminal update carrying the result.
//!
//! Any protocol violation, idle timeout, or transport error ends the session
//! and closes the stream.  Errors never leave the owning session.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use blackjack_core::protocol::codec::MalformedPacket;
use blackjack_core::protocol::messages::{
    CardUpdateMessage, Decision, DecisionMessage, RequestMessage,
};
use blackjack_core::{
    read_message, write_message, Card, Deck, DeckError, FrameError, Party, ProtocolError, Round,
    RoundResult,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::session_events::{SessionEvent, SessionObserver};

/// How long a session waits for the peer's next packet.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Reasons a session ends early.  Each one is local to its session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed packet: {0}")]
    MalformedPacket(MalformedPacket),

    #[error("unknown decision token {0:?}")]
    UnknownDecision(String),

    #[error("deck exhausted mid-round")]
    DeckExhausted,

    #[error("peer sent nothing for {0:?}")]
    PeerTimeout(Duration),

    #[error("transport closed: {0}")]
    TransportClosed(#[source] io::Error),
}

impl From<FrameError> for SessionError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Protocol(ProtocolError::Malformed(m)) => SessionError::MalformedPacket(m),
            FrameError::Protocol(ProtocolError::UnknownDecision(token)) => {
                SessionError::UnknownDecision(token)
            }
            FrameError::PeerTimeout(idle) => SessionError::PeerTimeout(idle),
            FrameError::TransportClosed(source) => SessionError::TransportClosed(source),
        }
    }
}

impl From<DeckError> for SessionError {
    fn from(_: DeckError) -> Self {
        SessionError::DeckExhausted
    }
}

/// Supplies one fresh deck per round.
///
/// The production implementation shuffles; tests inject fixed decks.
#[cfg_attr(test, mockall::automock)]
pub trait DeckSource: Send + Sync {
    fn fresh_deck(&self) -> Deck;
}

/// Shuffles a full 52-card deck for every round.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShuffledDecks;

impl DeckSource for ShuffledDecks {
    fn fresh_deck(&self) -> Deck {
        Deck::shuffled()
    }
}

/// Per-session settings shared read-only by every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Upper bound on every blocking read from the peer.
    pub idle_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Where a session is in its lifecycle.  Round indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingRequest,
    PlayingRound(u8),
    RoundSettling(u8),
    Done,
    Aborted,
}

/// Totals for a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub peer_name: String,
    pub rounds_requested: u8,
    pub rounds_played: u8,
    pub wins: u8,
    pub losses: u8,
    pub ties: u8,
}

impl SessionSummary {
    fn record(&mut self, outcome: RoundResult) {
        self.rounds_played += 1;
        match outcome {
            RoundResult::PlayerWin => self.wins += 1,
            RoundResult::PlayerLoss => self.losses += 1,
            RoundResult::Tie => self.ties += 1,
            RoundResult::Active => {}
        }
    }
}

/// The session state machine for one connected peer.
pub struct GameSession<S> {
    stream: S,
    settings: SessionSettings,
    decks: Arc<dyn DeckSource>,
    observer: Arc<dyn SessionObserver>,
    state: SessionState,
}

impl<S> GameSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        settings: SessionSettings,
        decks: Arc<dyn DeckSource>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            stream,
            settings,
            decks,
            observer,
            state: SessionState::AwaitingRequest,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to completion and closes the stream.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionError`] that aborted the session.  The stream is
    /// shut down either way.
    pub async fn run(&mut self) -> Result<SessionSummary, SessionError> {
        let result = self.drive().await;

        match &result {
            Ok(summary) => {
                self.state = SessionState::Done;
                self.observer
                    .on_event(&SessionEvent::SessionFinished(summary.clone()));
            }
            Err(e) => {
                self.state = SessionState::Aborted;
                self.observer.on_event(&SessionEvent::SessionAborted {
                    reason: e.to_string(),
                });
            }
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!("stream shutdown failed: {e}");
        }

        result
    }

    async fn drive(&mut self) -> Result<SessionSummary, SessionError> {
        let request: RequestMessage =
            read_message(&mut self.stream, self.settings.idle_timeout).await?;

        self.observer.on_event(&SessionEvent::RequestReceived {
            peer_name: request.client_name.clone(),
            rounds: request.rounds,
        });

        let mut summary = SessionSummary {
            peer_name: request.client_name,
            rounds_requested: request.rounds,
            ..SessionSummary::default()
        };

        for index in 0..request.rounds {
            self.state = SessionState::PlayingRound(index);
            self.observer.on_event(&SessionEvent::RoundStarted {
                round: index + 1,
                of: request.rounds,
            });
            let round = self.play_round().await?;

            self.state = SessionState::RoundSettling(index);
            let outcome = round.outcome();
            write_message(&mut self.stream, &CardUpdateMessage::finished(outcome)).await?;
            summary.record(outcome);

            self.observer.on_event(&SessionEvent::RoundFinished {
                round: index + 1,
                outcome,
                player_total: round.player().value(),
                dealer_total: round.dealer().value(),
            });
        }

        Ok(summary)
    }

    /// Plays one round up to, but not including, the terminal update.
    async fn play_round(&mut self) -> Result<Round, SessionError> {
        let mut round = Round::deal(self.decks.fresh_deck())?;

        let [p1, p2, up] = round.opening_cards();
        self.send_card(Party::Player, p1).await?;
        self.send_card(Party::Player, p2).await?;
        self.send_card(Party::Dealer, up).await?;

        while round.player_must_act() {
            let msg: DecisionMessage =
                read_message(&mut self.stream, self.settings.idle_timeout).await?;
            self.observer.on_event(&SessionEvent::DecisionReceived {
                decision: msg.decision,
                player_total: round.player().value(),
            });

            match msg.decision {
                Decision::Hit => {
                    let card = round.hit_player()?;
                    self.send_card(Party::Player, card).await?;
                }
                Decision::Stand => break,
            }
        }

        if round.player().is_bust() {
            return Ok(round);
        }

        self.send_card(Party::Dealer, round.hole_card()).await?;
        while round.dealer_should_draw() {
            let card = round.hit_dealer()?;
            self.send_card(Party::Dealer, card).await?;
        }

        Ok(round)
    }

    async fn send_card(&mut self, to: Party, card: Card) -> Result<(), SessionError> {
        write_message(&mut self.stream, &CardUpdateMessage::dealt(card)).await?;
        self.observer.on_event(&SessionEvent::CardDealt { to, card });
        Ok(())
    }
}
