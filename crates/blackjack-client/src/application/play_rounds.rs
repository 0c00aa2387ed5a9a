//! PlayRoundsUseCase: the player's side of a session.
//!
//! The server never says whose card an update carries, so the client works it
//! out from arrival order:
//!
//! ```text
//! update #1, #2             → player
//! update #3                 → dealer (up-card)
//! later, during our turn    → player (answer to a Hit)
//! later, after our turn     → dealer (hole card, then draws)
//! terminal (rank 0)         → round result
//! ```
//!
//! Our turn lasts while the player total is below 21 and we have not stood.
//! The total uses the same soft-ace rule as the server, so both sides agree
//! on when the turn ends without an extra message.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blackjack_core::protocol::messages::{
    CardUpdateMessage, Decision, DecisionMessage, RequestMessage,
};
use blackjack_core::{
    read_message, write_message, Card, FrameError, Hand, Party, ProtocolError, RoundResult,
    BLACKJACK,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// How long the client waits for the server's next update by default.
pub const DEFAULT_SERVER_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("server disconnected: {0}")]
    Disconnected(#[source] io::Error),

    #[error("server sent nothing for {0:?}")]
    Timeout(Duration),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("round result arrived before the opening cards")]
    PrematureResult,

    #[error("failed to read player input: {0}")]
    Input(#[source] io::Error),
}

impl From<FrameError> for ClientError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Protocol(p) => ClientError::Protocol(p),
            FrameError::PeerTimeout(idle) => ClientError::Timeout(idle),
            FrameError::TransportClosed(source) => ClientError::Disconnected(source),
        }
    }
}

/// Chooses hit or stand during the player's turn.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DecisionMaker: Send {
    async fn decide(&mut self, player: &Hand, dealer_up: Card) -> Result<Decision, ClientError>;
}

/// Hits while the player total is below a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdStrategy {
    hit_below: u8,
}

impl ThresholdStrategy {
    pub fn new(hit_below: u8) -> Self {
        Self { hit_below }
    }
}

#[async_trait]
impl DecisionMaker for ThresholdStrategy {
    async fn decide(&mut self, player: &Hand, _dealer_up: Card) -> Result<Decision, ClientError> {
        Ok(if player.value() < self.hit_below {
            Decision::Hit
        } else {
            Decision::Stand
        })
    }
}

/// Progress of the rounds being played, for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    /// `round` is 1-based.
    RoundStarted { round: u8, of: u8 },
    /// `nth` is the 1-based position of `card` in that party's hand; `total`
    /// is the party's total including it.
    CardReceived {
        to: Party,
        card: Card,
        nth: usize,
        total: u8,
    },
    DecisionSent(Decision),
    RoundFinished {
        round: u8,
        result: RoundResult,
        player_total: u8,
        dealer_total: u8,
    },
}

pub trait RoundObserver: Send + Sync {
    fn on_event(&self, event: &RoundEvent);
}

/// An observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl RoundObserver for SilentObserver {
    fn on_event(&self, _event: &RoundEvent) {}
}

/// Results tallied over one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameSummary {
    pub rounds: u8,
    pub wins: u8,
    pub losses: u8,
    pub ties: u8,
}

impl GameSummary {
    fn record(&mut self, result: RoundResult) {
        self.rounds += 1;
        match result {
            RoundResult::PlayerWin => self.wins += 1,
            RoundResult::PlayerLoss => self.losses += 1,
            RoundResult::Tie => self.ties += 1,
            RoundResult::Active => {}
        }
    }

    /// Fraction of rounds won, `0.0` when nothing was played.
    pub fn win_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.rounds)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Sent in the Request; truncated to 32 bytes on the wire.
    pub client_name: String,
    pub server_timeout: Duration,
}

/// Cards seen so far in the current round.
#[derive(Debug, Default)]
struct Table {
    player: Hand,
    dealer: Hand,
    seen: usize,
    players_turn: bool,
    dealer_up: Option<Card>,
}

impl Table {
    fn new() -> Self {
        Self {
            players_turn: true,
            ..Self::default()
        }
    }

    /// Attributes the next card by arrival order and returns who got it.
    fn take(&mut self, card: Card) -> Party {
        self.seen += 1;
        let to = match self.seen {
            1 | 2 => Party::Player,
            3 => Party::Dealer,
            _ if self.players_turn => Party::Player,
            _ => Party::Dealer,
        };

        match to {
            Party::Player => {
                self.player.push(card);
                if self.player.value() >= BLACKJACK {
                    self.players_turn = false;
                }
            }
            Party::Dealer => {
                if self.dealer.is_empty() {
                    self.dealer_up = Some(card);
                }
                self.dealer.push(card);
            }
        }
        to
    }

    fn awaiting_decision(&self) -> Option<Card> {
        if self.seen >= 3 && self.players_turn {
            self.dealer_up
        } else {
            None
        }
    }
}

/// Drives the client side of one session over `stream`.
pub struct ClientSession<S> {
    stream: S,
    settings: ClientSettings,
    observer: Arc<dyn RoundObserver>,
}

impl<S> ClientSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, settings: ClientSettings, observer: Arc<dyn RoundObserver>) -> Self {
        Self {
            stream,
            settings,
            observer,
        }
    }

    /// Requests `rounds` rounds and plays them all.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Disconnected`] if the server closes the stream
    /// before the last result, or any protocol, timeout, or input error.
    pub async fn play(
        &mut self,
        rounds: u8,
        decider: &mut dyn DecisionMaker,
    ) -> Result<GameSummary, ClientError> {
        let request = RequestMessage {
            rounds,
            client_name: self.settings.client_name.clone(),
        };
        write_message(&mut self.stream, &request).await?;
        debug!(rounds, "request sent");

        let mut summary = GameSummary::default();
        for round in 1..=rounds {
            self.observer
                .on_event(&RoundEvent::RoundStarted { round, of: rounds });
            let (result, table) = self.play_round(decider).await?;
            summary.record(result);
            self.observer.on_event(&RoundEvent::RoundFinished {
                round,
                result,
                player_total: table.player.value(),
                dealer_total: table.dealer.value(),
            });
        }

        Ok(summary)
    }

    async fn play_round(
        &mut self,
        decider: &mut dyn DecisionMaker,
    ) -> Result<(RoundResult, Table), ClientError> {
        let mut table = Table::new();

        loop {
            let update: CardUpdateMessage =
                read_message(&mut self.stream, self.settings.server_timeout).await?;

            let card = match update.card {
                Some(card) => card,
                None if table.seen < 3 => return Err(ClientError::PrematureResult),
                None => return Ok((update.result, table)),
            };

            let to = table.take(card);
            let (nth, total) = match to {
                Party::Player => (table.player.len(), table.player.value()),
                Party::Dealer => (table.dealer.len(), table.dealer.value()),
            };
            self.observer.on_event(&RoundEvent::CardReceived {
                to,
                card,
                nth,
                total,
            });

            if let Some(dealer_up) = table.awaiting_decision() {
                let decision = decider.decide(&table.player, dealer_up).await?;
                write_message(&mut self.stream, &DecisionMessage { decision }).await?;
                self.observer.on_event(&RoundEvent::DecisionSent(decision));
                if decision == Decision::Stand {
                    table.players_turn = false;
                }
            }
        }
    }
}
