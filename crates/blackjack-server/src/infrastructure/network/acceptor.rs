//! TCP acceptor: one independent session task per connection.
//!
//! The accept loop never does session I/O itself.  It accepts a connection,
//! wraps it in a tracing span carrying a fresh session id, and spawns a task
//! that runs the session state machine to completion.  Sessions share only
//! the read-only [`ServerContext`].
//!
//! Shutdown is cooperative: `accept()` is polled with a short timeout so the
//! loop notices when the shared `running` flag is cleared.  Sessions already
//! in progress are left to finish on their own.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::play_session::{
    DeckSource, GameSession, SessionSettings, ShuffledDecks,
};
use crate::application::session_events::{SessionObserver, TracingObserver};

/// How often the accept loop re-checks the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Pause after a failed `accept()` so a persistent error does not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("bind failed on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read listener address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// Immutable state shared by every session the acceptor spawns.
pub struct ServerContext {
    /// Display name; used for logging only.
    pub server_name: String,
    pub settings: SessionSettings,
    pub decks: Arc<dyn DeckSource>,
    pub observer: Arc<dyn SessionObserver>,
}

impl ServerContext {
    /// A context that shuffles a real deck per round and logs via `tracing`.
    pub fn new(server_name: impl Into<String>, settings: SessionSettings) -> Self {
        Self {
            server_name: server_name.into(),
            settings,
            decks: Arc::new(ShuffledDecks),
            observer: Arc::new(TracingObserver),
        }
    }
}

/// Binds the session listener.  Port 0 asks the OS for an ephemeral port.
///
/// # Errors
///
/// Returns [`NetworkError::BindFailed`] if the address is unavailable.
pub async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, NetworkError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| NetworkError::BindFailed { addr, source })
}

/// Returns the address a bound listener is actually using.
///
/// # Errors
///
/// Returns [`NetworkError::LocalAddr`] if the OS cannot report it.
pub fn local_addr(listener: &TcpListener) -> Result<SocketAddr, NetworkError> {
    listener.local_addr().map_err(NetworkError::LocalAddr)
}

/// Accepts connections until `running` is cleared.
///
/// Accept errors (e.g. file-descriptor exhaustion) are logged and the loop
/// continues after a short backoff.
pub async fn serve(listener: TcpListener, ctx: Arc<ServerContext>, running: Arc<AtomicBool>) {
    info!(server = %ctx.server_name, "accepting sessions");

    while running.load(Ordering::Relaxed) {
        match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let span = info_span!("session", id = %Uuid::new_v4(), peer = %peer_addr);
                let ctx = Arc::clone(&ctx);
                tokio::spawn(handle_connection(stream, ctx).instrument(span));
            }
            Ok(Err(e)) => back_off_after_accept_error(&e).await,
            Err(_) => {}
        }
    }

    info!("shutdown flag set; stopping accept loop");
}

async fn back_off_after_accept_error(e: &std::io::Error) {
    error!("accept error: {e}; retrying in {ACCEPT_ERROR_BACKOFF:?}");
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

/// Runs one session and logs how it ended.
async fn handle_connection(stream: TcpStream, ctx: Arc<ServerContext>) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("could not set TCP_NODELAY: {e}");
    }
    info!("connection accepted");

    let mut session = GameSession::new(
        stream,
        ctx.settings,
        Arc::clone(&ctx.decks),
        Arc::clone(&ctx.observer),
    );

    match session.run().await {
        Ok(summary) => info!(rounds = summary.rounds_played, "session closed normally"),
        Err(e) => warn!("session closed with error: {e}"),
    }
}
