//! TCP session connector.
//!
//! Opens the connection to a server's session listener.  The connect is
//! bounded by a timeout so an offer from a server that has since gone away
//! does not hang the client.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{debug, info};

use super::ClientNetworkError;

/// Connects to the server's session listener, giving up after `timeout`.
///
/// # Errors
///
/// Returns [`ClientNetworkError::ConnectFailed`] on refusal or
/// [`ClientNetworkError::ConnectTimeout`] if the server does not answer.
pub async fn connect(addr: SocketAddr, timeout: Duration) -> Result<TcpStream, ClientNetworkError> {
    debug!("connecting to {addr}");
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| ClientNetworkError::ConnectTimeout(addr))?
        .map_err(|source| ClientNetworkError::ConnectFailed { addr, source })?;

    // Packets are tiny and interactive.
    if let Err(e) = stream.set_nodelay(true) {
        debug!("failed to set TCP_NODELAY: {e}");
    }
    info!("connected to {addr}");
    Ok(stream)
}
