//! Offer discovery.
//!
//! Servers broadcast a 39-byte Offer to the discovery port.  The client binds
//! that port, waits for the first Offer that decodes and passes the name
//! filter, and combines the datagram's source IP with the advertised TCP port.
//! Anything else arriving on the port (other protocols, stale offers from
//! servers we are not looking for) is skipped.
//!
//! The port is bound with `SO_REUSEADDR` (and `SO_REUSEPORT` on Unix) so
//! several clients on one host can listen for the same broadcasts.  A socket
//! is only kept while waiting: offers that arrive during a session would
//! otherwise queue up and be mistaken for current ones next time.

use std::net::SocketAddr;

use blackjack_core::decode_message;
use blackjack_core::protocol::messages::OfferMessage;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tracing::{debug, trace};

use super::ClientNetworkError;

/// Large enough for any datagram we care about plus some slack, so oversized
/// junk is truncated rather than mistaken for an Offer.
const RECV_BUFFER: usize = 512;

/// Which servers the client is willing to join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFilter {
    Any,
    Named(String),
}

impl ServerFilter {
    pub fn accepts(&self, server_name: &str) -> bool {
        match self {
            ServerFilter::Any => true,
            ServerFilter::Named(want) => want == server_name,
        }
    }
}

/// A server learned from an Offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOffer {
    /// Source IP of the Offer with the advertised TCP port.
    pub addr: SocketAddr,
    pub server_name: String,
}

/// Binds the discovery port on all interfaces, shareable with other
/// listeners on the same host.  Must be called inside a Tokio runtime.
///
/// # Errors
///
/// Returns [`ClientNetworkError::Bind`] if the socket cannot be set up.
pub fn bind_offer_socket(port: u16) -> Result<UdpSocket, ClientNetworkError> {
    let bind_err = |source| ClientNetworkError::Bind { port, source };

    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).map_err(bind_err)?;
    socket.set_reuse_address(true).map_err(bind_err)?;
    #[cfg(unix)]
    socket.set_reuse_port(true).map_err(bind_err)?;
    socket.set_nonblocking(true).map_err(bind_err)?;
    socket
        .bind(&SocketAddr::from(([0, 0, 0, 0], port)).into())
        .map_err(bind_err)?;

    UdpSocket::from_std(socket.into()).map_err(bind_err)
}

/// Binds the discovery port, waits for an acceptable Offer, and releases the
/// port again.
///
/// # Errors
///
/// Returns [`ClientNetworkError::Bind`] or [`ClientNetworkError::Recv`].
pub async fn discover_server(
    port: u16,
    filter: &ServerFilter,
) -> Result<ServerOffer, ClientNetworkError> {
    let socket = bind_offer_socket(port)?;
    wait_for_offer(&socket, filter).await
}

/// Waits until an acceptable Offer arrives on `socket`.
///
/// # Errors
///
/// Returns [`ClientNetworkError::Recv`] if the socket itself fails.
pub async fn wait_for_offer(
    socket: &UdpSocket,
    filter: &ServerFilter,
) -> Result<ServerOffer, ClientNetworkError> {
    let mut buf = [0u8; RECV_BUFFER];

    loop {
        let (n, from) = socket
            .recv_from(&mut buf)
            .await
            .map_err(ClientNetworkError::Recv)?;

        let offer: OfferMessage = match decode_message(&buf[..n]) {
            Ok(offer) => offer,
            Err(e) => {
                trace!("ignoring {n}-byte datagram from {from}: {e}");
                continue;
            }
        };

        if !filter.accepts(&offer.server_name) {
            debug!("skipping offer from {from} ({:?})", offer.server_name);
            continue;
        }

        return Ok(ServerOffer {
            addr: SocketAddr::new(from.ip(), offer.tcp_port),
            server_name: offer.server_name,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack_core::encode_message;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(2);

    async fn loopback_pair() -> (UdpSocket, UdpSocket, SocketAddr) {
        let listener = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        (listener, sender, addr)
    }

    fn offer(port: u16, name: &str) -> Vec<u8> {
        encode_message(&OfferMessage {
            tcp_port: port,
            server_name: name.to_string(),
        })
    }

    fn loopback(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[test]
    fn test_filter_any_accepts_everything() {
        assert!(ServerFilter::Any.accepts("pyjack"));
        assert!(ServerFilter::Any.accepts(""));
    }

    #[test]
    fn test_filter_named_requires_exact_match() {
        let filter = ServerFilter::Named("pyjack".to_string());
        assert!(filter.accepts("pyjack"));
        assert!(!filter.accepts("pyjack2"));
        assert!(!filter.accepts("PYJACK"));
    }

    #[tokio::test]
    async fn test_offer_address_uses_sender_ip_and_advertised_port() {
        // Arrange
        let (listener, sender, addr) = loopback_pair().await;
        sender.send_to(&offer(40123, "pyjack"), addr).await.unwrap();

        // Act
        let found = wait_for_offer(&listener, &ServerFilter::Any).await.unwrap();

        // Assert
        assert_eq!(found.addr, "127.0.0.1:40123".parse().unwrap());
        assert_eq!(found.server_name, "pyjack");
    }

    #[tokio::test]
    async fn test_garbage_and_filtered_offers_are_skipped() {
        // Arrange
        let (listener, sender, addr) = loopback_pair().await;
        sender.send_to(b"hello there", addr).await.unwrap();
        sender.send_to(&offer(1111, "other"), addr).await.unwrap();
        sender.send_to(&offer(2222, "pyjack"), addr).await.unwrap();

        // Act
        let found = tokio::time::timeout(
            WAIT,
            wait_for_offer(&listener, &ServerFilter::Named("pyjack".to_string())),
        )
        .await
        .expect("offer within timeout")
        .unwrap();

        // Assert
        assert_eq!(found.addr.port(), 2222);
    }

    #[tokio::test]
    async fn test_two_listeners_can_share_discovery_port() {
        // Arrange
        let first = bind_offer_socket(0).unwrap();
        let port = first.local_addr().unwrap().port();

        // Act
        let second = bind_offer_socket(port);

        // Assert
        let second = second.expect("second listener must bind the same port");
        assert_eq!(second.local_addr().unwrap().port(), port);
    }

    #[tokio::test]
    async fn test_fresh_socket_ignores_offers_queued_on_previous_one() {
        // Arrange: offers from an old server pile up on the first socket.
        let old = bind_offer_socket(0).unwrap();
        let port = old.local_addr().unwrap().port();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        for _ in 0..5 {
            sender.send_to(&offer(1111, "pyjack"), loopback(port)).await.unwrap();
        }
        let first = tokio::time::timeout(WAIT, wait_for_offer(&old, &ServerFilter::Any))
            .await
            .expect("first offer")
            .unwrap();
        drop(old);

        // Act: the next wait starts from a new socket while a new server announces.
        let fresh = bind_offer_socket(port).unwrap();
        sender.send_to(&offer(2222, "pyjack"), loopback(port)).await.unwrap();
        let second = tokio::time::timeout(WAIT, wait_for_offer(&fresh, &ServerFilter::Any))
            .await
            .expect("second offer")
            .unwrap();

        // Assert
        assert_eq!(first.addr.port(), 1111);
        assert_eq!(second.addr.port(), 2222);
    }

    #[tokio::test]
    async fn test_discover_server_finds_announcing_server() {
        // Arrange: pick a free port, then announce on it repeatedly.
        let port = {
            let scratch = bind_offer_socket(0).unwrap();
            scratch.local_addr().unwrap().port()
        };
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let announcer = tokio::spawn(async move {
            loop {
                let _ = sender.send_to(&offer(3333, "pyjack"), loopback(port)).await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        });

        // Act
        let found = tokio::time::timeout(
            WAIT,
            discover_server(port, &ServerFilter::Named("pyjack".to_string())),
        )
        .await
        .expect("offer within timeout")
        .unwrap();
        announcer.abort();

        // Assert
        assert_eq!(found.addr, loopback(3333));
    }
}
