//! UDP offer announcer.
//!
//! Broadcasts an Offer (session TCP port + server name) to the discovery port
//! on a fixed interval.  Clients listening on that port learn the server's
//! address from the datagram's source IP and the advertised port.
//!
//! The announcer runs on a dedicated OS thread with a blocking socket so it
//! never competes with session tasks on the Tokio runtime.  Send failures
//! (e.g. no route while a network interface is down) are logged and the next
//! tick tries again.

use std::net::{SocketAddr, UdpSocket};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use blackjack_core::encode_message;
use blackjack_core::protocol::messages::OfferMessage;
use thiserror::Error;
use tracing::{info, trace, warn};

/// Granularity at which the sleeping thread re-checks the shutdown flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to bind announcer socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to enable broadcast: {0}")]
    Broadcast(#[source] std::io::Error),
    #[error("failed to spawn announcer thread: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnouncerConfig {
    /// Usually `255.255.255.255:13122`.
    pub target: SocketAddr,
    pub interval: Duration,
}

/// Starts broadcasting `offer` until `running` is cleared.
///
/// # Errors
///
/// Returns [`DiscoveryError`] if the socket cannot be set up or the thread
/// cannot be spawned.
pub fn start_announcer(
    offer: &OfferMessage,
    config: AnnouncerConfig,
    running: Arc<AtomicBool>,
) -> Result<JoinHandle<()>, DiscoveryError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], 0));
    let socket =
        UdpSocket::bind(addr).map_err(|source| DiscoveryError::BindFailed { addr, source })?;
    socket.set_broadcast(true).map_err(DiscoveryError::Broadcast)?;

    let packet = encode_message(offer);
    info!(
        "announcing {:?} on port {} to {} every {:?}",
        offer.server_name, offer.tcp_port, config.target, config.interval
    );

    std::thread::Builder::new()
        .name("offer-announcer".to_string())
        .spawn(move || announce_loop(socket, packet, config, running))
        .map_err(DiscoveryError::Spawn)
}

fn announce_loop(
    socket: UdpSocket,
    packet: Vec<u8>,
    config: AnnouncerConfig,
    running: Arc<AtomicBool>,
) {
    let mut sent: u64 = 0;

    while running.load(Ordering::Relaxed) {
        match socket.send_to(&packet, config.target) {
            Ok(_) => {
                sent += 1;
                trace!(sent, "offer sent");
            }
            Err(e) => warn!("offer to {} failed: {e}", config.target),
        }
        sleep_while_running(config.interval, &running);
    }

    info!(sent, "offer announcer stopped");
}

/// Sleeps for `total`, waking early if `running` is cleared.
fn sleep_while_running(total: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + total;
    while running.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(SHUTDOWN_POLL.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack_core::decode_message;

    #[test]
    fn test_announcer_sends_decodable_offers() {
        // Arrange: a plain receiver on loopback stands in for the broadcast address.
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let target = receiver.local_addr().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let offer = OfferMessage {
            tcp_port: 40500,
            server_name: "pyjack".to_string(),
        };

        // Act
        let handle = start_announcer(
            &offer,
            AnnouncerConfig {
                target,
                interval: Duration::from_millis(50),
            },
            Arc::clone(&running),
        )
        .unwrap();
        let mut buf = [0u8; 64];
        let (first, _) = receiver.recv_from(&mut buf).unwrap();
        let first_offer: OfferMessage = decode_message(&buf[..first]).unwrap();
        let (second, _) = receiver.recv_from(&mut buf).unwrap();

        running.store(false, Ordering::Relaxed);
        handle.join().unwrap();

        // Assert
        assert_eq!(first, 39);
        assert_eq!(second, 39);
        assert_eq!(first_offer, offer);
    }

    #[test]
    fn test_sleep_while_running_returns_immediately_when_stopped() {
        let running = AtomicBool::new(false);
        let start = Instant::now();

        sleep_while_running(Duration::from_secs(30), &running);

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_sleep_while_running_waits_full_interval() {
        let running = AtomicBool::new(true);
        let start = Instant::now();

        sleep_while_running(Duration::from_millis(150), &running);

        assert!(start.elapsed() >= Duration::from_millis(150));
    }
}
