//! Reading and writing whole packets over an async byte stream.
//!
//! Every packet has a fixed size, so a frame is simply `WIRE_SIZE` bytes read
//! with `read_exact`.  Reads are bounded by an idle timeout so a silent peer
//! cannot hold a session open forever.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

use crate::protocol::codec::{decode_message, encode_message, ProtocolError, WireMessage};

#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("no data from peer within {0:?}")]
    PeerTimeout(Duration),

    /// End-of-stream before a full packet, or any read/write I/O failure.
    #[error("transport closed: {0}")]
    TransportClosed(#[source] io::Error),
}

/// Reads exactly one `M` packet, waiting at most `idle` for it to arrive.
///
/// # Errors
///
/// - [`FrameError::PeerTimeout`] if the full packet does not arrive in time.
/// - [`FrameError::TransportClosed`] on EOF or an I/O error.
/// - [`FrameError::Protocol`] if the bytes do not decode as `M`.
pub async fn read_message<M, R>(reader: &mut R, idle: Duration) -> Result<M, FrameError>
where
    M: WireMessage,
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; M::WIRE_SIZE];

    match timeout(idle, reader.read_exact(&mut buf)).await {
        Err(_elapsed) => return Err(FrameError::PeerTimeout(idle)),
        Ok(Err(e)) => return Err(FrameError::TransportClosed(e)),
        Ok(Ok(_)) => {}
    }

    trace!(tag = M::TYPE_TAG, len = M::WIRE_SIZE, "frame received");
    Ok(decode_message(&buf)?)
}

/// Encodes `msg` and writes it in full.
///
/// # Errors
///
/// Returns [`FrameError::TransportClosed`] if the write fails.
pub async fn write_message<M, W>(writer: &mut W, msg: &M) -> Result<(), FrameError>
where
    M: WireMessage,
    W: AsyncWrite + Unpin,
{
    let bytes = encode_message(msg);
    trace!(tag = M::TYPE_TAG, len = bytes.len(), "frame sent");
    writer
        .write_all(&bytes)
        .await
        .map_err(FrameError::TransportClosed)?;
    writer.flush().await.map_err(FrameError::TransportClosed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::MalformedPacket;
    use crate::protocol::messages::{Decision, DecisionMessage, RequestMessage};

    const IDLE: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_write_then_read_over_duplex() {
        // Arrange
        let (mut a, mut b) = tokio::io::duplex(64);
        let msg = RequestMessage {
            rounds: 4,
            client_name: "carol".to_string(),
        };

        // Act
        write_message(&mut a, &msg).await.unwrap();
        let received: RequestMessage = read_message(&mut b, IDLE).await.unwrap();

        // Assert
        assert_eq!(received, msg);
    }

    #[tokio::test]
    async fn test_read_reassembles_split_packet() {
        let bytes = encode_message(&DecisionMessage {
            decision: Decision::Stand,
        });
        let mut reader = tokio_test::io::Builder::new()
            .read(&bytes[..3])
            .read(&bytes[3..])
            .build();

        let msg: DecisionMessage = read_message(&mut reader, IDLE).await.unwrap();
        assert_eq!(msg.decision, Decision::Stand);
    }

    #[tokio::test]
    async fn test_eof_mid_packet_is_transport_closed() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&[0xAB, 0xCD]).await.unwrap();
        drop(a);

        let err = read_message::<DecisionMessage, _>(&mut b, IDLE)
            .await
            .unwrap_err();
        assert!(matches!(err, FrameError::TransportClosed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_peer_times_out() {
        let (_a, mut b) = tokio::io::duplex(64);

        let err = read_message::<RequestMessage, _>(&mut b, Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, FrameError::PeerTimeout(d) if d == Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_bad_cookie_surfaces_as_protocol_error() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&[0u8; 11]).await.unwrap();

        let err = read_message::<DecisionMessage, _>(&mut b, IDLE)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::Protocol(ProtocolError::Malformed(MalformedPacket::BadCookie(0)))
        ));
    }
}
