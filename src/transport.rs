//! Correlated request/response exchanges over one device link.

use tracing::trace;

use crate::error::{AmpError, Result};
use crate::link::DeviceLink;
use crate::protocol::{Command, build_frame, parse_frame};

/// Seed for the correlation-id counter. The first id on the wire is the
/// successor of this value.
pub(crate) const COMMAND_ID_SEED: u32 = 0x0199_E447;

/// Size of the receive buffer for one read.
const RECV_BUF_LEN: usize = 1024;

/// Owns a device link and the correlation-id counter, turning payloads into
/// framed requests and matching responses back to them.
///
/// `request` takes `&mut self`, so two exchanges on the same transport can
/// never interleave; the per-connection mutex in
/// [`crate::connection::AmplifierConnection`] serializes callers. Interleaved
/// requests on a shared stream would each consume the other's response.
pub struct Transport<L: DeviceLink> {
    link: L,
    command_id: u32,
}

impl<L: DeviceLink> Transport<L> {
    /// Wrap a freshly opened link.
    pub fn new(link: L) -> Self {
        Self { link, command_id: COMMAND_ID_SEED }
    }

    /// Advance and return the correlation-id counter, wrapping mod 2^32.
    fn next_command_id(&mut self) -> u32 {
        self.command_id = self.command_id.wrapping_add(1);
        self.command_id
    }

    /// Send `payload` as a request and await the response with the same id.
    ///
    /// Frames that are not the matching response (stale responses, echoed
    /// requests) are discarded and the read continues. There is no read
    /// timeout: a device that accepts the request but never answers leaves
    /// this call suspended until the caller is cancelled or the peer closes
    /// the stream.
    pub async fn request(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        let id = self.next_command_id();
        let envelope = Command::request(id, payload.to_vec()).encode()?;
        trace!(id, len = payload.len(), "sending request");

        self.link
            .send(&build_frame(&envelope))
            .await
            .map_err(|e| AmpError::connection("write failed", Some(e)))?;

        let mut buf = [0u8; RECV_BUF_LEN];
        loop {
            let n = self
                .link
                .recv(&mut buf)
                .await
                .map_err(|e| AmpError::connection("read failed", Some(e)))?;
            if n == 0 {
                return Err(AmpError::connection("peer closed the stream", None));
            }

            let command = Command::decode(parse_frame(&buf[..n])?)?;
            if !command.is_request && command.id == id {
                trace!(id, len = command.data.len(), "matched response");
                return Ok(command.data);
            }
            trace!(
                got = command.id,
                expected = id,
                is_request = command.is_request,
                "discarding unrelated frame"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PASSIVE_QUERY;
    use std::collections::VecDeque;

    /// Scripted link: records writes, replays queued reads.
    struct MockLink {
        sent: Vec<Vec<u8>>,
        incoming: VecDeque<std::io::Result<Vec<u8>>>,
    }

    impl MockLink {
        fn new(incoming: Vec<std::io::Result<Vec<u8>>>) -> Self {
            Self { sent: Vec::new(), incoming: incoming.into() }
        }
    }

    #[async_trait::async_trait]
    impl DeviceLink for MockLink {
        async fn send(&mut self, bytes: &[u8]) -> std::io::Result<()> {
            self.sent.push(bytes.to_vec());
            Ok(())
        }

        async fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.incoming.pop_front() {
                Some(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0), // script exhausted, peer closed
            }
        }
    }

    fn response_frame(id: u32, data: &[u8]) -> Vec<u8> {
        build_frame(&Command { is_request: false, id, data: data.to_vec() }.encode().unwrap())
    }

    #[tokio::test]
    async fn first_id_is_seed_successor() {
        let link = MockLink::new(vec![Ok(response_frame(COMMAND_ID_SEED + 1, b"ok"))]);
        let mut transport = Transport::new(link);
        assert_eq!(transport.request(&PASSIVE_QUERY).await.unwrap(), b"ok");
    }

    #[tokio::test]
    async fn id_wraps_around() {
        let mut transport = Transport::new(MockLink::new(vec![]));
        transport.command_id = u32::MAX;
        assert_eq!(transport.next_command_id(), 0);
    }

    #[tokio::test]
    async fn request_is_framed_and_correlated() {
        let expected_id = COMMAND_ID_SEED + 1;
        let link = MockLink::new(vec![Ok(response_frame(expected_id, &[0xAB]))]);
        let mut transport = Transport::new(link);
        transport.request(&PASSIVE_QUERY).await.unwrap();

        let wire = &transport.link.sent[0];
        let command = Command::decode(parse_frame(wire).unwrap()).unwrap();
        assert!(command.is_request);
        assert_eq!(command.id, expected_id);
        assert_eq!(command.data, PASSIVE_QUERY);
    }

    #[tokio::test]
    async fn mismatched_id_is_discarded() {
        let id = COMMAND_ID_SEED + 1;
        let link = MockLink::new(vec![
            Ok(response_frame(0xDEAD_BEEF, b"stale")),
            Ok(response_frame(id, b"fresh")),
        ]);
        let mut transport = Transport::new(link);
        assert_eq!(transport.request(&PASSIVE_QUERY).await.unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn echoed_request_is_discarded() {
        let id = COMMAND_ID_SEED + 1;
        let echo = build_frame(&Command::request(id, b"echo".to_vec()).encode().unwrap());
        let link = MockLink::new(vec![Ok(echo), Ok(response_frame(id, b"real"))]);
        let mut transport = Transport::new(link);
        assert_eq!(transport.request(&PASSIVE_QUERY).await.unwrap(), b"real");
    }

    #[tokio::test]
    async fn peer_close_is_connection_error() {
        let mut transport = Transport::new(MockLink::new(vec![]));
        let err = transport.request(&PASSIVE_QUERY).await.unwrap_err();
        assert!(matches!(err, AmpError::Connection { .. }));
    }

    #[tokio::test]
    async fn read_error_is_connection_error() {
        let link = MockLink::new(vec![Err(std::io::Error::from(
            std::io::ErrorKind::ConnectionReset,
        ))]);
        let mut transport = Transport::new(link);
        let err = transport.request(&PASSIVE_QUERY).await.unwrap_err();
        assert!(matches!(err, AmpError::Connection { .. }));
    }

    #[tokio::test]
    async fn oversized_payload_is_frame_decode_error() {
        let mut transport = Transport::new(MockLink::new(vec![]));
        let payload = vec![0u8; usize::from(u16::MAX) + 1];
        let err = transport.request(&payload).await.unwrap_err();
        assert!(matches!(err, AmpError::FrameDecode { .. }));
        assert!(transport.link.sent.is_empty(), "nothing may reach the wire");
    }

    #[tokio::test]
    async fn garbage_is_frame_decode_error() {
        let link = MockLink::new(vec![Ok(vec![0x00, 0x01, 0x02, 0x03, 0x04])]);
        let mut transport = Transport::new(link);
        let err = transport.request(&PASSIVE_QUERY).await.unwrap_err();
        assert!(matches!(err, AmpError::FrameDecode { .. }));
    }
}
