//! Byte-stream abstraction over the device connection.
//!
//! The transport only needs two operations from its link: write a full
//! buffer and read the next chunk. Abstracting them behind a trait lets
//! unit tests drive the transport with a scripted in-memory link instead
//! of a TCP socket.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// One bidirectional byte stream to an amplifier.
#[async_trait::async_trait]
pub trait DeviceLink: Send {
    /// Write all of `bytes` and flush.
    async fn send(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Read the next available chunk into `buf`.
    ///
    /// Returns the number of bytes read; `Ok(0)` means the peer closed the
    /// stream.
    async fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
}

#[async_trait::async_trait]
impl DeviceLink for TcpStream {
    async fn send(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.write_all(bytes).await?;
        self.flush().await
    }

    async fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.read(buf).await
    }
}
