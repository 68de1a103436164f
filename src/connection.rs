//! One connected amplifier: TCP link, transport, and control operations.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{AmpError, Result};
use crate::protocol::{
    ACTIVE_QUERY, ActiveStatus, PASSIVE_QUERY, PassiveTelemetry, encode_output_change,
};
use crate::transport::Transport;

/// A live connection to one amplifier.
///
/// The transport sits behind a mutex because the telemetry poller and the
/// control path share the connection: exchanges must be serialized or each
/// caller could consume the other's response. Every operation here locks
/// for exactly one request/response exchange.
pub struct AmplifierConnection {
    index: usize,
    name: String,
    transport: Mutex<Transport<TcpStream>>,
}

impl AmplifierConnection {
    /// Open a connection to `address`, bounded by `timeout`.
    ///
    /// `index` is assigned by the registry at successful-connection time and
    /// identifies the amplifier in reports and control calls for the rest of
    /// the process lifetime.
    pub async fn connect(
        index: usize,
        name: impl Into<String>,
        address: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let connect = TcpStream::connect(address);
        let stream = match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(AmpError::connect_failed(address, e.to_string(), Some(e))),
            Err(_) => return Err(AmpError::connect_timeout(address, timeout)),
        };

        let name = name.into();
        info!(index, name = %name, address, "amplifier connected");
        Ok(Self { index, name, transport: Mutex::new(Transport::new(stream)) })
    }

    /// Registry index assigned at connect time.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Configured display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Query passive telemetry (power levels, temperature).
    pub async fn query_passive(&self) -> Result<PassiveTelemetry> {
        let data = self.transport.lock().await.request(&PASSIVE_QUERY).await?;
        PassiveTelemetry::decode(&data)
    }

    /// Query active status (on/off, requested output level).
    pub async fn query_active(&self) -> Result<ActiveStatus> {
        let data = self.transport.lock().await.request(&ACTIVE_QUERY).await?;
        ActiveStatus::decode(&data)
    }

    /// Set the amplifier's output level.
    ///
    /// Always enables the output stage; the controller has no use case for
    /// setting a level on a disabled amplifier. The device acknowledges with
    /// a response payload we do not interpret.
    pub async fn set_output(&self, output: u16) -> Result<()> {
        debug!(index = self.index, output, "setting amplifier output");
        let payload = encode_output_change(true, output);
        self.transport.lock().await.request(&payload).await?;
        Ok(())
    }
}

impl std::fmt::Debug for AmplifierConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmplifierConnection")
            .field("index", &self.index)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
