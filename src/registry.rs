//! Registry of connected amplifiers and their poller tasks.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AmplinkConfig;
use crate::connection::AmplifierConnection;
use crate::error::{AmpError, Result};
use crate::poller;
use crate::report::Report;

/// Owns the connected amplifiers, their poller tasks, and the report sink.
///
/// Connection attempts run serially in configured order, so index
/// assignment is deterministic: each successful connection takes the next
/// sequential index starting at zero, and a failed address consumes no
/// index. Failed addresses are skipped permanently; there is no retry or
/// reconnect.
pub struct AmplifierRegistry {
    amplifiers: Vec<Arc<AmplifierConnection>>,
    reports: Mutex<Option<mpsc::UnboundedReceiver<Report>>>,
    pollers: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl AmplifierRegistry {
    /// Connect the configured amplifiers and start a poller for each.
    ///
    /// With `run: false` in the configuration no attempt is made at all and
    /// the registry comes up empty.
    pub async fn start(config: &AmplinkConfig) -> Self {
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let mut amplifiers = Vec::new();
        let mut pollers = Vec::new();

        if config.run {
            let timeout = config.connect_timeout();
            for endpoint in &config.amplifiers {
                let index = amplifiers.len();
                let address = endpoint.socket_address();
                let connection = match AmplifierConnection::connect(
                    index,
                    endpoint.name.clone(),
                    &address,
                    timeout,
                )
                .await
                {
                    Ok(connection) => Arc::new(connection),
                    Err(e) => {
                        warn!(address = %address, error = %e, "skipping unreachable amplifier");
                        continue;
                    }
                };

                pollers.push(tokio::spawn(poller::poll_reports(
                    Arc::clone(&connection),
                    report_tx.clone(),
                    cancel.clone(),
                )));
                amplifiers.push(connection);
            }
        } else {
            info!("run flag disabled, not connecting any amplifiers");
        }

        info!(
            connected = amplifiers.len(),
            configured = config.amplifiers.len(),
            "amplifier registry started"
        );

        Self { amplifiers, reports: Mutex::new(Some(report_rx)), pollers, cancel }
    }

    /// Number of connected amplifiers.
    pub fn len(&self) -> usize {
        self.amplifiers.len()
    }

    /// True when no amplifier connected.
    pub fn is_empty(&self) -> bool {
        self.amplifiers.is_empty()
    }

    /// `(index, name)` of every connected amplifier, in index order.
    pub fn amplifiers(&self) -> Vec<(usize, String)> {
        self.amplifiers.iter().map(|a| (a.index(), a.name().to_string())).collect()
    }

    /// Take the report stream fed by all pollers.
    ///
    /// The stream is FIFO per amplifier and unbounded; it can be taken once,
    /// by the presentation layer that drains it.
    pub async fn reports(&self) -> Option<UnboundedReceiverStream<Report>> {
        self.reports.lock().await.take().map(UnboundedReceiverStream::new)
    }

    /// Set the output level of the amplifier with the given index.
    ///
    /// Unlike poller failures, errors here propagate: the caller asked for
    /// the change and decides how to surface a failure.
    pub async fn set_output(&self, index: usize, output: u16) -> Result<()> {
        let connection = self
            .amplifiers
            .iter()
            .find(|a| a.index() == index)
            .ok_or(AmpError::UnknownAmplifier { index })?;
        connection.set_output(output).await
    }

    /// Cancel all pollers and wait for them to finish.
    pub async fn shutdown(mut self) {
        info!("shutting down amplifier registry");
        self.cancel.cancel();
        for handle in self.pollers.drain(..) {
            let _ = handle.await;
        }
    }
}

impl Drop for AmplifierRegistry {
    fn drop(&mut self) {
        // Pollers stop at their next suspension point even if shutdown()
        // was never awaited.
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for AmplifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmplifierRegistry")
            .field("amplifiers", &self.amplifiers)
            .finish_non_exhaustive()
    }
}
