//! Per-connection telemetry polling loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::connection::AmplifierConnection;
use crate::report::Report;

/// Pause between poll cycles.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drive one amplifier's poll cycle until it fails or is cancelled.
///
/// Each cycle issues the passive query then the active query, merges both
/// into a [`Report`], and pushes it into the sink. Any transport or decode
/// error ends the loop without escaping the task: the amplifier simply
/// stops producing reports for the rest of the process lifetime, matching
/// the no-reconnect policy of the core.
///
/// Cancellation is honored at the loop head, during either query's socket
/// wait, and during the inter-cycle sleep.
pub async fn poll_reports(
    connection: Arc<AmplifierConnection>,
    sink: mpsc::UnboundedSender<Report>,
    cancel: CancellationToken,
) {
    let index = connection.index();
    info!(index, name = connection.name(), "telemetry poller started");
    let mut cycles = 0u64;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let passive = tokio::select! {
            _ = cancel.cancelled() => break,
            result = connection.query_passive() => match result {
                Ok(passive) => passive,
                Err(e) => {
                    debug!(index, error = %e, "passive query failed, poller stopping");
                    break;
                }
            },
        };

        let active = tokio::select! {
            _ = cancel.cancelled() => break,
            result = connection.query_active() => match result {
                Ok(active) => active,
                Err(e) => {
                    debug!(index, error = %e, "active query failed, poller stopping");
                    break;
                }
            },
        };

        if sink.send(Report::merge(index, &passive, &active)).is_err() {
            debug!(index, "report sink dropped, poller stopping");
            break;
        }
        cycles += 1;

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }
    }

    info!(index, cycles, "telemetry poller ended");
}
