//! Error types for the amplifier control core.
//!
//! Three failure classes exist on the device path:
//!
//! - **ConnectAttempt**: the bounded connect at startup failed; the
//!   amplifier is omitted from the registry and never retried.
//! - **Connection**: the socket closed or broke during a steady-state
//!   exchange; the owning poller terminates silently.
//! - **FrameDecode**: a frame, envelope, or payload did not match the
//!   expected layout; treated like a connection loss inside the poll loop.
//!
//! Errors from the control path (`set_output`) propagate to the caller;
//! the presentation layer decides how to surface them. There are no retries
//! or reconnects anywhere in the core.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for amplifier operations.
pub type Result<T, E = AmpError> = std::result::Result<T, E>;

/// Main error type for amplifier communication.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AmpError {
    #[error("failed to connect to amplifier at {address}: {reason}")]
    ConnectAttempt {
        address: String,
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("amplifier connection broken: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("decode error in {context}: {details}")]
    FrameDecode { context: &'static str, details: String },

    #[error("no connected amplifier with index {index}")]
    UnknownAmplifier { index: usize },
}

impl AmpError {
    /// Returns whether retrying the failed operation could help.
    ///
    /// Only connect-time failures qualify; a broken steady-state connection
    /// or a malformed frame leaves the amplifier unusable until restart.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AmpError::ConnectAttempt { .. })
    }

    /// Helper constructor for connect-time failures.
    pub fn connect_failed(
        address: impl Into<String>,
        reason: impl Into<String>,
        source: Option<std::io::Error>,
    ) -> Self {
        AmpError::ConnectAttempt { address: address.into(), reason: reason.into(), source }
    }

    /// Helper constructor for a connect attempt that exceeded its deadline.
    pub fn connect_timeout(address: impl Into<String>, timeout: Duration) -> Self {
        AmpError::ConnectAttempt {
            address: address.into(),
            reason: format!("no answer within {timeout:?}"),
            source: None,
        }
    }

    /// Helper constructor for steady-state connection failures.
    pub fn connection(reason: impl Into<String>, source: Option<std::io::Error>) -> Self {
        AmpError::Connection { reason: reason.into(), source }
    }

    /// Helper constructor for layout mismatches.
    pub fn frame_decode(context: &'static str, details: impl Into<String>) -> Self {
        AmpError::FrameDecode { context, details: details.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_traits() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<AmpError>();

        let error = AmpError::connection("peer closed", None);
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retryable_classification() {
        assert!(
            AmpError::connect_timeout("10.0.0.1:10001", Duration::from_millis(200)).is_retryable()
        );
        assert!(!AmpError::connection("reset", None).is_retryable());
        assert!(!AmpError::frame_decode("frame", "bad magic").is_retryable());
        assert!(!AmpError::UnknownAmplifier { index: 3 }.is_retryable());
    }

    #[test]
    fn messages_carry_context() {
        let e = AmpError::connect_failed(
            "192.168.1.100:10001",
            "connection refused",
            Some(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)),
        );
        let msg = e.to_string();
        assert!(msg.contains("192.168.1.100:10001"));
        assert!(msg.contains("refused"));

        let e = AmpError::frame_decode("command envelope", "unknown direction marker");
        assert!(e.to_string().contains("command envelope"));
    }

    #[test]
    fn source_chain_preserved() {
        let io = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        let e = AmpError::connection("write failed", Some(io));
        assert!(std::error::Error::source(&e).is_some());
    }
}
