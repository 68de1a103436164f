//! Static configuration consumed once at startup.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AmpError, Result};

/// TCP port amplifiers listen on when the address gives none.
pub const DEFAULT_CONTROL_PORT: u16 = 10001;

fn default_connect_timeout() -> f64 {
    0.2
}

fn default_run() -> bool {
    true
}

/// One configured amplifier endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AmplifierEndpoint {
    /// Host or `host:port`; [`DEFAULT_CONTROL_PORT`] is appended when no
    /// port is given.
    pub address: String,
    /// Display name for the presentation layer.
    pub name: String,
}

impl AmplifierEndpoint {
    /// Socket address string with the control port filled in if absent.
    pub fn socket_address(&self) -> String {
        if self.address.contains(':') {
            self.address.clone()
        } else {
            format!("{}:{DEFAULT_CONTROL_PORT}", self.address)
        }
    }
}

/// Startup configuration for the connection manager.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AmplinkConfig {
    /// Amplifiers to attempt, in index-candidate order.
    pub amplifiers: Vec<AmplifierEndpoint>,

    /// Connect-attempt deadline in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: f64,

    /// When false, no connection attempts are made at all.
    #[serde(default = "default_run")]
    pub run: bool,
}

impl Default for AmplinkConfig {
    fn default() -> Self {
        // The deployment this controller was written for: two 900 MHz units
        // and one 1800 MHz unit.
        Self {
            amplifiers: vec![
                AmplifierEndpoint { address: "192.168.1.100".into(), name: "900 A".into() },
                AmplifierEndpoint { address: "192.168.1.101".into(), name: "900 B".into() },
                AmplifierEndpoint { address: "192.168.1.102".into(), name: "1800".into() },
            ],
            connect_timeout: default_connect_timeout(),
            run: default_run(),
        }
    }
}

impl AmplinkConfig {
    /// Connect-attempt deadline as a [`Duration`].
    ///
    /// Falls back to the default deadline when the configured value is not
    /// a finite non-negative number; YAML loading rejects such values up
    /// front, this guards directly constructed configurations.
    pub fn connect_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.connect_timeout)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_connect_timeout()))
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| AmpError::frame_decode("configuration", e.to_string()))?;
        if !(config.connect_timeout.is_finite() && config.connect_timeout >= 0.0) {
            return Err(AmpError::frame_decode(
                "configuration",
                format!("connect_timeout must be a non-negative number, got {}", config.connect_timeout),
            ));
        }
        Ok(config)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AmpError::frame_decode("configuration", format!("read failed: {e}"))
        })?;
        Self::from_yaml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = AmplinkConfig::default();
        assert_eq!(config.amplifiers.len(), 3);
        assert_eq!(config.amplifiers[2].name, "1800");
        assert_eq!(config.connect_timeout(), Duration::from_millis(200));
        assert!(config.run);
    }

    #[test]
    fn socket_address_appends_default_port() {
        let ep = AmplifierEndpoint { address: "192.168.1.100".into(), name: "900 A".into() };
        assert_eq!(ep.socket_address(), "192.168.1.100:10001");

        let ep = AmplifierEndpoint { address: "192.168.1.100:2000".into(), name: "900 A".into() };
        assert_eq!(ep.socket_address(), "192.168.1.100:2000");
    }

    #[test]
    fn yaml_parsing_with_defaults() {
        let config = AmplinkConfig::from_yaml_str(
            "amplifiers:\n  - address: 10.0.0.5\n    name: lab\n",
        )
        .unwrap();
        assert_eq!(config.amplifiers.len(), 1);
        assert_eq!(config.amplifiers[0].name, "lab");
        assert_eq!(config.connect_timeout, 0.2);
        assert!(config.run);
    }

    #[test]
    fn yaml_parsing_overrides() {
        let config = AmplinkConfig::from_yaml_str(
            "amplifiers: []\nconnect_timeout: 1.5\nrun: false\n",
        )
        .unwrap();
        assert!(config.amplifiers.is_empty());
        assert_eq!(config.connect_timeout(), Duration::from_millis(1500));
        assert!(!config.run);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(AmplinkConfig::from_yaml_str("amplifiers: 7\n").is_err());
    }

    #[test]
    fn hostile_connect_timeout_is_rejected() {
        assert!(AmplinkConfig::from_yaml_str("amplifiers: []\nconnect_timeout: -1.0\n").is_err());
        assert!(AmplinkConfig::from_yaml_str("amplifiers: []\nconnect_timeout: .nan\n").is_err());
        assert!(AmplinkConfig::from_yaml_str("amplifiers: []\nconnect_timeout: .inf\n").is_err());
    }

    #[test]
    fn connect_timeout_never_panics() {
        // Directly constructed configurations bypass YAML validation.
        let config = AmplinkConfig { connect_timeout: f64::NAN, ..Default::default() };
        assert_eq!(config.connect_timeout(), Duration::from_millis(200));

        let config = AmplinkConfig { connect_timeout: -3.0, ..Default::default() };
        assert_eq!(config.connect_timeout(), Duration::from_millis(200));
    }
}
