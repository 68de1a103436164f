//! Async control and telemetry client for RF power amplifiers.
//!
//! Amplink talks to RF power amplifiers over point-to-point TCP links using
//! their proprietary binary protocol, and turns raw device responses into a
//! stream of merged telemetry reports.
//!
//! # Features
//!
//! - **Wire fidelity**: exact frame layout, checksum, and reserved filler
//!   bytes as real devices expect them
//! - **Correlated exchanges**: responses are matched to requests by
//!   correlation id over an unreliable byte stream
//! - **Telemetry polling**: one cancellable poller task per amplifier,
//!   degrading gracefully when a device goes silent
//! - **Deterministic registry**: serial connection attempts with stable
//!   index assignment
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use amplink::{AmplifierRegistry, AmplinkConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> amplink::Result<()> {
//!     let config = AmplinkConfig::from_yaml_file("amplink.yaml")?;
//!     let registry = AmplifierRegistry::start(&config).await;
//!
//!     let mut reports = registry.reports().await.expect("reports taken once");
//!     while let Some(report) = reports.next().await {
//!         println!("amp {}: {} W out, VSWR {:.2}", report.index, report.output, report.vswr);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod connection;
mod error;
mod link;
mod poller;
mod registry;
mod report;
mod transport;

pub mod protocol;

pub use config::{AmplifierEndpoint, AmplinkConfig, DEFAULT_CONTROL_PORT};
pub use connection::AmplifierConnection;
pub use error::{AmpError, Result};
pub use link::DeviceLink;
pub use poller::{POLL_INTERVAL, poll_reports};
pub use registry::AmplifierRegistry;
pub use report::Report;
pub use transport::Transport;
