//! Merged telemetry report emitted once per poll cycle.

use serde::Serialize;

use crate::protocol::{ActiveStatus, PassiveTelemetry};

/// One amplifier's telemetry snapshot, merged from a passive telemetry
/// response and an active status response of the same poll cycle.
///
/// Immutable once emitted; ownership passes to the report sink consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Registry index of the amplifier this report describes.
    pub index: usize,
    /// Forward output power.
    pub output: u16,
    /// Input power, signed.
    pub input: i16,
    /// Reflected power.
    pub reflected: u16,
    /// Derived voltage standing wave ratio (`-1.0` sentinel at unity
    /// return loss).
    pub vswr: f64,
    /// Amplifier temperature.
    pub temperature: u16,
    /// Output level the amplifier is currently set to produce.
    pub requested_output: u16,
}

impl Report {
    /// Merge one poll cycle's decoded responses.
    pub fn merge(index: usize, passive: &PassiveTelemetry, active: &ActiveStatus) -> Self {
        Self {
            index,
            output: passive.output,
            input: passive.input,
            reflected: passive.reflected,
            vswr: passive.vswr,
            temperature: passive.temperature,
            requested_output: active.requested_output,
        }
    }
}
