//! Domain payload layouts for amplifier queries and control.
//!
//! These are fixed-layout structures reverse engineered from device traffic.
//! All multi-byte fields are little-endian. The query payloads and the
//! constant regions of the set-output payload are opaque protocol filler:
//! they must be reproduced byte-for-byte or the device rejects the command.

use crate::error::{AmpError, Result};

/// Query payload requesting passive telemetry (power levels, temperature).
pub const PASSIVE_QUERY: [u8; 10] =
    [0x02, 0x20, 0x02, 0x10, 0x00, 0x00, 0x00, 0x00, 0x18, 0x00];

/// Query payload requesting active status (on/off, requested output).
pub const ACTIVE_QUERY: [u8; 10] =
    [0x02, 0x20, 0x05, 0x10, 0x00, 0x00, 0x00, 0x00, 0x18, 0x00];

/// Every well-formed response payload begins with this little-endian u16.
const RESPONSE_TAG: u16 = 2;

/// Passive telemetry decoded from a device response.
#[derive(Debug, Clone, PartialEq)]
pub struct PassiveTelemetry {
    /// Forward output power.
    pub output: u16,
    /// Reflected power.
    pub reflected: u16,
    /// Amplifier temperature.
    pub temperature: u16,
    /// Input power, signed.
    pub input: i16,
    /// Voltage standing wave ratio derived from output and reflected power.
    /// `-1.0` when reflected equals output (unity return loss).
    pub vswr: f64,
}

/// Active status decoded from a device response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveStatus {
    /// Whether the output stage is enabled.
    pub is_on: bool,
    /// Output level the amplifier is currently set to produce.
    pub requested_output: u16,
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn check_response_tag(context: &'static str, bytes: &[u8], min_len: usize) -> Result<()> {
    if bytes.len() < min_len {
        return Err(AmpError::frame_decode(
            context,
            format!("payload of {} bytes is shorter than the {min_len}-byte layout", bytes.len()),
        ));
    }
    let tag = read_u16(bytes, 0);
    if tag != RESPONSE_TAG {
        return Err(AmpError::frame_decode(
            context,
            format!("leading constant is {tag}, expected {RESPONSE_TAG}"),
        ));
    }
    Ok(())
}

/// Compute the VSWR from forward and reflected power readings.
///
/// Returns the `-1.0` sentinel when the readings are equal, where the
/// closed-form expression would divide by zero.
pub fn vswr(output: u16, reflected: u16) -> f64 {
    if reflected == output {
        return -1.0;
    }
    let return_loss = f64::from(output) - f64::from(reflected);
    let rho = 10f64.powf(-return_loss / 20.0);
    (1.0 + rho) / (1.0 - rho)
}

impl PassiveTelemetry {
    /// Decode a passive telemetry response payload. Trailing bytes are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        check_response_tag("passive telemetry", bytes, 10)?;
        let output = read_u16(bytes, 2);
        let reflected = read_u16(bytes, 4);
        let temperature = read_u16(bytes, 6);
        let input = i16::from_le_bytes([bytes[8], bytes[9]]);
        Ok(Self { output, reflected, temperature, input, vswr: vswr(output, reflected) })
    }
}

impl ActiveStatus {
    /// Decode an active status response payload.
    ///
    /// Five reserved bytes after the on/off flag are skipped; trailing bytes
    /// are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        check_response_tag("active status", bytes, 10)?;
        let is_on = bytes[2] != 0;
        let requested_output = read_u16(bytes, 8);
        Ok(Self { is_on, requested_output })
    }
}

/// Encode the set-output control payload (29 bytes).
///
/// Layout: u16 `0x2003`, six filler bytes, the on/off flag, five filler
/// bytes, the requested output level, then a 13-byte filler trailer. The
/// filler regions are opaque but mandatory for device acceptance.
pub fn encode_output_change(is_on: bool, requested_output: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(29);
    out.extend_from_slice(&0x2003u16.to_le_bytes());
    out.extend_from_slice(&[0x05, 0x10, 0x00, 0x00, 0x00, 0x00]);
    out.push(u8::from(is_on));
    out.extend_from_slice(&[0x00, 0x01, 0x00, 0x3B, 0x00]);
    out.extend_from_slice(&requested_output.to_le_bytes());
    out.extend_from_slice(&[
        0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00,
    ]);
    out
}
