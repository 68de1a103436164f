//! Command envelope carried inside every frame.
//!
//! The envelope pairs a request with its response: a two-byte direction
//! marker, a 32-bit correlation id, and a length-prefixed payload. The
//! direction markers are fixed byte pairs exchanged by the device, never
//! computed. Note the mixed endianness: the id is big-endian while the
//! payload length (like all domain payload fields) is little-endian.

use crate::error::{AmpError, Result};

/// Direction marker for a request (host to amplifier).
const REQUEST_MARKER: [u8; 2] = [0x00, 0x77];

/// Direction marker for a response (amplifier to host).
const RESPONSE_MARKER: [u8; 2] = [0x77, 0x00];

/// Marker (2) + id (4) + payload length (2).
const HEADER_LEN: usize = 8;

/// A decoded command envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// True for host-originated requests, false for device responses.
    pub is_request: bool,
    /// Correlation id pairing this envelope with its counterpart.
    pub id: u32,
    /// Domain payload, layout defined in [`crate::protocol::payloads`].
    pub data: Vec<u8>,
}

impl Command {
    /// Build a request envelope around `data`.
    pub fn request(id: u32, data: Vec<u8>) -> Self {
        Self { is_request: true, id, data }
    }

    /// Serialize the envelope to its wire form.
    ///
    /// Fails when the payload does not fit the two-byte length prefix;
    /// silently truncating the length would put a corrupt envelope on the
    /// wire.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let len = u16::try_from(self.data.len()).map_err(|_| {
            AmpError::frame_decode(
                "command envelope",
                format!("payload of {} bytes exceeds the u16 length prefix", self.data.len()),
            )
        })?;

        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len());
        out.extend_from_slice(if self.is_request { &REQUEST_MARKER } else { &RESPONSE_MARKER });
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&self.data);
        Ok(out)
    }

    /// Decode an envelope from `bytes`.
    ///
    /// Bytes beyond the declared payload length are ignored; receive buffers
    /// routinely over-read. Fails on an unknown direction marker, a truncated
    /// header, or fewer payload bytes than declared.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(AmpError::frame_decode(
                "command envelope",
                format!("{} bytes is shorter than the {HEADER_LEN}-byte header", bytes.len()),
            ));
        }

        let is_request = match [bytes[0], bytes[1]] {
            REQUEST_MARKER => true,
            RESPONSE_MARKER => false,
            other => {
                return Err(AmpError::frame_decode(
                    "command envelope",
                    format!("unknown direction marker {other:02x?}"),
                ));
            }
        };

        let id = u32::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);
        let declared = u16::from_le_bytes([bytes[6], bytes[7]]) as usize;

        let available = bytes.len() - HEADER_LEN;
        if available < declared {
            return Err(AmpError::frame_decode(
                "command envelope",
                format!("payload declares {declared} bytes but only {available} available"),
            ));
        }

        Ok(Self { is_request, id, data: bytes[HEADER_LEN..HEADER_LEN + declared].to_vec() })
    }
}
