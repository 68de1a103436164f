//! Outermost byte envelope exchanged with an amplifier.
//!
//! Every message on the control link is wrapped as
//! `0xDA || body || checksum(body)`. The body is the serialized command
//! envelope (see [`crate::protocol::command`]).
//!
//! The checksum is appended on send only. Devices in the field emit frames
//! whose checksums we have never needed to reject, and the original
//! controller never verified them; [`parse_frame`] keeps that behavior and
//! only checks structural well-formedness.

use crate::error::{AmpError, Result};
use crate::protocol::checksum::checksum;

/// Leading magic byte of every frame.
pub const FRAME_MAGIC: u8 = 0xDA;

/// Bytes of overhead a frame adds around its body (magic + checksum).
const FRAME_OVERHEAD: usize = 3;

/// Wrap a command body into a wire frame.
pub fn build_frame(body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(body.len() + FRAME_OVERHEAD);
    frame.push(FRAME_MAGIC);
    frame.extend_from_slice(body);
    frame.extend_from_slice(&checksum(body));
    frame
}

/// Strip the magic byte and trailing checksum, returning the command body.
///
/// The checksum bytes are discarded without verification.
pub fn parse_frame(frame: &[u8]) -> Result<&[u8]> {
    if frame.len() < FRAME_OVERHEAD {
        return Err(AmpError::frame_decode(
            "frame",
            format!("frame too short: {} bytes", frame.len()),
        ));
    }
    if frame[0] != FRAME_MAGIC {
        return Err(AmpError::frame_decode(
            "frame",
            format!("bad magic byte {:#04x}, expected {FRAME_MAGIC:#04x}", frame[0]),
        ));
    }
    Ok(&frame[1..frame.len() - 2])
}
