//! Wire protocol for the amplifier control link.
//!
//! Messages nest as: frame (magic + checksum) around a command envelope
//! (direction + correlation id + length-prefixed payload) around a domain
//! payload (fixed little-endian layouts).

pub mod checksum;
pub mod command;
pub mod frame;
pub mod payloads;

pub use checksum::checksum;
pub use command::Command;
pub use frame::{FRAME_MAGIC, build_frame, parse_frame};
pub use payloads::{
    ACTIVE_QUERY, ActiveStatus, PASSIVE_QUERY, PassiveTelemetry, encode_output_change, vswr,
};
