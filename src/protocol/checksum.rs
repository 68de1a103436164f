//! Frame checksum used by the amplifier control protocol.
//!
//! The device firmware calls this "CRC-16/XMODEM" but the procedure below is
//! what real units actually compute, and it is what they expect on the wire.
//! Do not replace it with a table-driven CRC routine from a crate without
//! verifying the output against the vectors in the tests.

/// Compute the two-byte checksum over `data`.
///
/// Two 8-bit accumulators start at zero and are mixed per input byte; the
/// result is returned big-endian as `[msb, lsb]`, ready to append to a frame.
pub fn checksum(data: &[u8]) -> [u8; 2] {
    let mut msb: u8 = 0;
    let mut lsb: u8 = 0;

    for &c in data {
        let mut x = c ^ msb;
        x ^= x >> 4;
        msb = lsb ^ (x >> 3) ^ (x << 4);
        lsb = x ^ (x << 5);
    }

    [msb, lsb]
}
