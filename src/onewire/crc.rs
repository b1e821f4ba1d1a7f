//! CRC generators used by the 1-Wire memory protocol.
//!
//! Two codes appear on the wire: CRC-16 (reflected polynomial `0xA001`,
//! X^16 + X^15 + X^2 + 1) seals page frames, and CRC-8 (reflected
//! polynomial `0x8C`, X^8 + X^5 + X^4 + 1) closes the 8-byte ROM address.
//!
//! Devices transmit the CRC-16 *complemented*, least significant byte
//! first. Re-running the accumulator over a whole frame including the
//! complemented check bytes therefore lands on a fixed residual,
//! [`CRC16_RESIDUAL`], for every intact frame - validation never needs to
//! know where the payload ends.

/// Residual produced by accumulating CRC-16 over a frame that includes its
/// own complemented check bytes. Any other value means corruption.
pub const CRC16_RESIDUAL: u16 = 0xB001;

/// Accumulates one byte into a running CRC-16.
///
/// Used directly when an address is streamed to the device separately from
/// the data it covers: the echoed address bytes are folded into the seed
/// before the payload arrives.
#[inline]
pub fn crc16_byte(byte: u8, seed: u16) -> u16 {
    let mut crc = seed;
    let mut data = byte as u16;
    for _ in 0..8 {
        if ((crc ^ data) & 0x01) != 0 {
            crc = (crc >> 1) ^ 0xA001;
        } else {
            crc >>= 1;
        }
        data >>= 1;
    }
    crc
}

/// Accumulates CRC-16 over `data` starting from `seed`.
pub fn crc16(data: &[u8], seed: u16) -> u16 {
    let mut crc = seed;
    for &b in data {
        crc = crc16_byte(b, crc);
    }
    crc
}

/// Computes the 1-Wire ROM CRC-8 over `data`.
///
/// A valid 8-byte device address yields 0 when the check byte is included.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &b in data {
        let mut byte = b;
        for _ in 0..8 {
            if ((crc ^ byte) & 0x01) != 0 {
                crc = (crc >> 1) ^ 0x8C;
            } else {
                crc >>= 1;
            }
            byte >>= 1;
        }
    }
    crc
}

/// Appends the complemented CRC-16 of `frame` the way a device would:
/// inverted, least significant byte first.
#[cfg(test)]
pub(crate) fn seal16(crc: u16) -> [u8; 2] {
    let sealed = !crc;
    [(sealed & 0xFF) as u8, (sealed >> 8) as u8]
}
