//! Memory-function command bytes.
//!
//! ROM-level commands (match, skip, search) belong to the adapter; these
//! are the commands a device accepts once it has been selected.

/// Loads bytes into the scratchpad at a target address.
pub const WRITE_SCRATCHPAD: u8 = 0x0F;

/// Streams the scratchpad back, with target address and ending-offset
/// status prepended.
pub const READ_SCRATCHPAD: u8 = 0xAA;

/// Commits the scratchpad to non-volatile memory. The frame must repeat
/// the target address and ending offset the device reported.
pub const COPY_SCRATCHPAD: u8 = 0x55;

/// Commit variant for password-protected parts: the 8-byte password
/// follows the authorization pattern.
pub const COPY_SCRATCHPAD_PASSWORD: u8 = 0x99;

/// Clears the scratchpad. Secure parts require it before every staging
/// write.
pub const ERASE_SCRATCHPAD: u8 = 0xC3;

/// Plain read of non-volatile memory from a 2-byte address.
pub const READ_MEMORY: u8 = 0xF0;

/// Page read with a device-generated CRC-16 trailer, plus per-page extra
/// info on families that have it (e.g. write-cycle counters).
pub const READ_PAGE_WITH_CRC: u8 = 0xA5;
