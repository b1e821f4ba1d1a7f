//! Per-family wire behavior.
//!
//! The five device families the engine supports share one protocol
//! template; each family changes a step or two - an erase before staging,
//! a password inside the commit frame, a power pulse instead of a polled
//! status byte. Those differences are data: a [`Profile`] is chosen at
//! bank construction and consulted by the protocol steps, so no family
//! needs its own code path.

use crate::onewire::commands;

/// How a commit is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    /// Read status bytes in the same block and check the final one.
    BytePolled,
    /// Hold a power-delivery pulse for a fixed latency, then check one
    /// status byte.
    PowerPulsed {
        /// Device-documented commit time in milliseconds. Fixed, never
        /// adaptive: a timeout mid-commit leaves device state undefined.
        latency_ms: u32,
    },
}

/// Wire-level configuration of one device family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// Write-scratchpad command byte.
    pub write_cmd: u8,
    /// Read-scratchpad command byte.
    pub read_scratch_cmd: u8,
    /// Copy-scratchpad command byte.
    pub copy_cmd: u8,
    /// Plain read-memory command byte.
    pub read_mem_cmd: u8,
    /// Page-read-with-CRC command byte.
    pub read_page_crc_cmd: u8,
    /// Secure parts clear the scratchpad before every staging write.
    pub erase_before_write: bool,
    /// Page-boundary writes carry a device-echoed CRC-16 seal.
    pub seal_writes: bool,
    /// Scratchpad readback ends in a CRC-16 trailer.
    pub scratch_crc: bool,
    /// Mask applied to the echoed target address to locate the data start
    /// inside a page during readback. Device-calibrated: power-delivery
    /// addressing shifts it on some parts. `None` derives `page_length-1`.
    pub scratch_offset_mask: Option<u8>,
    /// The commit frame carries the bank's 8-byte password.
    pub requires_password: bool,
    /// Fill bytes shifted after a byte-polled copy frame; the last echoed
    /// byte is the status.
    pub copy_verify_len: usize,
    /// Device-specific verification bytes trailing a CRC page read,
    /// excluded from the CRC accumulation.
    pub read_verify_len: usize,
    /// Commit confirmation discipline.
    pub confirm: Confirm,
}

impl Profile {
    /// Plain NVRAM family: no CRC anywhere, byte-polled commits.
    pub const fn plain() -> Self {
        Self {
            write_cmd: commands::WRITE_SCRATCHPAD,
            read_scratch_cmd: commands::READ_SCRATCHPAD,
            copy_cmd: commands::COPY_SCRATCHPAD,
            read_mem_cmd: commands::READ_MEMORY,
            read_page_crc_cmd: commands::READ_PAGE_WITH_CRC,
            erase_before_write: false,
            seal_writes: false,
            scratch_crc: false,
            scratch_offset_mask: None,
            requires_password: false,
            copy_verify_len: 4,
            read_verify_len: 0,
            confirm: Confirm::BytePolled,
        }
    }

    /// CRC-checked family: staging frames sealed on page boundaries, CRC
    /// trailers on scratchpad readback and page reads.
    pub const fn crc_checked() -> Self {
        let mut p = Self::plain();
        p.seal_writes = true;
        p.scratch_crc = true;
        p
    }

    /// Secure auto-erasing family: CRC-checked plus a scratchpad erase
    /// before every staging write.
    pub const fn auto_erase() -> Self {
        let mut p = Self::crc_checked();
        p.erase_before_write = true;
        p
    }

    /// Password-protected family: CRC-checked, commit frame carries the
    /// 8-byte password under its own command byte.
    pub const fn password_protected() -> Self {
        let mut p = Self::crc_checked();
        p.copy_cmd = commands::COPY_SCRATCHPAD_PASSWORD;
        p.requires_password = true;
        p
    }

    /// Checksum-less EEPROM family: unsealed staging, commits confirmed by
    /// a timed power pulse. The 10 ms latency covers the documented
    /// worst-case programming time of these parts.
    pub const fn power_pulsed() -> Self {
        let mut p = Self::plain();
        p.confirm = Confirm::PowerPulsed { latency_ms: 10 };
        p
    }

    /// Calibrated readback offset mask for a given page length.
    pub(crate) fn offset_mask(&self, page_length: usize) -> u8 {
        match self.scratch_offset_mask {
            Some(mask) => mask,
            None => (page_length - 1) as u8,
        }
    }

    pub(crate) const fn is_power_pulsed(&self) -> bool {
        matches!(self.confirm, Confirm::PowerPulsed { .. })
    }
}

/// Copy-scratchpad status nibbles the devices define. Confirmation bytes
/// alternate 0xAA / 0x55 while the commit completes, so only the high
/// nibble is meaningful.
pub(crate) const COPY_DONE_NIBBLES: [u8; 2] = [0xA0, 0x50];

/// High nibble reported when the supplied password did not match.
pub(crate) const COPY_AUTH_NIBBLE: u8 = 0xF0;
