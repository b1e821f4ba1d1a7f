//! Scratchpad staging: writing a page fragment into the device's volatile
//! buffer and reading it back for verification.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::onewire::{
    adapter::BusAdapter,
    bank::{FRAME_CAP, MemoryBank},
    crc::{CRC16_RESIDUAL, crc16},
    error::MemoryError,
    session::Session,
};

/// Target address, ending offset and valid length reported by a
/// scratchpad readback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchpadInfo {
    /// Target address the device latched on the last staging write.
    pub target_address: u16,
    /// Ending-offset/status byte as the device reported it.
    pub end_offset: u8,
    /// Bytes of scratchpad payload valid in the readback.
    pub len: usize,
}

/// Bytes of metadata (TA1, TA2, E/S) prefixing a scratchpad readback.
pub(crate) const SCRATCH_META_LEN: usize = 3;

impl MemoryBank {
    /// Stages `data` into the device scratchpad at bank-relative `addr`.
    ///
    /// Nothing is committed: the payload sits in the volatile buffer until
    /// [`copy_scratchpad`](MemoryBank::copy_scratchpad) moves it, and a
    /// commit is only valid for bytes most recently staged at this same
    /// start address. When the destination range ends exactly on a page
    /// boundary and the family seals its frames, the device appends a
    /// CRC-16 which is validated before this returns.
    ///
    /// # Errors
    /// * [`MemoryError::Unsupported`] - the bank is not read-write
    /// * [`MemoryError::OutOfRange`] - empty data, out-of-bank range, or a
    ///   range crossing a page boundary (the scratchpad maps one page row)
    /// * [`MemoryError::DeviceNotFound`] - no presence on selection
    /// * [`MemoryError::Integrity`] - the echoed seal missed the residual
    pub fn write_scratchpad<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        addr: usize,
        data: &[u8],
    ) -> Result<(), MemoryError<A::Error>> {
        self.check_writable()?;
        self.check_range(addr, data.len())?;

        let page_length = self.descriptor.page_length();
        let physical = self.physical(addr);
        if physical % page_length + data.len() > page_length {
            return Err(MemoryError::OutOfRange);
        }

        if self.profile.erase_before_write {
            self.erase_scratchpad(session, physical)?;
        }

        session.select()?;

        let sealed = self.profile.seal_writes && (physical + data.len()) % page_length == 0;

        let mut frame: Vec<u8, FRAME_CAP> = Vec::new();
        frame
            .push(self.profile.write_cmd)
            .map_err(|_| MemoryError::OutOfRange)?;
        frame
            .extend_from_slice(&[(physical & 0xFF) as u8, (physical >> 8) as u8])
            .map_err(|_| MemoryError::OutOfRange)?;
        frame
            .extend_from_slice(data)
            .map_err(|_| MemoryError::OutOfRange)?;
        if sealed {
            // Placeholders shifted out as fill; the device drives its
            // complemented CRC-16 back over them.
            frame
                .extend_from_slice(&[0xFF, 0xFF])
                .map_err(|_| MemoryError::OutOfRange)?;
        }

        session
            .adapter
            .data_block(&mut frame)
            .map_err(MemoryError::Bus)?;

        if sealed && crc16(&frame, 0) != CRC16_RESIDUAL {
            trace!("write-scratchpad seal failed at {:#06x}", physical);
            return session.fail(MemoryError::Integrity);
        }

        debug!("staged {} bytes at {:#06x}", data.len(), physical);
        Ok(())
    }

    /// Reads the scratchpad back into `buf`, optionally copying the raw
    /// TA1/TA2/E-S metadata into `meta`.
    ///
    /// The CRC trailer is located from the echoed target address: the
    /// device only streams from the staged offset to the end of the page
    /// row, so the trailer position is `page_length - (TA & mask)` bytes
    /// after the metadata. The mask is a per-family calibration constant.
    ///
    /// Returns how much payload was valid; `buf` receives at most that
    /// many bytes.
    pub fn read_scratchpad<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        buf: &mut [u8],
        meta: Option<&mut [u8]>,
    ) -> Result<ScratchpadInfo, MemoryError<A::Error>> {
        if let Some(ref m) = meta {
            if m.len() < SCRATCH_META_LEN {
                return Err(MemoryError::OutOfRange);
            }
        }

        session.select()?;

        let page_length = self.descriptor.page_length();
        let crc_len = if self.profile.scratch_crc { 2 } else { 0 };

        let mut frame: Vec<u8, FRAME_CAP> = Vec::new();
        frame
            .push(self.profile.read_scratch_cmd)
            .map_err(|_| MemoryError::OutOfRange)?;
        frame
            .resize(1 + SCRATCH_META_LEN + page_length + crc_len, 0xFF)
            .map_err(|_| MemoryError::OutOfRange)?;

        session
            .adapter
            .data_block(&mut frame)
            .map_err(MemoryError::Bus)?;

        let target_address = frame[1] as u16 | ((frame[2] as u16) << 8);
        let end_offset = frame[3];
        let offset = (frame[1] & self.profile.offset_mask(page_length)) as usize;
        let len = page_length - offset;

        if self.profile.scratch_crc {
            let trailer_end = 1 + SCRATCH_META_LEN + len + 2;
            if crc16(&frame[..trailer_end], 0) != CRC16_RESIDUAL {
                trace!("read-scratchpad CRC failed at {:#06x}", target_address);
                return session.fail(MemoryError::Integrity);
            }
        }

        if let Some(m) = meta {
            m[..SCRATCH_META_LEN].copy_from_slice(&frame[1..1 + SCRATCH_META_LEN]);
        }

        let n = buf.len().min(len);
        buf[..n].copy_from_slice(&frame[1 + SCRATCH_META_LEN..1 + SCRATCH_META_LEN + n]);

        Ok(ScratchpadInfo {
            target_address,
            end_offset,
            len,
        })
    }

    /// Erase sub-step secure families require before each staging write.
    /// Runs as its own addressed frame.
    fn erase_scratchpad<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        physical: usize,
    ) -> Result<(), MemoryError<A::Error>> {
        session.select()?;

        let mut frame = [
            crate::onewire::commands::ERASE_SCRATCHPAD,
            (physical & 0xFF) as u8,
            (physical >> 8) as u8,
        ];
        session
            .adapter
            .data_block(&mut frame)
            .map_err(MemoryError::Bus)
    }
}
