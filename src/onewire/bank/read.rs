//! Paged reads: plain, CRC-trailed, and length-prefixed packets, plus the
//! sequential reader that carries the read-continue contract.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::onewire::{
    adapter::BusAdapter,
    bank::{FRAME_CAP, MAX_PAGE_LENGTH, MemoryBank},
    crc::{CRC16_RESIDUAL, crc16},
    error::MemoryError,
    session::Session,
};

/// What the previous sequential read was; a continuation is only valid
/// when the next read is of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadKind {
    Plain,
    Crc,
}

impl MemoryBank {
    /// Reads one page into `buf` with the plain read-memory command.
    ///
    /// No device CRC protects this path; use
    /// [`read_page_crc`](MemoryBank::read_page_crc) on families that
    /// support it.
    pub fn read_page<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        page: usize,
        buf: &mut [u8],
    ) -> Result<(), MemoryError<A::Error>> {
        self.check_page(page)?;
        if buf.len() < self.descriptor.page_length() {
            return Err(MemoryError::OutOfRange);
        }
        self.read_page_raw(session, page, false, buf)
    }

    /// Reads one page and validates the device-generated CRC-16 trailer,
    /// copying per-page extra info (e.g. a write-cycle counter) into
    /// `extra` when the family returns it.
    ///
    /// The 2-byte page address is folded into the running CRC seed, so the
    /// residual check covers addressing as well as data. A mismatch
    /// unverifies the cached bus speed and is never retried here.
    ///
    /// # Errors
    /// * [`MemoryError::Unsupported`] - no page-auto-CRC capability, or an
    ///   `extra` buffer on a family without extra info
    /// * [`MemoryError::OutOfRange`] - bad page index or short buffers
    /// * [`MemoryError::Integrity`] - residual mismatch
    pub fn read_page_crc<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        page: usize,
        buf: &mut [u8],
        extra: Option<&mut [u8]>,
    ) -> Result<(), MemoryError<A::Error>> {
        self.check_crc_read(page, buf, &extra)?;
        self.read_page_crc_raw(session, page, false, buf, extra)
    }

    /// Reads a length-prefixed packet from a page.
    ///
    /// Byte 0 of the page is the payload length; it is bounds-checked
    /// against [`max_packet_length`](MemoryBank::max_packet_length)
    /// *before* anything after it is trusted. The packet's own CRC-16,
    /// seeded with the page number, is then validated. Returns the payload
    /// length copied into `buf`.
    pub fn read_page_packet<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        page: usize,
        buf: &mut [u8],
    ) -> Result<usize, MemoryError<A::Error>> {
        self.check_page(page)?;

        let page_length = self.descriptor.page_length();
        let mut raw = [0u8; MAX_PAGE_LENGTH];
        if self.has_page_auto_crc() {
            self.read_page_crc_raw(session, page, false, &mut raw[..page_length], None)?;
        } else {
            self.read_page_raw(session, page, false, &mut raw[..page_length])?;
        }

        let len = raw[0] as usize;
        if len > self.max_packet_length() {
            trace!("packet length {} exceeds page {} capacity", len, page);
            return Err(MemoryError::BadPacketLength);
        }
        if buf.len() < len {
            return Err(MemoryError::OutOfRange);
        }

        // The packet carries its own complemented CRC-16 over length and
        // payload, seeded with the page number.
        if crc16(&raw[..len + 3], page as u16) != CRC16_RESIDUAL {
            return session.fail(MemoryError::Integrity);
        }

        buf[..len].copy_from_slice(&raw[1..1 + len]);
        Ok(len)
    }

    /// Begins a sequential read at `start_page`.
    ///
    /// The returned reader exclusively borrows the session for its whole
    /// life, which is what makes read-continue sound: no other traffic can
    /// interleave and move the device's address cursor. Fails before any
    /// bus call when the family cannot continue reads across pages.
    pub fn sequential<'b, 's, A: BusAdapter, D: DelayNs>(
        &'b self,
        session: &'s mut Session<A, D>,
        start_page: usize,
    ) -> Result<SequentialReader<'b, 's, A, D>, MemoryError<A::Error>> {
        if !self.descriptor.capabilities().read_continue {
            return Err(MemoryError::Unsupported);
        }
        self.check_page(start_page)?;
        Ok(SequentialReader {
            bank: self,
            session,
            next_page: start_page,
            primed: None,
        })
    }

    fn check_crc_read<E>(
        &self,
        page: usize,
        buf: &[u8],
        extra: &Option<&mut [u8]>,
    ) -> Result<(), MemoryError<E>> {
        if !self.has_page_auto_crc() {
            return Err(MemoryError::Unsupported);
        }
        self.check_page(page)?;
        if buf.len() < self.descriptor.page_length() {
            return Err(MemoryError::OutOfRange);
        }
        if let Some(extra) = extra {
            if !self.has_extra_info() {
                return Err(MemoryError::Unsupported);
            }
            if extra.len() < self.extra_info_length() {
                return Err(MemoryError::OutOfRange);
            }
        }
        Ok(())
    }

    pub(crate) fn read_page_raw<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        page: usize,
        continuing: bool,
        buf: &mut [u8],
    ) -> Result<(), MemoryError<A::Error>> {
        let page_length = self.descriptor.page_length();
        if !continuing {
            session.select()?;
            let physical = self.physical(page * page_length);
            let mut head = [
                self.profile.read_mem_cmd,
                (physical & 0xFF) as u8,
                (physical >> 8) as u8,
            ];
            session
                .adapter
                .data_block(&mut head)
                .map_err(MemoryError::Bus)?;
        }

        session
            .adapter
            .read_block(&mut buf[..page_length])
            .map_err(MemoryError::Bus)
    }

    pub(crate) fn read_page_crc_raw<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        page: usize,
        continuing: bool,
        buf: &mut [u8],
        extra: Option<&mut [u8]>,
    ) -> Result<(), MemoryError<A::Error>> {
        let page_length = self.descriptor.page_length();
        let extra_length = self.extra_info_length();

        // A continued read starts a fresh accumulation; the device resets
        // its generator at each page boundary.
        let mut seed = 0u16;
        if !continuing {
            session.select()?;
            let physical = self.physical(page * page_length);
            let mut head = [
                self.profile.read_page_crc_cmd,
                (physical & 0xFF) as u8,
                (physical >> 8) as u8,
            ];
            session
                .adapter
                .data_block(&mut head)
                .map_err(MemoryError::Bus)?;
            seed = crc16(&head, 0);
        }

        let covered = page_length + extra_length + 2;
        let mut resp: Vec<u8, FRAME_CAP> = Vec::new();
        resp.resize(covered + self.profile.read_verify_len, 0xFF)
            .map_err(|_| MemoryError::OutOfRange)?;
        session
            .adapter
            .read_block(&mut resp)
            .map_err(MemoryError::Bus)?;

        // Trailing verification bytes are outside the CRC envelope.
        if crc16(&resp[..covered], seed) != CRC16_RESIDUAL {
            trace!("page {} CRC residual mismatch", page);
            return session.fail(MemoryError::Integrity);
        }

        buf[..page_length].copy_from_slice(&resp[..page_length]);
        if let Some(extra) = extra {
            extra[..extra_length]
                .copy_from_slice(&resp[page_length..page_length + extra_length]);
        }
        Ok(())
    }
}

/// An in-flight sequential read over consecutive pages.
///
/// Created by [`MemoryBank::sequential`]; the exclusive session borrow is
/// the read-continue guard. Mixing plain and CRC reads is allowed - the
/// reader re-addresses whenever the kind changes, since the device cursor
/// discipline differs between the two commands.
pub struct SequentialReader<'b, 's, A, D> {
    bank: &'b MemoryBank,
    session: &'s mut Session<A, D>,
    next_page: usize,
    primed: Option<ReadKind>,
}

impl<A: BusAdapter, D: DelayNs> SequentialReader<'_, '_, A, D> {
    /// Page the next read will return.
    pub fn next_page(&self) -> usize {
        self.next_page
    }

    /// Reads the next page with the plain read-memory command.
    pub fn read_next(&mut self, buf: &mut [u8]) -> Result<(), MemoryError<A::Error>> {
        self.bank.check_page(self.next_page)?;
        if buf.len() < self.bank.page_length() {
            return Err(MemoryError::OutOfRange);
        }

        let continuing = self.primed == Some(ReadKind::Plain);
        self.primed = None;
        self.bank
            .read_page_raw(self.session, self.next_page, continuing, buf)?;
        self.primed = Some(ReadKind::Plain);
        self.next_page += 1;
        Ok(())
    }

    /// Reads the next page with CRC validation.
    pub fn read_next_crc(
        &mut self,
        buf: &mut [u8],
        extra: Option<&mut [u8]>,
    ) -> Result<(), MemoryError<A::Error>> {
        self.bank.check_crc_read(self.next_page, buf, &extra)?;

        let continuing = self.primed == Some(ReadKind::Crc);
        self.primed = None;
        self.bank
            .read_page_crc_raw(self.session, self.next_page, continuing, buf, extra)?;
        self.primed = Some(ReadKind::Crc);
        self.next_page += 1;
        Ok(())
    }
}
