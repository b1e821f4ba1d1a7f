//! The commit protocol: moving staged scratchpad bytes into non-volatile
//! memory, confirmed either by polled status bytes or by a timed power
//! pulse.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::onewire::{
    adapter::{BusAdapter, PowerCondition, PowerDuration},
    bank::{
        FRAME_CAP, MemoryBank,
        profile::{COPY_AUTH_NIBBLE, COPY_DONE_NIBBLES, Confirm},
    },
    error::MemoryError,
    session::Session,
};

impl MemoryBank {
    /// Commits `len` bytes most recently staged at bank-relative `addr`.
    ///
    /// The frame repeats the target address and the ending offset the
    /// device latched during staging; a mismatch makes the device refuse
    /// the copy. Password banks append their 8-byte secret verbatim.
    ///
    /// A confirmed-bad status is surfaced and never retried here: the
    /// device may or may not have torn the row, and re-driving the copy
    /// could mask that. Every failure also unverifies the cached bus
    /// speed, which is the only recovery this layer performs.
    ///
    /// # Errors
    /// * [`MemoryError::Unsupported`] - the bank is not read-write
    /// * [`MemoryError::OutOfRange`] - bad range, or an end offset off a
    ///   page boundary on a byte-polled family (only power-pulsed parts
    ///   commit partial rows)
    /// * [`MemoryError::Auth`] - no password configured for a protected
    ///   bank, or the device reported a password mismatch
    /// * [`MemoryError::Protocol`] - an unrecognized confirmation code
    pub fn copy_scratchpad<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        addr: usize,
        len: usize,
    ) -> Result<(), MemoryError<A::Error>> {
        self.check_writable()?;
        self.check_range(addr, len)?;

        let page_length = self.descriptor.page_length();
        let physical = self.physical(addr);
        if !self.profile.is_power_pulsed() && (physical + len) % page_length != 0 {
            return Err(MemoryError::OutOfRange);
        }
        if self.profile.requires_password && self.password.is_none() {
            return Err(MemoryError::Auth);
        }
        if matches!(self.profile.confirm, Confirm::BytePolled) && self.profile.copy_verify_len == 0
        {
            // Without verification fill bytes the last echoed byte would be
            // the end offset or a password byte, not a status.
            return Err(MemoryError::Protocol("no verification bytes configured"));
        }

        session.select()?;

        let end_offset = ((physical + len - 1) & (page_length - 1)) as u8;
        let mut frame: Vec<u8, FRAME_CAP> = Vec::new();
        frame
            .extend_from_slice(&[
                self.profile.copy_cmd,
                (physical & 0xFF) as u8,
                (physical >> 8) as u8,
                end_offset,
            ])
            .map_err(|_| MemoryError::OutOfRange)?;
        if let Some(password) = &self.password {
            if self.profile.requires_password {
                frame
                    .extend_from_slice(password.as_bytes())
                    .map_err(|_| MemoryError::OutOfRange)?;
            }
        }

        let status = match self.profile.confirm {
            Confirm::BytePolled => self.copy_byte_polled(session, frame)?,
            Confirm::PowerPulsed { latency_ms } => {
                self.copy_power_pulsed(session, frame, end_offset, latency_ms)?
            }
        };

        self.check_confirmation(session, status, addr, len)
    }

    /// Byte-polled confirmation: the verification fill bytes ride in the
    /// same block, and the last echoed byte is the status.
    fn copy_byte_polled<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        mut frame: Vec<u8, FRAME_CAP>,
    ) -> Result<u8, MemoryError<A::Error>> {
        for _ in 0..self.profile.copy_verify_len {
            frame.push(0xFF).map_err(|_| MemoryError::OutOfRange)?;
        }

        session
            .adapter
            .data_block(&mut frame)
            .map_err(MemoryError::Bus)?;

        // copy_verify_len is at least one for byte-polled profiles.
        Ok(frame[frame.len() - 1])
    }

    /// Power-pulsed confirmation: everything but the final offset byte is
    /// sent normally, the pulse is armed to begin after that byte, and the
    /// device is given its full documented commit latency before power is
    /// removed and the status read. The sleep duration is fixed: a
    /// timeout mid-commit leaves the row undefined.
    fn copy_power_pulsed<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        mut frame: Vec<u8, FRAME_CAP>,
        end_offset: u8,
        latency_ms: u32,
    ) -> Result<u8, MemoryError<A::Error>> {
        let head = frame.len() - 1;
        session
            .adapter
            .data_block(&mut frame[..head])
            .map_err(MemoryError::Bus)?;

        session
            .adapter
            .set_power_duration(PowerDuration::Infinite)
            .map_err(MemoryError::Bus)?;
        let armed = session
            .adapter
            .start_power_delivery(PowerCondition::AfterNextByte)
            .map_err(MemoryError::Bus)?;
        if !armed {
            return session.fail(MemoryError::Protocol("adapter cannot deliver power"));
        }

        session
            .adapter
            .put_byte(end_offset)
            .map_err(MemoryError::Bus)?;
        session.delay.delay_ms(latency_ms);
        session
            .adapter
            .set_power_normal()
            .map_err(MemoryError::Bus)?;

        session.adapter.get_byte().map_err(MemoryError::Bus)
    }

    /// Applies the confirmation-nibble rule shared by both disciplines.
    fn check_confirmation<A: BusAdapter, D: DelayNs>(
        &self,
        session: &mut Session<A, D>,
        status: u8,
        addr: usize,
        len: usize,
    ) -> Result<(), MemoryError<A::Error>> {
        let nibble = status & 0xF0;
        if COPY_DONE_NIBBLES.contains(&nibble) {
            debug!("committed {} bytes at bank offset {:#06x}", len, addr);
            return Ok(());
        }

        trace!("copy confirmation byte {:#04x} at bank offset {:#06x}", status, addr);
        if nibble == COPY_AUTH_NIBBLE && self.profile.requires_password {
            return session.fail(MemoryError::Auth);
        }
        session.fail(MemoryError::Protocol("copy scratchpad not confirmed"))
    }
}
