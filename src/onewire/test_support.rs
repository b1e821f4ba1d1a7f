//! Test support utilities - only compiled in test builds.
//!
//! [`MockBus`] emulates one 1-Wire memory device behind the adapter seam:
//! it parses the frames the engine shifts out, keeps a scratchpad row and
//! a flat memory array, generates complemented CRC-16 trailers the way a
//! real part does, and records enough instrumentation for tests to assert
//! ordering (selects, speed changes, power-pulse sequencing).

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use crate::onewire::{
    adapter::{BusAdapter, BusSpeed, PowerCondition, PowerDuration},
    address::DeviceAddress,
    bank::{
        BankDescriptor, Capabilities, ExtraInfo, MemoryBank,
        profile::Profile,
    },
    commands,
    crc::{crc8, crc16, seal16},
};

/// Bytes of emulated non-volatile memory.
const MOCK_MEMORY: usize = 512;

/// Largest scratchpad row the mock services.
const MOCK_ROW: usize = 64;

/// What the device is in the middle of, across adapter calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Idle,
    /// Plain read cursor for read-memory and its continuations.
    Stream { addr: usize },
    /// CRC page read: next page address and the running seed (zero when
    /// the device's generator restarted at a page boundary).
    PageCrc { addr: usize, seed: u16 },
    /// Power-pulsed copy waiting for the ending-offset byte.
    CopyAwaitOffset { addr: usize },
    /// A copy ran; the confirmation byte is ready to be polled.
    CopyStatus { status: u8 },
}

pub struct MockBus {
    pub page_length: usize,
    pub memory: [u8; MOCK_MEMORY],
    /// Whether the device answers presence.
    pub present: bool,
    /// Whether the device generates CRC trailers on staging traffic.
    pub seal_frames: bool,
    /// Overrides the confirmation byte reported by a successful copy.
    pub copy_status: Option<u8>,
    pub device_password: [u8; 8],
    /// Whether the adapter can arm a power-delivery pulse.
    pub power_delivery_ok: bool,
    /// One-shot: flip a bit in the next response the device drives.
    pub corrupt_next_response: bool,
    /// Per-page extra info streamed by CRC page reads.
    pub extra_len: usize,
    pub extra_template: [u8; 8],

    // instrumentation
    pub select_calls: usize,
    pub set_speed_calls: usize,
    pub erase_count: usize,
    pub last_write_sealed: bool,
    pub power_armed: Option<PowerCondition>,
    pub power_normal_calls: usize,

    speed: BusSpeed,
    pending: Pending,
    scratch_row: [u8; MOCK_ROW],
    scratch_ta: usize,
    scratch_len: usize,
    scratch_valid: bool,
}

impl MockBus {
    pub fn new(page_length: usize) -> Self {
        Self {
            page_length,
            memory: [0; MOCK_MEMORY],
            present: true,
            seal_frames: true,
            copy_status: None,
            device_password: [0xFF; 8],
            power_delivery_ok: true,
            corrupt_next_response: false,
            extra_len: 0,
            extra_template: [0; 8],
            select_calls: 0,
            set_speed_calls: 0,
            erase_count: 0,
            last_write_sealed: false,
            power_armed: None,
            power_normal_calls: 0,
            speed: BusSpeed::Regular,
            pending: Pending::Idle,
            scratch_row: [0; MOCK_ROW],
            scratch_ta: 0,
            scratch_len: 0,
            scratch_valid: false,
        }
    }

    fn take_corruption(&mut self) -> bool {
        let hit = self.corrupt_next_response;
        self.corrupt_next_response = false;
        hit
    }

    fn expected_end_offset(&self) -> u8 {
        ((self.scratch_ta + self.scratch_len - 1) % self.page_length) as u8
    }

    fn handle_write_scratchpad(&mut self, frame: &mut [u8]) {
        let ta = frame[1] as usize | ((frame[2] as usize) << 8);
        let body_len = frame.len() - 3;
        let offset = ta % self.page_length;

        // The master appends two fill placeholders exactly when the range
        // ends on a page boundary and the family seals frames.
        let sealed =
            self.seal_frames && body_len >= 2 && offset + body_len - 2 == self.page_length;
        let data_len = if sealed { body_len - 2 } else { body_len };

        self.scratch_row = [0; MOCK_ROW];
        self.scratch_row[offset..offset + data_len]
            .copy_from_slice(&frame[3..3 + data_len]);
        self.scratch_ta = ta;
        self.scratch_len = data_len;
        self.scratch_valid = true;
        self.last_write_sealed = sealed;

        if sealed {
            let mut trailer = seal16(crc16(&frame[..3 + data_len], 0));
            if self.take_corruption() {
                trailer[0] ^= 0x01;
            }
            frame[3 + data_len..3 + data_len + 2].copy_from_slice(&trailer);
        }
    }

    fn handle_read_scratchpad(&mut self, frame: &mut [u8]) {
        let offset = self.scratch_ta % self.page_length;
        let len = self.page_length - offset;

        frame[1] = (self.scratch_ta & 0xFF) as u8;
        frame[2] = (self.scratch_ta >> 8) as u8;
        frame[3] = self.expected_end_offset();
        frame[4..4 + len].copy_from_slice(&self.scratch_row[offset..offset + len]);

        let covered = 4 + len;
        if self.seal_frames && frame.len() >= covered + 2 {
            let trailer = seal16(crc16(&frame[..covered], 0));
            frame[covered..covered + 2].copy_from_slice(&trailer);
        }
        if self.take_corruption() {
            frame[4] ^= 0x01;
        }
    }

    fn copy_confirmation(&mut self, ta: usize, end_offset: u8, password: Option<[u8; 8]>) -> u8 {
        if let Some(pw) = password {
            if pw != self.device_password {
                return 0xFF;
            }
        }
        if !self.scratch_valid || ta != self.scratch_ta || end_offset != self.expected_end_offset()
        {
            return 0xFF;
        }

        let offset = ta % self.page_length;
        self.memory[ta..ta + self.scratch_len]
            .copy_from_slice(&self.scratch_row[offset..offset + self.scratch_len]);
        self.scratch_valid = false;
        self.copy_status.unwrap_or(0xAA)
    }

    fn handle_copy(&mut self, frame: &mut [u8]) {
        let ta = frame[1] as usize | ((frame[2] as usize) << 8);
        if frame.len() == 3 {
            // Power-pulsed discipline: the ending offset arrives as its
            // own byte while the pulse is armed.
            self.pending = Pending::CopyAwaitOffset { addr: ta };
            return;
        }

        let end_offset = frame[3];
        let (password, verify_start) = if frame[0] == commands::COPY_SCRATCHPAD_PASSWORD {
            let mut pw = [0u8; 8];
            pw.copy_from_slice(&frame[4..12]);
            (Some(pw), 12)
        } else {
            (None, 4)
        };
        let status = self.copy_confirmation(ta, end_offset, password);
        for slot in frame[verify_start..].iter_mut() {
            *slot = status;
        }
    }

    fn handle_page_crc_read(&mut self, buf: &mut [u8], addr: usize, seed: u16) {
        let page = self.page_length;
        let data_end = page.min(buf.len());
        buf[..data_end].copy_from_slice(&self.memory[addr..addr + data_end]);

        let extra_end = data_end + self.extra_len;
        buf[data_end..extra_end].copy_from_slice(&self.extra_template[..self.extra_len]);

        let trailer = seal16(crc16(&buf[..extra_end], seed));
        buf[extra_end..extra_end + 2].copy_from_slice(&trailer);

        if self.take_corruption() {
            buf[0] ^= 0x01;
        }
        // The device's generator restarts at the page boundary.
        self.pending = Pending::PageCrc {
            addr: addr + page,
            seed: 0,
        };
    }
}

impl BusAdapter for MockBus {
    type Error = Infallible;

    fn reset(&mut self) -> Result<bool, Self::Error> {
        self.pending = Pending::Idle;
        Ok(self.present)
    }

    fn select_device(&mut self, _address: &DeviceAddress) -> Result<bool, Self::Error> {
        self.select_calls += 1;
        self.pending = Pending::Idle;
        Ok(self.present)
    }

    fn put_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        if let Pending::CopyAwaitOffset { addr } = self.pending {
            let status = self.copy_confirmation(addr, byte, None);
            self.pending = Pending::CopyStatus { status };
        }
        Ok(())
    }

    fn get_byte(&mut self) -> Result<u8, Self::Error> {
        if let Pending::CopyStatus { status } = self.pending {
            self.pending = Pending::Idle;
            return Ok(status);
        }
        Ok(0xFF)
    }

    fn read_block(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        match self.pending {
            Pending::Stream { addr } => {
                buf.copy_from_slice(&self.memory[addr..addr + buf.len()]);
                if self.take_corruption() {
                    buf[0] ^= 0x01;
                }
                self.pending = Pending::Stream {
                    addr: addr + buf.len(),
                };
            }
            Pending::PageCrc { addr, seed } => self.handle_page_crc_read(buf, addr, seed),
            _ => buf.fill(0xFF),
        }
        Ok(())
    }

    fn data_block(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        match buf[0] {
            commands::WRITE_SCRATCHPAD => self.handle_write_scratchpad(buf),
            commands::READ_SCRATCHPAD => self.handle_read_scratchpad(buf),
            commands::COPY_SCRATCHPAD | commands::COPY_SCRATCHPAD_PASSWORD => {
                self.handle_copy(buf)
            }
            commands::ERASE_SCRATCHPAD => {
                self.erase_count += 1;
                self.scratch_row = [0; MOCK_ROW];
                self.scratch_valid = false;
            }
            commands::READ_MEMORY => {
                let addr = buf[1] as usize | ((buf[2] as usize) << 8);
                self.pending = Pending::Stream { addr };
            }
            commands::READ_PAGE_WITH_CRC => {
                let addr = buf[1] as usize | ((buf[2] as usize) << 8);
                let seed = crc16(&buf[..3], 0);
                self.pending = Pending::PageCrc { addr, seed };
            }
            _ => {}
        }
        Ok(())
    }

    fn set_power_duration(&mut self, _duration: PowerDuration) -> Result<(), Self::Error> {
        Ok(())
    }

    fn start_power_delivery(&mut self, condition: PowerCondition) -> Result<bool, Self::Error> {
        if !self.power_delivery_ok {
            return Ok(false);
        }
        self.power_armed = Some(condition);
        Ok(true)
    }

    fn set_power_normal(&mut self) -> Result<(), Self::Error> {
        self.power_normal_calls += 1;
        Ok(())
    }

    fn speed(&self) -> BusSpeed {
        self.speed
    }

    fn set_speed(&mut self, speed: BusSpeed) -> Result<(), Self::Error> {
        self.set_speed_calls += 1;
        self.speed = speed;
        Ok(())
    }
}

/// Delay provider that records instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub slept_ns: u64,
}

impl MockDelay {
    pub fn slept_ms(&self) -> u32 {
        (self.slept_ns / 1_000_000) as u32
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.slept_ns += ns as u64;
    }
}

/// A ROM address with a consistent CRC-8 check byte.
pub fn sample_address() -> DeviceAddress {
    let mut rom = [0x23, 0x45, 0x66, 0x10, 0x02, 0x00, 0x00, 0x00];
    rom[7] = crc8(&rom[..7]);
    DeviceAddress::from_bytes(rom)
}

/// Standard fixture: a mock device and a recording delay.
pub fn mock_session(page_length: usize) -> (MockBus, MockDelay) {
    (MockBus::new(page_length), MockDelay::default())
}

pub fn plain_bank(page_length: usize, pages: usize) -> MemoryBank {
    MemoryBank::new(
        BankDescriptor::new(page_length, pages, 0, Capabilities::plain()),
        Profile::plain(),
    )
}

pub fn crc_bank(page_length: usize, pages: usize) -> MemoryBank {
    MemoryBank::new(
        BankDescriptor::new(page_length, pages, 0, Capabilities::crc_checked()),
        Profile::crc_checked(),
    )
}

/// CRC-checked bank with an 8-byte write-cycle counter per page.
pub fn counter_bank(page_length: usize, pages: usize) -> MemoryBank {
    let caps = Capabilities::crc_checked().with_extra_info(ExtraInfo {
        length: 8,
        description: "write cycle counter",
    });
    MemoryBank::new(
        BankDescriptor::new(page_length, pages, 0, caps),
        Profile::crc_checked(),
    )
}

pub fn protected_bank(page_length: usize, pages: usize) -> MemoryBank {
    MemoryBank::new(
        BankDescriptor::new(page_length, pages, 0, Capabilities::password_protected()),
        Profile::password_protected(),
    )
}

pub fn pulsed_bank(page_length: usize, pages: usize) -> MemoryBank {
    MemoryBank::new(
        BankDescriptor::new(page_length, pages, 0, Capabilities::power_pulsed()),
        Profile::power_pulsed(),
    )
}
