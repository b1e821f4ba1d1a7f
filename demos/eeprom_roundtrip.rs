//! Stage, verify and commit a page against a simulated plain NVRAM part.
//!
//! Run with: `cargo run --example eeprom_roundtrip`

use onewire_membank::prelude::*;

/// Minimal simulated device: enough of the plain-family wire protocol to
/// exercise the whole stage/verify/commit cycle.
struct SimDevice {
    page_length: usize,
    memory: [u8; 256],
    scratch: [u8; 32],
    scratch_ta: usize,
    scratch_len: usize,
    pending_read: Option<usize>,
}

impl SimDevice {
    fn new() -> Self {
        Self {
            page_length: 32,
            memory: [0; 256],
            scratch: [0; 32],
            scratch_ta: 0,
            scratch_len: 0,
            pending_read: None,
        }
    }
}

impl BusAdapter for SimDevice {
    type Error = core::convert::Infallible;

    fn reset(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn select_device(&mut self, _address: &DeviceAddress) -> Result<bool, Self::Error> {
        self.pending_read = None;
        Ok(true)
    }

    fn put_byte(&mut self, _byte: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    fn get_byte(&mut self) -> Result<u8, Self::Error> {
        Ok(0xFF)
    }

    fn read_block(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        if let Some(addr) = self.pending_read {
            buf.copy_from_slice(&self.memory[addr..addr + buf.len()]);
            self.pending_read = Some(addr + buf.len());
        } else {
            buf.fill(0xFF);
        }
        Ok(())
    }

    fn data_block(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let addr = buf[1] as usize | ((buf[2] as usize) << 8);
        match buf[0] {
            0x0F => {
                // Write scratchpad: latch address and payload.
                let offset = addr % self.page_length;
                let len = buf.len() - 3;
                self.scratch[offset..offset + len].copy_from_slice(&buf[3..]);
                self.scratch_ta = addr;
                self.scratch_len = len;
            }
            0xAA => {
                // Read scratchpad: TA1, TA2, E/S, then the row tail.
                let offset = self.scratch_ta % self.page_length;
                buf[1] = (self.scratch_ta & 0xFF) as u8;
                buf[2] = (self.scratch_ta >> 8) as u8;
                buf[3] = ((self.scratch_ta + self.scratch_len - 1) % self.page_length) as u8;
                let len = self.page_length - offset;
                buf[4..4 + len].copy_from_slice(&self.scratch[offset..offset + len]);
            }
            0x55 => {
                // Copy scratchpad: commit, confirm with 0xAA.
                let offset = self.scratch_ta % self.page_length;
                self.memory[self.scratch_ta..self.scratch_ta + self.scratch_len]
                    .copy_from_slice(&self.scratch[offset..offset + self.scratch_len]);
                for slot in buf[4..].iter_mut() {
                    *slot = 0xAA;
                }
            }
            0xF0 => self.pending_read = Some(addr),
            _ => {}
        }
        Ok(())
    }

    fn set_power_duration(&mut self, _duration: PowerDuration) -> Result<(), Self::Error> {
        Ok(())
    }

    fn start_power_delivery(&mut self, _condition: PowerCondition) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn set_power_normal(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn speed(&self) -> BusSpeed {
        BusSpeed::Regular
    }

    fn set_speed(&mut self, _speed: BusSpeed) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn main() {
    let address = DeviceAddress::from_bytes([0x23, 0x45, 0x66, 0x10, 0x02, 0x00, 0x00, 0x5B]);
    let mut device = SimDevice::new();
    let mut session = Session::new(&mut device, NoDelay, address);

    let bank = MemoryBank::new(
        BankDescriptor::new(32, 8, 0, Capabilities::plain()),
        Profile::plain(),
    );

    let payload: [u8; 32] = core::array::from_fn(|i| i as u8);
    bank.write_scratchpad(&mut session, 64, &payload)
        .expect("staging failed");

    let mut check = [0u8; 32];
    let info = bank
        .read_scratchpad(&mut session, &mut check, None)
        .expect("readback failed");
    assert_eq!(check, payload, "scratchpad verify mismatch");
    println!(
        "staged {} bytes at {:#06x}, end offset {:#04x}",
        info.len, info.target_address, info.end_offset
    );

    bank.copy_scratchpad(&mut session, 64, 32).expect("commit failed");

    let mut page = [0u8; 32];
    bank.read_page(&mut session, 2, &mut page).expect("read failed");
    assert_eq!(page, payload, "committed page mismatch");
    println!("page 2 committed and read back: {:02X?}", &page[..8]);
}
