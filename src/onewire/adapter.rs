//! The bus adapter seam.
//!
//! Everything below the memory protocol - reset and presence, byte and
//! block shifting, strong-pullup power delivery, speed switching - is the
//! adapter's job. Serial bridges, USB masters and bit-banged ports all fit
//! behind [`BusAdapter`]; this crate never touches a transport directly.

use crate::onewire::address::DeviceAddress;

/// Communication rate of the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusSpeed {
    /// Standard timing, every device understands it.
    Regular,
    /// Standard timing with relaxed slopes for long or star-topology lines.
    Flex,
    /// Overdrive timing for devices that negotiated it.
    Overdrive,
}

/// When a requested power-delivery pulse begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCondition {
    /// Immediately.
    Now,
    /// After the next byte finishes shifting.
    AfterNextByte,
}

/// How long a power-delivery pulse is sustained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerDuration {
    /// Until [`BusAdapter::set_power_normal`] is called.
    Infinite,
    /// A fixed number of milliseconds.
    Millis(u16),
}

/// A 1-Wire bus master.
///
/// Half duplex and single conductor: reads are performed by shifting out
/// fill bytes (`0xFF`) while sampling the line, which is why
/// [`data_block`](BusAdapter::data_block) rewrites its buffer in place.
/// Implementations are not expected to be thread-safe; callers serialize
/// access per session (see [`SharedBus`](crate::onewire::SharedBus)).
pub trait BusAdapter {
    /// Transport-level error type.
    type Error;

    /// Resets the bus and reports whether any device answered presence.
    fn reset(&mut self) -> Result<bool, Self::Error>;

    /// Resets the bus and addresses one device by its ROM address.
    ///
    /// Returns `false` when the device did not answer presence.
    fn select_device(&mut self, address: &DeviceAddress) -> Result<bool, Self::Error>;

    /// Shifts one byte onto the bus.
    fn put_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Shifts one fill byte out and returns what the line answered.
    fn get_byte(&mut self) -> Result<u8, Self::Error>;

    /// Fills `buf` by shifting out one fill byte per slot.
    fn read_block(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Bidirectional shift: transmits `buf` while overwriting it with what
    /// the line carried during each bit slot.
    fn data_block(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Configures how long the next power-delivery pulse lasts.
    fn set_power_duration(&mut self, duration: PowerDuration) -> Result<(), Self::Error>;

    /// Arms a power-delivery pulse; returns `false` if the adapter cannot
    /// deliver power.
    fn start_power_delivery(&mut self, condition: PowerCondition) -> Result<bool, Self::Error>;

    /// Ends power delivery and returns the line to normal drive.
    fn set_power_normal(&mut self) -> Result<(), Self::Error>;

    /// Currently configured bus speed.
    fn speed(&self) -> BusSpeed;

    /// Switches the bus speed.
    fn set_speed(&mut self, speed: BusSpeed) -> Result<(), Self::Error>;
}

impl<A: BusAdapter + ?Sized> BusAdapter for &mut A {
    type Error = A::Error;

    fn reset(&mut self) -> Result<bool, Self::Error> {
        A::reset(self)
    }

    fn select_device(&mut self, address: &DeviceAddress) -> Result<bool, Self::Error> {
        A::select_device(self, address)
    }

    fn put_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        A::put_byte(self, byte)
    }

    fn get_byte(&mut self) -> Result<u8, Self::Error> {
        A::get_byte(self)
    }

    fn read_block(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        A::read_block(self, buf)
    }

    fn data_block(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        A::data_block(self, buf)
    }

    fn set_power_duration(&mut self, duration: PowerDuration) -> Result<(), Self::Error> {
        A::set_power_duration(self, duration)
    }

    fn start_power_delivery(&mut self, condition: PowerCondition) -> Result<bool, Self::Error> {
        A::start_power_delivery(self, condition)
    }

    fn set_power_normal(&mut self) -> Result<(), Self::Error> {
        A::set_power_normal(self)
    }

    fn speed(&self) -> BusSpeed {
        A::speed(self)
    }

    fn set_speed(&mut self, speed: BusSpeed) -> Result<(), Self::Error> {
        A::set_speed(self, speed)
    }
}
