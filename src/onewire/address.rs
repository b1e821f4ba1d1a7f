use crate::onewire::crc::crc8;

/// The 8-byte ROM address of a 1-Wire device.
///
/// Byte 0 is the family code, bytes 1..=6 the serial number, byte 7 a
/// CRC-8 over the preceding seven. Opaque and immutable for the life of a
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress([u8; 8]);

impl DeviceAddress {
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Family code identifying the device type.
    pub const fn family_code(&self) -> u8 {
        self.0[0]
    }

    /// Returns true if the embedded CRC-8 check byte is consistent.
    pub fn is_valid(&self) -> bool {
        crc8(&self.0) == 0
    }
}

impl core::fmt::Display for DeviceAddress {
    /// Prints the address the conventional way: most significant byte
    /// (the CRC) first.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for b in self.0.iter().rev() {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}
