pub mod adapter;
pub mod address;
pub mod bank;
pub mod commands;
pub mod crc;
pub mod error;
pub mod session;

#[cfg(test)]
mod test_support;

pub use adapter::{BusAdapter, BusSpeed, PowerCondition, PowerDuration};
pub use address::DeviceAddress;
pub use bank::{
    BankDescriptor, Capabilities, ExtraInfo, MemoryBank, Password, ScratchpadInfo,
    SequentialReader, profile::{Confirm, Profile},
};
pub use crc::{CRC16_RESIDUAL, crc8, crc16, crc16_byte};
pub use error::MemoryError;
pub use session::{Session, SharedBus};

pub mod prelude {
    pub use super::{
        BankDescriptor, BusAdapter, BusSpeed, Capabilities, Confirm, DeviceAddress, ExtraInfo,
        MemoryBank, MemoryError, Password, PowerCondition, PowerDuration, Profile, ScratchpadInfo,
        SequentialReader, Session, SharedBus,
    };
}
