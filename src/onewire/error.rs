/// Errors that can occur during memory bank transactions.
///
/// `E` is the transport error of the [`BusAdapter`](crate::onewire::BusAdapter)
/// in use. Only [`DeviceNotFound`](MemoryError::DeviceNotFound) is worth a
/// caller retry after re-addressing; integrity and protocol failures are
/// surfaced exactly once, because re-driving an unconfirmed write can mask
/// a torn commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError<E> {
    /// The bus adapter itself failed.
    Bus(E),
    /// The device did not answer selection.
    DeviceNotFound,
    /// A CRC-sealed frame failed the residual check.
    Integrity,
    /// Arguments violate the bank's geometry.
    OutOfRange,
    /// The device rejected the supplied password, or none was configured
    /// for a password-protected bank.
    Auth,
    /// The device answered with something the protocol does not define.
    Protocol(&'static str),
    /// The bank's capability set does not cover the requested operation.
    Unsupported,
    /// A page packet carries a length prefix larger than the page allows.
    BadPacketLength,
}

impl<E> core::fmt::Display for MemoryError<E>
where
    E: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MemoryError::Bus(e) => write!(f, "bus adapter error: {e:?}"),
            MemoryError::DeviceNotFound => write!(f, "device did not answer selection"),
            MemoryError::Integrity => write!(f, "CRC residual mismatch"),
            MemoryError::OutOfRange => write!(f, "arguments violate bank geometry"),
            MemoryError::Auth => write!(f, "password rejected or not configured"),
            MemoryError::Protocol(msg) => write!(f, "protocol violation: {msg}"),
            MemoryError::Unsupported => write!(f, "operation not supported by this bank"),
            MemoryError::BadPacketLength => write!(f, "invalid length prefix in page packet"),
        }
    }
}
