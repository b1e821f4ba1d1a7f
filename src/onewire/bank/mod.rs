//! The memory bank shell: static geometry, capability gating, and the
//! public transaction entry points.
//!
//! A bank is one page-organized region of one device. The shell owns the
//! region's shape ([`BankDescriptor`]) and its wire behavior
//! ([`Profile`](profile::Profile)); the protocol steps themselves live in
//! [`scratch`], [`copy`] and [`read`]. Every entry point validates
//! arguments against the capability set before the first bus call, so a
//! misconfigured caller fails fast with [`MemoryError::Unsupported`] or
//! [`MemoryError::OutOfRange`] instead of leaving a device mid-frame.

mod copy;
pub(crate) mod read;
mod scratch;

pub mod profile;

pub use read::SequentialReader;
pub use scratch::ScratchpadInfo;

use crate::onewire::error::MemoryError;
use self::profile::Profile;

/// Largest page length any supported family uses.
pub const MAX_PAGE_LENGTH: usize = 64;

/// Capacity of the fixed frame buffers: command + address + a full page
/// plus the largest metadata, CRC and verification trailers.
pub(crate) const FRAME_CAP: usize = 96;

/// Auxiliary per-page metadata some families return next to page data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtraInfo {
    /// Bytes of extra info streamed after each page.
    pub length: usize,
    /// Human-readable description, e.g. `"write cycle counter"`.
    pub description: &'static str,
}

/// Static capability flags of a bank. Read-only after construction; every
/// operation is gated on them before any bus traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Free-form user memory (as opposed to register or status space).
    pub general_purpose: bool,
    /// Writable through the scratchpad path.
    pub read_write: bool,
    /// Programmable once, then read-only.
    pub write_once: bool,
    /// Contents survive power loss.
    pub non_volatile: bool,
    /// The device generates a CRC-16 trailer on page reads.
    pub page_auto_crc: bool,
    /// Pages can be locked against further writes.
    pub lockable: bool,
    /// Commits need a power-delivery pulse instead of polled status.
    pub power_for_write: bool,
    /// Sequential reads may continue across pages without re-addressing.
    pub read_continue: bool,
    /// Per-page metadata returned by CRC page reads, if any.
    pub extra_info: Option<ExtraInfo>,
}

impl Capabilities {
    /// General-purpose read-write NV memory with no CRC support.
    pub const fn plain() -> Self {
        Self {
            general_purpose: true,
            read_write: true,
            write_once: false,
            non_volatile: true,
            page_auto_crc: false,
            lockable: false,
            power_for_write: false,
            read_continue: true,
            extra_info: None,
        }
    }

    /// Read-write NV memory with device-generated page CRCs.
    pub const fn crc_checked() -> Self {
        let mut caps = Self::plain();
        caps.page_auto_crc = true;
        caps
    }

    /// CRC-checked memory behind an 8-byte password.
    pub const fn password_protected() -> Self {
        let mut caps = Self::crc_checked();
        caps.lockable = true;
        caps
    }

    /// EEPROM needing a power pulse for each commit; no CRC support.
    pub const fn power_pulsed() -> Self {
        let mut caps = Self::plain();
        caps.power_for_write = true;
        caps
    }

    /// Adds per-page extra info (e.g. a write-cycle counter).
    pub const fn with_extra_info(mut self, info: ExtraInfo) -> Self {
        self.extra_info = Some(info);
        self
    }

    pub(crate) const fn extra_info_length(&self) -> usize {
        match self.extra_info {
            Some(info) => info.length,
            None => 0,
        }
    }
}

/// The static shape of a bank: page geometry, physical base address, and
/// capabilities. Built once per facade and immutable during transactions.
#[derive(Debug, Clone, Copy)]
pub struct BankDescriptor {
    page_length: usize,
    number_pages: usize,
    base_address: usize,
    caps: Capabilities,
}

impl BankDescriptor {
    /// # Panics
    /// Panics if `page_length` is zero, not a power of two, or larger than
    /// [`MAX_PAGE_LENGTH`], or if `number_pages` is zero. Address masks in
    /// the wire protocol rely on power-of-two pages.
    pub fn new(
        page_length: usize,
        number_pages: usize,
        base_address: usize,
        caps: Capabilities,
    ) -> Self {
        assert!(
            page_length.is_power_of_two() && page_length <= MAX_PAGE_LENGTH,
            "page length {} must be a power of two no larger than {}",
            page_length,
            MAX_PAGE_LENGTH,
        );
        assert!(number_pages > 0, "bank must have at least one page");

        // The wire frames carry a 2-byte physical address; a bank reaching
        // past that space would silently alias high pages onto low ones.
        let end = page_length
            .checked_mul(number_pages)
            .and_then(|size| size.checked_add(base_address));
        assert!(
            end.is_some_and(|end| end <= 1 << 16),
            "bank at base {:#06x} must fit the 2-byte wire address space",
            base_address,
        );

        Self {
            page_length,
            number_pages,
            base_address,
            caps,
        }
    }

    pub fn page_length(&self) -> usize {
        self.page_length
    }

    pub fn number_pages(&self) -> usize {
        self.number_pages
    }

    /// Total bank size in bytes.
    pub fn size(&self) -> usize {
        self.page_length * self.number_pages
    }

    pub fn base_address(&self) -> usize {
        self.base_address
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }
}

/// An 8-byte commit password for protected banks.
///
/// Copied verbatim into the copy-scratchpad frame. The `Debug` impl does
/// not print the bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Password([u8; 8]);

impl Password {
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub(crate) const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl core::fmt::Debug for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Password(..)")
    }
}

/// One page-organized memory region of one device family.
///
/// Stateless apart from its configuration: all transaction state lives in
/// the [`Session`](crate::onewire::Session) passed to each call, so one
/// bank value can serve any number of devices of the same family.
#[derive(Debug, Clone)]
pub struct MemoryBank {
    pub(crate) descriptor: BankDescriptor,
    pub(crate) profile: Profile,
    pub(crate) password: Option<Password>,
}

impl MemoryBank {
    pub fn new(descriptor: BankDescriptor, profile: Profile) -> Self {
        Self {
            descriptor,
            profile,
            password: None,
        }
    }

    /// Configures the commit password for a protected bank.
    pub fn set_password(&mut self, password: Password) {
        self.password = Some(password);
    }

    pub fn clear_password(&mut self) {
        self.password = None;
    }

    pub fn descriptor(&self) -> &BankDescriptor {
        &self.descriptor
    }

    pub fn page_length(&self) -> usize {
        self.descriptor.page_length()
    }

    pub fn number_pages(&self) -> usize {
        self.descriptor.number_pages()
    }

    pub fn size(&self) -> usize {
        self.descriptor.size()
    }

    pub fn has_page_auto_crc(&self) -> bool {
        self.descriptor.capabilities().page_auto_crc
    }

    pub fn has_extra_info(&self) -> bool {
        self.descriptor.capabilities().extra_info.is_some()
    }

    pub fn extra_info_length(&self) -> usize {
        self.descriptor.capabilities().extra_info_length()
    }

    /// Longest payload a page packet can carry: a page holds the length
    /// prefix, the payload, and a 2-byte packet CRC.
    pub fn max_packet_length(&self) -> usize {
        self.descriptor.page_length() - 3
    }

    /// Bounds-checks a bank-relative byte range.
    pub(crate) fn check_range<E>(&self, addr: usize, len: usize) -> Result<(), MemoryError<E>> {
        if len == 0 || addr.checked_add(len).is_none_or(|end| end > self.size()) {
            return Err(MemoryError::OutOfRange);
        }
        Ok(())
    }

    /// Bounds-checks a page index.
    pub(crate) fn check_page<E>(&self, page: usize) -> Result<(), MemoryError<E>> {
        if page >= self.descriptor.number_pages() {
            return Err(MemoryError::OutOfRange);
        }
        Ok(())
    }

    /// Rejects writes on banks that cannot take them.
    pub(crate) fn check_writable<E>(&self) -> Result<(), MemoryError<E>> {
        if !self.descriptor.capabilities().read_write {
            return Err(MemoryError::Unsupported);
        }
        Ok(())
    }

    /// Physical device address of a bank-relative offset.
    pub(crate) fn physical(&self, addr: usize) -> usize {
        self.descriptor.base_address() + addr
    }
}
