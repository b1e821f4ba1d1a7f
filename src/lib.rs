//! A `no_std`, no-alloc transaction engine for 1-Wire paged memory devices.
//!
//! 1-Wire EEPROM and NVRAM parts expose their non-volatile storage as
//! fixed-size pages that can only be written indirectly: bytes are first
//! staged into a small volatile buffer on the device (the *scratchpad*),
//! optionally read back for verification, and finally committed with a
//! hardware-checked copy command. This crate implements that protocol -
//! the CRC-16 integrity envelope, the per-family framing variants, and the
//! failure discipline that separates transient bus errors from integrity
//! failures - on top of a caller-supplied bus adapter.
//!
//! # Features
//!
//! - **Zero heap allocation** - frames live in fixed-capacity buffers
//! - **Per-family profiles** - plain, CRC-checked, password-protected,
//!   auto-erasing, and power-pulse-confirmed parts share one engine
//! - **Capability gating** - unsupported operations fail before any bus I/O
//! - **Strict failure model** - CRC mismatches are surfaced, never retried
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐      ┌──────────────────────────────┐
//! │  Device facade │      │  MemoryBank                  │
//! │  (your code)   │─────▶│  write/read/copy scratchpad  │
//! │                │      │  read page / page+CRC        │
//! └────────────────┘      └──────────────┬───────────────┘
//!                                        │ frames + CRC-16
//!                         ┌──────────────▼───────────────┐
//!                         │  Session (speed cache)       │
//!                         │  BusAdapter (your transport)  │
//!                         └──────────────────────────────┘
//! ```
//!
//! A [`MemoryBank`](onewire::MemoryBank) describes one page-organized
//! region of one device family; a [`Session`](onewire::Session) carries the
//! per-device state (address, negotiated speed) and borrows the adapter.
//! The bank validates every call against its capability set, builds the
//! byte-exact wire frame, and checks the echoed frame against the CRC-16
//! residual before trusting anything the device sent.
//!
//! # Example
//!
//! ```rust,no_run
//! use onewire_membank::prelude::*;
//!
//! fn commit<A: BusAdapter, D: embedded_hal::delay::DelayNs>(
//!     session: &mut Session<A, D>,
//! ) -> Result<(), MemoryError<A::Error>> {
//!     // 32-byte pages, CRC-checked family (e.g. a DS1963-class part)
//!     let bank = MemoryBank::new(
//!         BankDescriptor::new(32, 8, 0, Capabilities::crc_checked()),
//!         Profile::crc_checked(),
//!     );
//!
//!     // Stage one page, verify the staging buffer, then commit it.
//!     let page = [0x5A; 32];
//!     bank.write_scratchpad(session, 0, &page)?;
//!     let mut check = [0u8; 32];
//!     bank.read_scratchpad(session, &mut check, None)?;
//!     bank.copy_scratchpad(session, 0, 32)?;
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![no_std]

#[macro_use]
mod fmt;

pub mod onewire;

pub mod prelude {
    pub use crate::onewire::prelude::*;
}
