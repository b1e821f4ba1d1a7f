//! Per-device session state.
//!
//! The bus is half duplex and shared; the protocol layer adds no locking
//! of its own. A [`Session`] is the unit of serialization: it owns (or
//! mutably borrows) the adapter, the device address, and the cached
//! communication-speed state. Holding `&mut Session` for the duration of a
//! transaction is the concurrency contract. For adapters shared between
//! sessions or interrupt contexts, [`SharedBus`] provides the expected
//! one-mutex-per-bus discipline.

use core::cell::RefCell;

use embedded_hal::delay::DelayNs;

use crate::onewire::{
    MemoryError,
    adapter::{BusAdapter, BusSpeed},
    address::DeviceAddress,
};

/// One device's view of the bus.
///
/// `A` is the adapter (a concrete type or `&mut` of one via the forwarding
/// impl), `D` supplies the fixed sleeps power-pulsed commits require.
pub struct Session<A, D> {
    pub(crate) adapter: A,
    pub(crate) delay: D,
    address: DeviceAddress,
    speed: BusSpeed,
    speed_verified: bool,
}

impl<A: BusAdapter, D: DelayNs> Session<A, D> {
    /// Creates a session talking to `address` at the adapter's current
    /// speed. The speed starts unverified, so the first transaction
    /// renegotiates it.
    pub fn new(adapter: A, delay: D, address: DeviceAddress) -> Self {
        let speed = adapter.speed();
        Self {
            adapter,
            delay,
            address,
            speed,
            speed_verified: false,
        }
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    /// Whether the cached communication speed is still trusted.
    pub fn speed_verified(&self) -> bool {
        self.speed_verified
    }

    /// Drops the cached speed state, forcing renegotiation on the next
    /// transaction. Every integrity or presence failure calls this; it is
    /// the layer's only automatic recovery action.
    pub fn mark_speed_unverified(&mut self) {
        self.speed_verified = false;
    }

    /// Renegotiates speed if needed, then match-ROM selects the device.
    pub(crate) fn select(&mut self) -> Result<(), MemoryError<A::Error>> {
        if !self.speed_verified {
            self.adapter
                .set_speed(self.speed)
                .map_err(MemoryError::Bus)?;
            self.speed_verified = true;
        }

        let present = self
            .adapter
            .select_device(&self.address)
            .map_err(MemoryError::Bus)?;
        if !present {
            trace!("device {} absent on select", self.address);
            self.speed_verified = false;
            return Err(MemoryError::DeviceNotFound);
        }
        Ok(())
    }

    /// Records an integrity-class failure: unverifies the speed and passes
    /// the error through unchanged.
    pub(crate) fn fail<T>(&mut self, err: MemoryError<A::Error>) -> Result<T, MemoryError<A::Error>> {
        self.speed_verified = false;
        Err(err)
    }

    /// Releases the adapter and delay provider.
    pub fn release(self) -> (A, D) {
        (self.adapter, self.delay)
    }
}

/// An adapter shared between sessions or execution contexts.
///
/// Wraps the adapter in a `critical-section` mutex so that each closure
/// runs as one uninterrupted exclusive scope. A whole transaction (select,
/// frame, confirmation) must run inside a single `with` call; the protocol
/// never yields mid-frame.
pub struct SharedBus<A> {
    inner: critical_section::Mutex<RefCell<A>>,
}

impl<A> SharedBus<A> {
    pub const fn new(adapter: A) -> Self {
        Self {
            inner: critical_section::Mutex::new(RefCell::new(adapter)),
        }
    }

    /// Runs `f` with exclusive access to the adapter.
    pub fn with<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Recovers the adapter.
    pub fn into_inner(self) -> A {
        self.inner.into_inner().into_inner()
    }
}
