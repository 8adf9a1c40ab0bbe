//! # Typed Latte Registers
//!
//! Addresses and layouts of the Latte registers the Starbuck boot code
//! touches. Registers with structured contents are modelled with
//! [`bitfield_struct`] and implement [`MmioRegister`]; plain bit masks are
//! used where the hardware only has a handful of undocumented bits.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod ppc;
pub mod sha;
pub mod timer;

use latte_mmio::{Mmio, PhysAddr};

/// A 32-bit register at a fixed address.
pub trait MmioRegister: Sized {
    const ADDR: PhysAddr;

    fn from_raw(bits: u32) -> Self;

    fn into_raw(self) -> u32;

    /// Read the register.
    #[inline]
    fn load<B: Mmio + ?Sized>(bus: &B) -> Self {
        Self::from_raw(bus.read32(Self::ADDR))
    }

    /// Write the register.
    #[inline]
    fn store<B: Mmio + ?Sized>(self, bus: &B) {
        bus.write32(Self::ADDR, self.into_raw());
    }
}
