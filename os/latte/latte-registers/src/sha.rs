//! # SHA-1 engine registers

use crate::MmioRegister;
use bitfield_struct::bitfield;
use latte_mmio::PhysAddr;

/// Control and status register.
pub const SHA_CTRL: PhysAddr = PhysAddr::new(0x0d03_0000);

/// Physical source address of the next transfer.
pub const SHA_SRC: PhysAddr = PhysAddr::new(0x0d03_0004);

/// First of the five chaining value registers `H0..H4`.
pub const SHA_H0: PhysAddr = PhysAddr::new(0x0d03_0008);

/// Number of chaining value registers.
pub const SHA_H_COUNT: u32 = 5;

/// Address of chaining value register `Hn`.
#[must_use]
pub const fn sha_h(n: u32) -> PhysAddr {
    assert!(n < SHA_H_COUNT);
    PhysAddr::new(SHA_H0.as_u32() + 4 * n)
}

/// `SHA_CTRL`.
///
/// Writing `exec = 1` starts hashing `blocks_minus_one + 1` 64-byte blocks
/// from [`SHA_SRC`]; the engine clears `exec` when done.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct ShaCtrl {
    /// Bits 0..=9: number of 64-byte blocks to process, minus one.
    #[bits(10)]
    pub blocks_minus_one: u16,

    /// Bits 10..=28: reserved.
    #[bits(19)]
    __: u32,

    /// Bit 29: the last transfer failed.
    pub err: bool,

    /// Bit 30: raise an interrupt on completion.
    pub irq: bool,

    /// Bit 31: transfer in progress.
    pub exec: bool,
}

impl MmioRegister for ShaCtrl {
    const ADDR: PhysAddr = SHA_CTRL;

    #[inline]
    fn from_raw(bits: u32) -> Self {
        Self::from_bits(bits)
    }

    #[inline]
    fn into_raw(self) -> u32 {
        self.into_bits()
    }
}
