//! # Hardware bus
//!
//! [`LatteBus`] dereferences physical addresses directly. It is only sound on
//! Starbuck itself, where physical memory and the register window are mapped
//! 1:1 and the code runs with supervisor privileges.

use crate::access::{CacheControl, Mmio};
use crate::address::{PhysAddr, PhysRegion};

/// The real Latte hardware, as seen from Starbuck.
pub struct LatteBus {
    _private: (),
}

impl LatteBus {
    /// # Safety
    /// The caller must run on Starbuck with a 1:1 mapping of physical memory
    /// and the hardware register window, and must not create more than one
    /// `LatteBus` at a time.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Mmio for LatteBus {
    #[inline]
    fn read32(&self, addr: PhysAddr) -> u32 {
        // SAFETY: `LatteBus::new` requires a 1:1 mapping of all physical addresses.
        unsafe { core::ptr::read_volatile(addr.as_ptr::<u32>()) }
    }

    #[inline]
    fn write32(&self, addr: PhysAddr, value: u32) {
        // SAFETY: `LatteBus::new` requires a 1:1 mapping of all physical addresses.
        unsafe { core::ptr::write_volatile(addr.as_ptr::<u32>(), value) }
    }
}

impl CacheControl for LatteBus {
    fn flush(&self, region: PhysRegion) {
        for line in region.lines() {
            arm926::clean_dcache_line(line.as_u32());
        }
        arm926::drain_write_buffer();
    }

    fn invalidate(&self, region: PhysRegion) {
        for line in region.lines() {
            arm926::invalidate_dcache_line(line.as_u32());
        }
    }
}

#[cfg(target_arch = "arm")]
mod arm926 {
    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub fn clean_dcache_line(mva: u32) {
        unsafe {
            core::arch::asm!(
                "mcr p15, 0, {0}, c7, c10, 1",
                in(reg) mva,
                options(nostack, preserves_flags)
            );
        }
    }

    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub fn invalidate_dcache_line(mva: u32) {
        unsafe {
            core::arch::asm!(
                "mcr p15, 0, {0}, c7, c6, 1",
                in(reg) mva,
                options(nostack, preserves_flags)
            );
        }
    }

    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub fn drain_write_buffer() {
        unsafe {
            core::arch::asm!(
                "mcr p15, 0, {0}, c7, c10, 4",
                in(reg) 0u32,
                options(nostack, preserves_flags)
            );
        }
    }
}

// Host builds have coherent caches; only ordering remains to be enforced.
#[cfg(not(target_arch = "arm"))]
mod arm926 {
    use core::sync::atomic::{Ordering, fence};

    #[inline]
    pub fn clean_dcache_line(_mva: u32) {
        fence(Ordering::SeqCst);
    }

    #[inline]
    pub fn invalidate_dcache_line(_mva: u32) {
        fence(Ordering::SeqCst);
    }

    #[inline]
    pub fn drain_write_buffer() {
        fence(Ordering::SeqCst);
    }
}
