//! # Free-running timer
//!
//! `LT_TIMER` counts up at roughly 1.898 MHz and wraps at `u32::MAX`. It is
//! the only time base available before anything else is initialized; all
//! waits in the boot code are busy polls against it.

use latte_mmio::{Mmio, PhysAddr};

/// Free-running counter.
pub const LT_TIMER: PhysAddr = PhysAddr::new(0x0d80_0010);

/// Convert microseconds to `LT_TIMER` ticks, rounding up by one tick.
///
/// ```rust
/// # use latte_registers::timer::usec_to_ticks;
/// assert_eq!(usec_to_ticks(0), 1);
/// assert_eq!(usec_to_ticks(100), 191);
/// ```
#[inline]
#[must_use]
pub const fn usec_to_ticks(usec: u32) -> u32 {
    1 + usec.saturating_mul(19) / 10
}

/// Read-only view of `LT_TIMER`.
pub struct Timer<'a, B: Mmio + ?Sized> {
    bus: &'a B,
}

impl<'a, B: Mmio + ?Sized> Timer<'a, B> {
    #[inline]
    #[must_use]
    pub const fn new(bus: &'a B) -> Self {
        Self { bus }
    }

    #[inline]
    #[must_use]
    pub fn now(&self) -> u32 {
        self.bus.read32(LT_TIMER)
    }

    /// Ticks elapsed since `start`, correct across one wrap of the counter.
    #[inline]
    #[must_use]
    pub fn elapsed_since(&self, start: u32) -> u32 {
        self.now().wrapping_sub(start)
    }

    /// Busy-wait for at least `usec` microseconds.
    pub fn udelay(&self, usec: u32) {
        let ticks = usec_to_ticks(usec);
        let start = self.now();
        while self.elapsed_since(start) < ticks {
            core::hint::spin_loop();
        }
    }
}
