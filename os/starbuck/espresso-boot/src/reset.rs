//! # Espresso reset sequencing

use latte_mmio::Mmio;
use latte_registers::ppc::{
    CFG_60XE_ANALOG, CFG_60XE_ANALOG_MASK, CFG_60XE_DISABLE, CFG_60XE_ENABLE,
    LT_60XE_CFG, LT_COMPAT_MEMCTRL_STATE, LT_RESETS_COMPAT, MEMCTRL_STATE_CLEAR,
    MEMCTRL_STATE_HOLD, MEMCTRL_STATE_PPC_BOOT, RESETS_COMPAT_PPC_CORE,
    RESETS_COMPAT_PPC_HOLD, RESETS_COMPAT_PPC_POWER,
};
use latte_registers::timer::Timer;

/// Time the Espresso is held before it is reconfigured.
pub const HANG_USEC: u32 = 100;

/// Drives the Espresso's reset lines.
///
/// There is no status register to confirm either step took effect.
pub struct ResetSequencer<'a, B: Mmio + ?Sized> {
    bus: &'a B,
}

impl<'a, B: Mmio + ?Sized> ResetSequencer<'a, B> {
    #[must_use]
    pub const fn new(bus: &'a B) -> Self {
        Self { bus }
    }

    /// Hold the Espresso in reset.
    pub fn hang(&self) {
        self.bus.clear32(LT_RESETS_COMPAT, RESETS_COMPAT_PPC_HOLD);
        Timer::new(self.bus).udelay(HANG_USEC);
    }

    /// Reset the Espresso and let its boot ROM run.
    ///
    /// Once this returns the boot ROM is executing; it cannot be stopped
    /// short of another [`hang`](Self::hang).
    pub fn reset_and_release(&self) {
        self.hang();

        let bus = self.bus;
        bus.mask32(LT_COMPAT_MEMCTRL_STATE, MEMCTRL_STATE_CLEAR, MEMCTRL_STATE_PPC_BOOT);

        bus.clear32(LT_60XE_CFG, CFG_60XE_DISABLE);
        bus.mask32(LT_60XE_CFG, CFG_60XE_ANALOG_MASK, CFG_60XE_ANALOG);
        bus.set32(LT_60XE_CFG, CFG_60XE_ENABLE);

        bus.set32(LT_RESETS_COMPAT, RESETS_COMPAT_PPC_POWER);
        bus.clear32(LT_COMPAT_MEMCTRL_STATE, MEMCTRL_STATE_HOLD);

        bus.set32(LT_RESETS_COMPAT, RESETS_COMPAT_PPC_CORE);
    }
}
