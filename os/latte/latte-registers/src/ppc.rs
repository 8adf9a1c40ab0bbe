//! # Espresso reset and bus configuration registers
//!
//! The bit assignments below are only partially documented. They are used
//! exactly as the known-good reset sequence uses them.

use latte_mmio::PhysAddr;

/// Legacy-compatible reset control.
pub const LT_RESETS_COMPAT: PhysAddr = PhysAddr::new(0x0d80_0194);

/// Legacy-compatible memory controller state.
pub const LT_COMPAT_MEMCTRL_STATE: PhysAddr = PhysAddr::new(0x0d80_05b0);

/// 60x bus (Espresso front-side bus) configuration.
pub const LT_60XE_CFG: PhysAddr = PhysAddr::new(0x0d80_0640);

/// `LT_RESETS_COMPAT`: core reset lines of the Espresso. Cleared = held in reset.
pub const RESETS_COMPAT_PPC_CORE: u32 = 0x30;

/// `LT_RESETS_COMPAT`: Espresso power/clock enable.
pub const RESETS_COMPAT_PPC_POWER: u32 = 0x200;

/// Bits cleared to hold the Espresso.
pub const RESETS_COMPAT_PPC_HOLD: u32 = RESETS_COMPAT_PPC_CORE | RESETS_COMPAT_PPC_POWER;

/// `LT_COMPAT_MEMCTRL_STATE`: bits cleared before the memory controller is reconfigured.
pub const MEMCTRL_STATE_CLEAR: u32 = 0xFFE0_022F;

/// `LT_COMPAT_MEMCTRL_STATE`: configuration set for the Espresso boot.
pub const MEMCTRL_STATE_PPC_BOOT: u32 = 0x0810_0000;

/// `LT_COMPAT_MEMCTRL_STATE`: cleared once the Espresso is powered.
pub const MEMCTRL_STATE_HOLD: u32 = 0x20;

/// `LT_60XE_CFG`: cleared first.
pub const CFG_60XE_DISABLE: u32 = 0x8;

/// `LT_60XE_CFG`: analog configuration field.
pub const CFG_60XE_ANALOG_MASK: u32 = 0x001C_0000;

/// `LT_60XE_CFG`: analog configuration value within [`CFG_60XE_ANALOG_MASK`].
pub const CFG_60XE_ANALOG: u32 = 0x0002_0000;

/// `LT_60XE_CFG`: bus enable bits.
pub const CFG_60XE_ENABLE: u32 = 0xC000;

const _: () = {
    assert!(RESETS_COMPAT_PPC_HOLD == 0x230);
    assert!(CFG_60XE_ANALOG & !CFG_60XE_ANALOG_MASK == 0);
};
