use latte_info::memory::{VWII_SLOT_BASE, WIIU_SLOT_BASE};
use latte_mmio::PhysAddr;

/// Where the Espresso boot ROM picks up an ancast image.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Slot {
    /// Native Wii U mode, in MEM0.
    WiiU,
    /// Wii compatibility mode, in MEM1.
    VWii,
}

impl Slot {
    #[must_use]
    pub const fn base(self) -> PhysAddr {
        match self {
            Self::WiiU => WIIU_SLOT_BASE,
            Self::VWii => VWII_SLOT_BASE,
        }
    }

    /// The only device id accepted into this slot.
    #[must_use]
    pub const fn device_id(self) -> u32 {
        match self {
            Self::WiiU => 0x11,
            Self::VWii => 0x13,
        }
    }

    /// The other slot, whose header is cleared before a relocation.
    #[must_use]
    pub const fn alternate(self) -> Self {
        match self {
            Self::WiiU => Self::VWii,
            Self::VWii => Self::WiiU,
        }
    }

    /// Booting vWii images is not supported; the slot rejects every image.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::WiiU)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WiiU => "Wii U",
            Self::VWii => "vWii",
        }
    }

    /// The slot starting at `base`, if any.
    #[must_use]
    pub fn from_base(base: PhysAddr) -> Option<Self> {
        [Self::WiiU, Self::VWii]
            .into_iter()
            .find(|slot| slot.base() == base)
    }
}
