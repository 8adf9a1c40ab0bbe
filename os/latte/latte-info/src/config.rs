//! # Race tunables

use crate::memory::{BOOT_SCRATCH, BOOT_STATUS};
use latte_mmio::{PhysAddr, PhysRegion};

/// Default race ceiling in `LT_TIMER` ticks (roughly 52 seconds).
pub const RACE_TIMEOUT_TICKS: u32 = 100_000_000;

/// What to do when the Espresso boot ROM has replaced the first instruction.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PatchPolicy {
    /// Overwrite the entry with the redirect stub.
    #[default]
    Redirect,
    /// Only report that the entry changed and leave the image alone.
    DetectOnly,
}

/// Parameters of one boot race.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RaceConfig {
    /// Give up after this many `LT_TIMER` ticks.
    pub timeout_ticks: u32,
    pub patch_policy: PatchPolicy,
    /// Region zeroed before the race.
    pub scratch: PhysRegion,
    /// Status word polled during the race.
    pub status: PhysAddr,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            timeout_ticks: RACE_TIMEOUT_TICKS,
            patch_policy: PatchPolicy::default(),
            scratch: BOOT_SCRATCH,
            status: BOOT_STATUS,
        }
    }
}

impl RaceConfig {
    #[must_use]
    pub const fn with_timeout_ticks(mut self, ticks: u32) -> Self {
        self.timeout_ticks = ticks;
        self
    }

    #[must_use]
    pub const fn with_patch_policy(mut self, policy: PatchPolicy) -> Self {
        self.patch_policy = policy;
        self
    }
}
