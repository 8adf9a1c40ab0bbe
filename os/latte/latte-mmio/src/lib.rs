//! # Latte Memory Access
//!
//! Primitive hardware access for code running on Starbuck, the ARM core of
//! the Wii U's Latte chipset:
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`PhysAddr`] / [`PhysRegion`] | Typed physical addresses and byte ranges |
//! | [`Mmio`] | Volatile `read32`/`write32`/`set32`/`clear32`/`mask32` |
//! | [`CacheControl`] | Data cache flush and invalidate by range |
//! | [`CoherencyFence`] | Typed publish/observe hand-off between processors |
//! | [`LatteBus`] | The real hardware |
//! | [`sim::SimLatte`] | A host-side simulation (feature `sim`) |
//!
//! Everything above this crate is written against the [`Bus`] trait, so the
//! same driver code runs on the hardware and under `cargo test`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod access;
mod address;
mod fence;
mod hw;

#[cfg(any(test, feature = "sim"))]
#[allow(clippy::cast_possible_truncation)]
pub mod sim;

pub use access::{Bus, CacheControl, Mmio};
pub use address::{CACHE_LINE, HW_REGISTER_WINDOW, PhysAddr, PhysRegion};
pub use fence::{CoherencyFence, Fence};
pub use hw::LatteBus;
