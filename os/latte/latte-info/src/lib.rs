//! # Launcher Configuration and Hand-off Interface
//!
//! The authoritative source for everything the Espresso-side launcher and the
//! Starbuck payload must agree on:
//!
//! * [`memory`]: fixed physical addresses of the ancast slots, the boot scratch
//!   area, the diagnostic framebuffer and the staging areas the launcher
//!   writes to.
//! * [`config`]: runtime tunables of the boot race ([`RaceConfig`]).
//! * [`boot`]: the [`BootHandoff`] record the launcher leaves for the
//!   payload.
//!
//! ```text
//! Physical layout (as used by the launcher):
//!
//! 0x0000_0000 ┌──────────────────────────┐ MEM1
//!             │ purgatory entry (0x100)  │
//! 0x0070_8000 ├──────────────────────────┤ Starbuck framebuffer
//! 0x0133_0000 ├──────────────────────────┤ vWii ancast slot (2 MiB)
//! 0x016F_FFE0 ├──────────────────────────┤ boot scratch / status word
//! 0x0800_0000 ├──────────────────────────┤ MEM0: Wii U ancast slot (2 MiB)
//! 0x0820_0000 ├──────────────────────────┤ memory console
//! 0x100F_FF00 ├──────────────────────────┤ MEM2: hand-off record
//! 0x1010_0000 ├──────────────────────────┤ Starbuck payload (1 MiB)
//! 0x1020_0000 ├──────────────────────────┤ staged ancast image (2 MiB)
//!             └──────────────────────────┘
//! ```
//!
//! Layout invariants are checked at compile time.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod config;
pub mod memory;

pub use boot::BootHandoff;
pub use config::{PatchPolicy, RaceConfig};
