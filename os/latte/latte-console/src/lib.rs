//! # Starbuck Diagnostic Console
//!
//! A deliberately primitive text surface for the boot path, where nothing
//! else can report errors:
//!
//! * [`Console`] draws 8×8 glyphs from a built-in [`font`] into a raw
//!   [`Framebuffer`], plus fixed-width hex values for failure codes.
//! * [`ConsoleLogger`] is the `log` backend on Starbuck.
//! * [`MemConsole`] draws text the other processor leaves in shared memory.
//!
//! ```rust
//! # use latte_console::{Console, Framebuffer};
//! let mut pixels = vec![0xffff_00ff; 896 * 504];
//! let mut console = Console::new(Framebuffer::new(&mut pixels, 896));
//! console.fail_with_hex("invalid ancast magic: ", 0xdead_beef);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod console;
pub mod font;
mod framebuffer;
mod logger;
pub mod memconsole;

pub use console::{BACKGROUND, Console, Cursor, FOREGROUND};
pub use framebuffer::Framebuffer;
pub use logger::ConsoleLogger;
pub use memconsole::{Drain, MemConsole};

use latte_info::memory::{FRAMEBUFFER_BASE, FRAMEBUFFER_HEIGHT, FRAMEBUFFER_STRIDE, MEM_CONSOLE};
use latte_mmio::Bus;

/// The Starbuck framebuffer.
///
/// # Safety
/// See [`Framebuffer::from_phys`]; call at most once.
#[allow(unsafe_code)]
#[must_use]
pub unsafe fn starbuck_framebuffer() -> Framebuffer<'static> {
    // SAFETY: forwarded to the caller.
    unsafe { Framebuffer::from_phys(FRAMEBUFFER_BASE, FRAMEBUFFER_STRIDE, FRAMEBUFFER_HEIGHT) }
}

/// The memory console at its fixed location.
#[must_use]
pub const fn starbuck_mem_console<B: Bus + ?Sized>(bus: &B) -> MemConsole<'_, B> {
    MemConsole::new(bus, MEM_CONSOLE)
}
