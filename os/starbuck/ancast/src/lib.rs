//! # Ancast Image Loader
//!
//! The Espresso boot ROM only starts images wrapped in an "ancast" container
//! placed at a fixed physical address. This crate checks the container
//! header of a staged image against the destination [`Slot`] and copies it
//! there, publishing the result so the boot ROM reads it from memory rather
//! than from Starbuck's data cache.
//!
//! Validation is all-or-nothing: either every check passes and the image is
//! copied, or an [`AncastError`] is returned and no memory is written.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod error;
pub mod header;
mod loader;
mod slot;

pub use error::AncastError;
pub use header::AncastHeader;
pub use loader::{Relocated, validate_and_relocate};
pub use slot::Slot;
