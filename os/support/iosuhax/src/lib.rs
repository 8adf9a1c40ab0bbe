//! # iosuhax Client
//!
//! `/dev/iosuhax` is a resource manager added to the IOSU by a custom
//! firmware (Mocha). Through it a PowerPC application can read and write
//! Starbuck's physical memory and make the IOSU kernel run code at a
//! physical address, which is how the launcher gets its payload onto
//! Starbuck.
//!
//! The IOS IPC layer itself is abstracted behind [`Ios`].

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod channel;
pub mod request;

pub use channel::{ChannelError, IOSUHAX_PATH, Ios, IosuhaxChannel};
pub use request::{KernelCommand, SvcRequest};
