//! # Espresso Boot Control
//!
//! Everything Starbuck does to the Espresso once a valid image sits in its
//! slot:
//!
//! * [`ResetSequencer`] holds the Espresso in reset and releases it into its
//!   boot ROM.
//! * [`RaceCoordinator`] releases it and polls the image's entry point until
//!   the boot ROM has decrypted it, then replaces it with an [`EntryStub`]
//!   (or merely reports the change, see [`PatchPolicy`]).
//!
//! The race is a tight busy loop without logging; results are logged once
//! it is over.
//!
//! [`PatchPolicy`]: latte_info::PatchPolicy

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod race;
pub mod reset;
pub mod stub;

pub use race::{ArmedRace, RaceCoordinator, RaceError, RaceOutcome, RaceState, Racing};
pub use reset::ResetSequencer;
pub use stub::EntryStub;
