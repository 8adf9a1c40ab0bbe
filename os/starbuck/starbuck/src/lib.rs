//! # Starbuck Boot Payload
//!
//! The code the launcher's privileged call jumps into. [`run`] performs one
//! complete boot attempt:
//!
//! 1. read the [`BootHandoff`] the launcher left at
//!    [`HANDOFF_ADDR`](latte_info::memory::HANDOFF_ADDR),
//! 2. hash the staged image (for the log only),
//! 3. validate the image and copy it into its slot,
//! 4. release the Espresso and race its boot ROM to the entry point,
//! 5. draw the outcome on the diagnostic console.
//!
//! The bare-metal entry point lives in `main.rs`; everything here runs
//! against any [`Bus`] and is tested on the host.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

use ancast::{AncastError, Slot, validate_and_relocate};
use espresso_boot::{RaceCoordinator, RaceError, RaceOutcome};
use latte_console::{BACKGROUND, Console};
use latte_info::boot::{HANDOFF_LEN, HANDOFF_MAGIC, HANDOFF_VERSION, HANDOFF_WORDS};
use latte_info::memory::{ANCAST_MAX_SIZE, HANDOFF_ADDR, SHA_SCRATCH};
use latte_info::{BootHandoff, PatchPolicy, RaceConfig};
use latte_mmio::{Bus, PhysAddr, PhysRegion};

const _: () = assert!(SHA_SCRATCH.len >= latte_sha::SCRATCH_LEN);

/// Why a boot attempt ended without reaching the entry point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum BootError {
    #[error("bad hand-off magic: {0:08x}")]
    BadHandoff(u32),
    #[error("unsupported hand-off version: {0:08x}")]
    HandoffVersion(u32),
    #[error("unknown ancast slot: {0:08x}")]
    UnknownSlot(u32),
    #[error(transparent)]
    Image(#[from] AncastError),
    #[error(transparent)]
    Race(#[from] RaceError),
}

impl BootError {
    /// Reason text and value for the diagnostic console.
    #[must_use]
    pub const fn diagnostic(&self) -> (&'static str, u32) {
        match self {
            Self::BadHandoff(v) => ("bad hand-off magic: ", *v),
            Self::HandoffVersion(v) => ("unsupported hand-off version: ", *v),
            Self::UnknownSlot(v) => ("unknown ancast slot: ", *v),
            Self::Image(e) => e.diagnostic(),
            Self::Race(e) => e.diagnostic(),
        }
    }
}

/// Reason text and value drawn for a won race.
#[must_use]
pub const fn outcome_diagnostic(outcome: &RaceOutcome) -> (&'static str, u32) {
    match *outcome {
        RaceOutcome::Patched { elapsed, .. } => ("ppc race: patched ", elapsed),
        RaceOutcome::Detected { elapsed, .. } => ("ppc race: detected ", elapsed),
    }
}

/// Read and check the record at `HANDOFF_ADDR`.
///
/// The launcher's writes may sit in this core's cache or behind it, so the
/// record is cleaned before it is dropped and re-read.
///
/// # Errors
/// [`BootError::BadHandoff`] or [`BootError::HandoffVersion`].
pub fn read_handoff<B: Bus + ?Sized>(bus: &B) -> Result<BootHandoff, BootError> {
    let region = PhysRegion::new(HANDOFF_ADDR, HANDOFF_LEN);
    let fence = bus.fence();
    fence.publish(region);
    fence.observe(region);

    let mut words = [0; HANDOFF_WORDS];
    for (word, addr) in words.iter_mut().zip(region.words()) {
        *word = bus.read32(addr);
    }

    let handoff = BootHandoff::from_words(words);
    if handoff.magic != HANDOFF_MAGIC {
        return Err(BootError::BadHandoff(handoff.magic));
    }
    if handoff.version != HANDOFF_VERSION {
        return Err(BootError::HandoffVersion(handoff.version));
    }
    Ok(handoff)
}

/// Run one boot attempt and draw its outcome on `console`.
///
/// The hand-off record may ask for detection only; that overrides the
/// policy in `config`.
///
/// # Errors
/// See [`BootError`]. The error's diagnostic is already on screen.
pub fn run<B: Bus + ?Sized>(
    bus: &B,
    console: &mut Console<'_>,
    config: RaceConfig,
) -> Result<RaceOutcome, BootError> {
    console.fill(BACKGROUND);

    let result = boot(bus, config);
    let (reason, value) = match &result {
        Ok(outcome) => outcome_diagnostic(outcome),
        Err(e) => e.diagnostic(),
    };
    console.fail_with_hex(reason, value);

    if let Err(e) = &result {
        log::error!("boot failed: {e}");
    }
    result
}

fn boot<B: Bus + ?Sized>(bus: &B, mut config: RaceConfig) -> Result<RaceOutcome, BootError> {
    let handoff = read_handoff(bus)?;
    let slot_base = PhysAddr::new(handoff.slot_base);
    let slot = Slot::from_base(slot_base).ok_or(BootError::UnknownSlot(handoff.slot_base))?;
    let image = PhysAddr::new(handoff.image_addr);
    log::info!(
        "hand-off: {:#x} byte image at {image} for the {} slot",
        handoff.image_len,
        slot.name()
    );

    log_image_digest(bus, image, handoff.image_len);

    let relocated = validate_and_relocate(bus, image, slot)?;

    if handoff.detect_only != 0 {
        config = config.with_patch_policy(PatchPolicy::DetectOnly);
    }
    let outcome = RaceCoordinator::new(bus, config)
        .arm(relocated.entry(), PhysAddr::new(handoff.redirect))
        .run()?;
    Ok(outcome)
}

fn log_image_digest<B: Bus + ?Sized>(bus: &B, image: PhysAddr, len: u32) {
    let region = PhysRegion::new(image, len.min(ANCAST_MAX_SIZE));
    match latte_sha::sha1_region(bus, region, SHA_SCRATCH.base) {
        Ok(digest) => log::info!("staged image sha1 {digest}"),
        Err(e) => log::warn!("could not hash the staged image: {e}"),
    }
}
