//! # Latte SHA-1 Engine
//!
//! The engine hashes whole 64-byte blocks straight out of physical memory and
//! keeps the running chaining value in `SHA_H0..4`. It has no completion
//! interrupt wired up for us, so every step is followed by a fixed settle
//! delay and a bounded poll of `SHA_CTRL`.
//!
//! The digest is a debugging aid for the image transfer; nothing in the boot
//! decision depends on it.
//!
//! ```rust,ignore
//! let engine = ShaEngine::new(&bus);
//! engine.init();
//! engine.update(image, len & !63)?;
//! bus.copy32(scratch, image + (len & !63), len & 63);
//! let digest = engine.finish(u64::from(len), scratch)?;
//! log::info!("image sha1 {digest}");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

use core::fmt;
use latte_mmio::{Bus, PhysAddr, PhysRegion};
use latte_registers::MmioRegister;
use latte_registers::sha::{SHA_CTRL, SHA_H_COUNT, SHA_SRC, ShaCtrl, sha_h};
use latte_registers::timer::{Timer, usec_to_ticks};

/// SHA-1 block size.
pub const BLOCK_SIZE: u32 = 64;

/// Largest transfer per command: the block count field is 10 bits wide.
pub const MAX_CHUNK: u32 = 1024 * BLOCK_SIZE;

/// Size of the scratch area [`ShaEngine::finish`] needs.
pub const SCRATCH_LEN: u32 = 2 * BLOCK_SIZE;

/// Settle delay after each register step.
pub const SETTLE_USEC: u32 = 100;

/// Give up on a transfer that has not completed after this long.
const POLL_LIMIT_TICKS: u32 = usec_to_ticks(1_000_000);

/// SHA-1 initial chaining value.
pub const SHA1_IV: [u32; 5] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476, 0xc3d2_e1f0];

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ShaError {
    #[error("length {0:#x} is not a multiple of the 64-byte block size")]
    Unaligned(u32),
    #[error("buffer at {0} is not word aligned")]
    Misaligned(PhysAddr),
    #[error("SHA engine reported an error for the transfer at {0}")]
    Hardware(PhysAddr),
    #[error("SHA engine did not complete the transfer at {0}")]
    Timeout(PhysAddr),
}

/// A SHA-1 digest as five big-endian words.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Sha1Digest(pub [u32; 5]);

impl fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for w in self.0 {
            write!(f, "{w:08x}")?;
        }
        Ok(())
    }
}

/// Driver for the SHA-1 engine.
pub struct ShaEngine<'a, B: Bus + ?Sized> {
    bus: &'a B,
    timer: Timer<'a, B>,
}

impl<'a, B: Bus + ?Sized> ShaEngine<'a, B> {
    #[must_use]
    pub const fn new(bus: &'a B) -> Self {
        Self {
            bus,
            timer: Timer::new(bus),
        }
    }

    /// Reset the engine and load the SHA-1 initial chaining value.
    pub fn init(&self) {
        ShaCtrl::new().store(self.bus);
        for (n, iv) in (0..SHA_H_COUNT).zip(SHA1_IV) {
            self.bus.write32(sha_h(n), iv);
            self.timer.udelay(SETTLE_USEC);
        }
    }

    /// Hash `len` bytes at `src`. `len` must be a multiple of [`BLOCK_SIZE`].
    ///
    /// # Errors
    /// Fails on a misaligned length or address, or when the engine reports an
    /// error or stalls on any chunk.
    pub fn update(&self, src: PhysAddr, len: u32) -> Result<(), ShaError> {
        if !len.is_multiple_of(BLOCK_SIZE) {
            return Err(ShaError::Unaligned(len));
        }
        if !src.is_aligned(4) {
            return Err(ShaError::Misaligned(src));
        }
        if len == 0 {
            return Ok(());
        }

        // The engine reads memory behind the data cache.
        self.bus.fence().publish(PhysRegion::new(src, len));

        let mut addr = src;
        let mut remaining = len;
        while remaining > 0 {
            let chunk = remaining.min(MAX_CHUNK);
            self.transfer(addr, chunk / BLOCK_SIZE)?;
            addr += chunk;
            remaining -= chunk;
        }
        Ok(())
    }

    /// Pad and hash the final block(s), then return the digest.
    ///
    /// `scratch` is a word-aligned area of [`SCRATCH_LEN`] bytes whose first
    /// `total_len % 64` bytes hold the tail that was not passed to
    /// [`update`](Self::update). `total_len` is the length of the whole
    /// message in bytes.
    ///
    /// # Errors
    /// See [`update`](Self::update).
    #[allow(clippy::cast_possible_truncation)]
    pub fn finish(&self, total_len: u64, scratch: PhysAddr) -> Result<Sha1Digest, ShaError> {
        if !scratch.is_aligned(4) {
            return Err(ShaError::Misaligned(scratch));
        }

        let tail = (total_len % u64::from(BLOCK_SIZE)) as u32;
        let len = if tail < BLOCK_SIZE - 8 {
            BLOCK_SIZE
        } else {
            SCRATCH_LEN
        };

        self.bus.write8(scratch + tail, 0x80);
        for off in tail + 1..len - 8 {
            self.bus.write8(scratch + off, 0);
        }

        let bits = total_len.wrapping_mul(8);
        self.bus.write32(scratch + len - 8, (bits >> 32) as u32);
        self.bus.write32(scratch + len - 4, bits as u32);

        self.update(scratch, len)?;
        Ok(self.digest())
    }

    /// The current chaining value.
    #[must_use]
    pub fn digest(&self) -> Sha1Digest {
        let mut h = [0; 5];
        for (n, w) in (0..SHA_H_COUNT).zip(h.iter_mut()) {
            *w = self.bus.read32(sha_h(n));
        }
        Sha1Digest(h)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn transfer(&self, addr: PhysAddr, blocks: u32) -> Result<(), ShaError> {
        self.bus.write32(SHA_SRC, addr.as_u32());
        ShaCtrl::new()
            .with_exec(true)
            .with_blocks_minus_one((blocks - 1) as u16)
            .store(self.bus);
        self.timer.udelay(SETTLE_USEC);

        let start = self.timer.now();
        loop {
            let ctrl = ShaCtrl::load(self.bus);
            if !ctrl.exec() {
                if ctrl.err() {
                    log::error!("SHA transfer of {blocks} blocks at {addr} failed");
                    return Err(ShaError::Hardware(addr));
                }
                return Ok(());
            }
            if self.timer.elapsed_since(start) > POLL_LIMIT_TICKS {
                log::error!("SHA transfer of {blocks} blocks at {addr} stalled");
                return Err(ShaError::Timeout(addr));
            }
            core::hint::spin_loop();
        }
    }
}

/// Hash an arbitrary region, using `scratch` ([`SCRATCH_LEN`] bytes) for the tail.
///
/// # Errors
/// See [`ShaEngine::update`].
pub fn sha1_region<B: Bus + ?Sized>(
    bus: &B,
    region: PhysRegion,
    scratch: PhysAddr,
) -> Result<Sha1Digest, ShaError> {
    let engine = ShaEngine::new(bus);
    engine.init();

    let full = region.len & !(BLOCK_SIZE - 1);
    engine.update(region.base, full)?;

    let tail = region.len - full;
    if tail > 0 {
        bus.copy32(scratch, region.base + full, tail);
    }
    engine.finish(u64::from(region.len), scratch)
}
