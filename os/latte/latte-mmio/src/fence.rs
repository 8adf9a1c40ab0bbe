//! # Coherency fences
//!
//! Starbuck and Espresso do not share a cache domain. Every hand-off of
//! memory between the two goes through one of two fences:
//!
//! | Fence | Cache operation | Use |
//! |-------|-----------------|-----|
//! | [`Fence::Publish`] | flush (clean) | after writing data the other side will read |
//! | [`Fence::Observe`] | invalidate | before reading data the other side wrote |
//!
//! ```text
//!  Starbuck                          memory                       Espresso
//!  write32 ─► D$ (dirty) ─publish─► RAM ◄──────── fetch/read ─────────
//!  read32  ◄─ D$ ◄──observe── RAM ◄──────── store ─────────────────────
//! ```

use crate::access::CacheControl;
use crate::address::PhysRegion;

/// Direction of a cross-processor hand-off.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Fence {
    /// Make local writes visible to the other processor.
    Publish,
    /// Make the other processor's writes visible to local reads.
    Observe,
}

/// Applies [`Fence`]s over a cache.
pub struct CoherencyFence<'a, C: CacheControl + ?Sized> {
    cache: &'a C,
}

impl<'a, C: CacheControl + ?Sized> CoherencyFence<'a, C> {
    #[inline]
    #[must_use]
    pub const fn new(cache: &'a C) -> Self {
        Self { cache }
    }

    /// Apply `fence` to the cache lines covering `region`.
    pub fn apply(&self, fence: Fence, region: PhysRegion) {
        let region = region.cache_aligned();
        match fence {
            Fence::Publish => self.cache.flush(region),
            Fence::Observe => self.cache.invalidate(region),
        }
    }

    #[inline]
    pub fn publish(&self, region: PhysRegion) {
        self.apply(Fence::Publish, region);
    }

    #[inline]
    pub fn observe(&self, region: PhysRegion) {
        self.apply(Fence::Observe, region);
    }
}
