use crate::address::{PhysAddr, PhysRegion};
use crate::fence::CoherencyFence;

/// Volatile 32-bit access to physical memory and hardware registers.
///
/// Implementations must never reorder, merge, cache or elide accesses made
/// through this trait. All Latte registers are 32 bits wide and word aligned;
/// the byte helpers are built on top of word accesses.
pub trait Mmio {
    fn read32(&self, addr: PhysAddr) -> u32;

    fn write32(&self, addr: PhysAddr, value: u32);

    /// Set the bits in `mask`.
    #[inline]
    fn set32(&self, addr: PhysAddr, mask: u32) {
        let v = self.read32(addr);
        self.write32(addr, v | mask);
    }

    /// Clear the bits in `mask`.
    #[inline]
    fn clear32(&self, addr: PhysAddr, mask: u32) {
        let v = self.read32(addr);
        self.write32(addr, v & !mask);
    }

    /// Clear the bits in `clear`, then set the bits in `set`, as one read and one write.
    #[inline]
    fn mask32(&self, addr: PhysAddr, clear: u32, set: u32) {
        let v = self.read32(addr);
        self.write32(addr, (v & !clear) | set);
    }

    /// Read a single byte.
    ///
    /// Starbuck runs big-endian: byte lane 0 is the most significant byte of the word.
    #[inline]
    fn read8(&self, addr: PhysAddr) -> u8 {
        let lane = (addr.as_u32() & 3) as usize;
        self.read32(addr.align_down(4)).to_be_bytes()[lane]
    }

    /// Write a single byte through a read-modify-write of the containing word.
    #[inline]
    fn write8(&self, addr: PhysAddr, value: u8) {
        let shift = byte_lane_shift(addr);
        self.mask32(addr.align_down(4), 0xff << shift, u32::from(value) << shift);
    }

    /// Store `value` into every word of `region`.
    fn fill32(&self, region: PhysRegion, value: u32) {
        for addr in region.words() {
            self.write32(addr, value);
        }
    }

    /// Copy `len` bytes word by word, rounding `len` up to a whole word.
    ///
    /// The ranges must not overlap.
    fn copy32(&self, dst: PhysAddr, src: PhysAddr, len: u32) {
        let words = len.div_ceil(4);
        for i in 0..words {
            let off = i * 4;
            self.write32(dst + off, self.read32(src + off));
        }
    }
}

#[inline]
const fn byte_lane_shift(addr: PhysAddr) -> u32 {
    24 - 8 * (addr.as_u32() & 3)
}

/// Data cache maintenance by address range.
///
/// Starbuck's data cache is not coherent with the Espresso cores or with the
/// DMA engines of the Latte chipset.
pub trait CacheControl {
    /// Write back any dirty lines covering `region` to memory.
    fn flush(&self, region: PhysRegion);

    /// Discard any cached copy of `region`, so that the next read observes memory.
    ///
    /// Dirty data inside the region is lost.
    fn invalidate(&self, region: PhysRegion);
}

/// The complete hardware surface the boot code runs against.
pub trait Bus: Mmio + CacheControl {
    /// The coherency fence over this bus' data cache.
    #[inline]
    fn fence(&self) -> CoherencyFence<'_, Self> {
        CoherencyFence::new(self)
    }
}

impl<T> Bus for T where T: Mmio + CacheControl + ?Sized {}
