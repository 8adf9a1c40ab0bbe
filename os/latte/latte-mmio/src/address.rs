use core::fmt;
use core::ops::{Add, AddAssign};

/// Size of a Starbuck (ARM926) data cache line in bytes.
pub const CACHE_LINE: u32 = 32;

/// Physical window holding the Latte hardware registers.
///
/// Accesses inside this window are never cached.
pub const HW_REGISTER_WINDOW: core::ops::Range<u32> = 0x0d00_0000..0x0e00_0000;

/// Physical address as seen from the Starbuck core.
///
/// Starbuck runs with the MMU mapping physical memory 1:1, so this is also
/// the address the code dereferences.
///
/// ### Examples
/// ```rust
/// # use latte_mmio::PhysAddr;
/// let pa = PhysAddr::new(0x0800_0104);
/// assert_eq!(pa.align_down(32).as_u32(), 0x0800_0100);
/// assert_eq!((pa + 4).as_u32(), 0x0800_0108);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysAddr(u32);

impl PhysAddr {
    #[inline]
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn as_ptr<T>(self) -> *mut T {
        self.0 as usize as *mut T
    }

    #[inline]
    #[must_use]
    pub const fn is_aligned(self, align: u32) -> bool {
        self.0 & (align - 1) == 0
    }

    /// Round down to `align`, which must be a power of two.
    #[inline]
    #[must_use]
    pub const fn align_down(self, align: u32) -> Self {
        Self(self.0 & !(align - 1))
    }

    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: u32) -> Option<Self> {
        match self.0.checked_add(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_register(self) -> bool {
        self.0 >= HW_REGISTER_WINDOW.start && self.0 < HW_REGISTER_WINDOW.end
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PA(0x{:08X})", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl From<u32> for PhysAddr {
    #[inline]
    fn from(v: u32) -> Self {
        Self::new(v)
    }
}

impl Add<u32> for PhysAddr {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u32) -> Self::Output {
        Self(self.0.wrapping_add(rhs))
    }
}

impl AddAssign<u32> for PhysAddr {
    #[inline]
    fn add_assign(&mut self, rhs: u32) {
        self.0 = self.0.wrapping_add(rhs);
    }
}

/// A byte range in physical memory.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PhysRegion {
    pub base: PhysAddr,
    pub len: u32,
}

impl PhysRegion {
    #[inline]
    #[must_use]
    pub const fn new(base: PhysAddr, len: u32) -> Self {
        Self { base, len }
    }

    /// Exclusive end address, saturating at the top of the address space.
    #[inline]
    #[must_use]
    pub const fn end(self) -> u32 {
        self.base.as_u32().saturating_add(self.len)
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, addr: PhysAddr) -> bool {
        addr.as_u32() >= self.base.as_u32() && addr.as_u32() < self.end()
    }

    #[inline]
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.base.as_u32() < other.end() && other.base.as_u32() < self.end()
    }

    /// Widen the region to whole cache lines.
    ///
    /// ```rust
    /// # use latte_mmio::{PhysAddr, PhysRegion};
    /// let r = PhysRegion::new(PhysAddr::new(0x1004), 0x20).cache_aligned();
    /// assert_eq!(r, PhysRegion::new(PhysAddr::new(0x1000), 0x40));
    /// ```
    #[must_use]
    pub const fn cache_aligned(self) -> Self {
        let start = self.base.align_down(CACHE_LINE).as_u32();
        let end = self.end();
        let end = match end.checked_add(CACHE_LINE - 1) {
            Some(e) => e & !(CACHE_LINE - 1),
            None => u32::MAX & !(CACHE_LINE - 1),
        };
        Self {
            base: PhysAddr::new(start),
            len: end - start,
        }
    }

    /// Iterate over the word-aligned addresses covering the region.
    pub fn words(self) -> impl Iterator<Item = PhysAddr> {
        let start = self.base.align_down(4).as_u32();
        let end = self.end();
        (start..end).step_by(4).map(PhysAddr::new)
    }

    /// Iterate over the cache line base addresses covering the region.
    pub fn lines(self) -> impl Iterator<Item = PhysAddr> {
        let r = self.cache_aligned();
        (r.base.as_u32()..r.end())
            .step_by(CACHE_LINE as usize)
            .map(PhysAddr::new)
    }
}

impl fmt::Display for PhysRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..0x{:08X})", self.base, self.end())
    }
}
