//! # Raw framebuffer

use latte_mmio::PhysAddr;

/// A 32-bit-per-pixel framebuffer with a fixed row stride.
pub struct Framebuffer<'a> {
    pixels: &'a mut [u32],
    stride: usize,
}

impl<'a> Framebuffer<'a> {
    /// Wrap `pixels`; rows are `stride` pixels apart.
    #[must_use]
    pub const fn new(pixels: &'a mut [u32], stride: usize) -> Self {
        Self { pixels, stride }
    }

    /// The framebuffer at `base` in physical memory.
    ///
    /// # Safety
    /// `base` must be mapped 1:1, hold `stride * height` pixels and must not
    /// be accessed through any other reference for the rest of the program.
    #[allow(unsafe_code)]
    #[must_use]
    pub unsafe fn from_phys(base: PhysAddr, stride: u32, height: u32) -> Framebuffer<'static> {
        let stride = usize::try_from(stride).unwrap_or_default();
        let len = stride * usize::try_from(height).unwrap_or_default();
        // SAFETY: the caller guarantees the range is mapped and exclusively ours.
        let pixels = unsafe { core::slice::from_raw_parts_mut(base.as_ptr::<u32>(), len) };
        Framebuffer::new(pixels, stride)
    }

    #[inline]
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.pixels.len() / self.stride
        }
    }

    #[inline]
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set one pixel. Coordinates outside the buffer are ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Split into the rows above `row` and the rows from `row` on.
    ///
    /// `row` is clamped to the height, so one side may be empty.
    #[must_use]
    pub fn split_at_row(self, row: usize) -> (Self, Self) {
        let mid = row
            .min(self.height())
            .saturating_mul(self.stride)
            .min(self.pixels.len());
        let (top, bottom) = self.pixels.split_at_mut(mid);
        (Self::new(top, self.stride), Self::new(bottom, self.stride))
    }

    #[must_use]
    pub const fn pixels(&self) -> &[u32] {
        &*self.pixels
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.stride {
            return None;
        }
        let i = y.checked_mul(self.stride)?.checked_add(x)?;
        (i < self.pixels.len()).then_some(i)
    }
}
