use crate::error::AncastError;
use crate::header::AncastHeader;
use crate::slot::Slot;
use latte_info::memory::ANCAST_HEADER_SIZE;
use latte_mmio::{Bus, PhysAddr, PhysRegion};

/// An image copied into its slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Relocated {
    pub slot: Slot,
    pub header: AncastHeader,
    /// Bytes copied, header included.
    pub len: u32,
}

impl Relocated {
    #[must_use]
    pub const fn base(&self) -> PhysAddr {
        self.slot.base()
    }

    /// First instruction of the payload, right behind the header.
    #[must_use]
    pub fn entry(&self) -> PhysAddr {
        self.base() + ANCAST_HEADER_SIZE
    }

    #[must_use]
    pub const fn region(&self) -> PhysRegion {
        PhysRegion::new(self.slot.base(), self.len)
    }
}

/// Validate the image at `source` and copy it into `slot`.
///
/// The alternate slot's header is cleared so the boot ROM cannot pick up a
/// stale image from there. Both writes are published before returning.
///
/// # Errors
/// See [`AncastError`]. On error, memory is left untouched.
pub fn validate_and_relocate<B: Bus + ?Sized>(
    bus: &B,
    source: PhysAddr,
    slot: Slot,
) -> Result<Relocated, AncastError> {
    if !source.is_aligned(4) {
        return Err(AncastError::Misaligned(source));
    }

    let fence = bus.fence();
    // The staged image may have been written through this cache (by the
    // IOSU kernel) or behind it; clean before dropping the lines.
    let staged = |len| {
        let region = PhysRegion::new(source, len);
        fence.publish(region);
        fence.observe(region);
    };

    staged(ANCAST_HEADER_SIZE);
    let header = AncastHeader::read(bus, source);
    header.validate(slot)?;
    let len = header
        .image_len()
        .ok_or(AncastError::ImageTooLarge(header.payload_size))?;
    staged(len);

    let alternate = PhysRegion::new(slot.alternate().base(), ANCAST_HEADER_SIZE);
    bus.fill32(alternate, 0);
    fence.publish(alternate);

    let dest = slot.base();
    bus.copy32(dest, source, len);
    fence.publish(PhysRegion::new(dest, len));

    log::info!(
        "relocated {len:#x} byte {} image from {source} to {dest}",
        slot.name()
    );
    Ok(Relocated { slot, header, len })
}
