use crate::slot::Slot;
use latte_mmio::PhysAddr;

/// Why an image was refused. Nothing has been written when one of these is
/// returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum AncastError {
    #[error("invalid ancast magic: {0:08x}")]
    InvalidMagic(u32),
    #[error("not a PPC ancast image: {0:08x}")]
    WrongImageType(u32),
    #[error("not a {name} ancast image: {device_id:08x}", name = .slot.name())]
    WrongDevice { slot: Slot, device_id: u32 },
    #[error("ancast image too big: {0:08x}")]
    ImageTooLarge(u32),
    #[error("misaligned ancast image: {:08x}", .0.as_u32())]
    Misaligned(PhysAddr),
}

impl AncastError {
    /// Reason text and offending value, as drawn on the diagnostic console.
    #[must_use]
    pub const fn diagnostic(&self) -> (&'static str, u32) {
        match *self {
            Self::InvalidMagic(v) => ("invalid ancast magic: ", v),
            Self::WrongImageType(v) => ("not a PPC ancast image: ", v),
            Self::WrongDevice {
                slot: Slot::WiiU,
                device_id,
            } => ("not a Wii U ancast image: ", device_id),
            Self::WrongDevice {
                slot: Slot::VWii,
                device_id,
            } => ("not a vWii ancast image: ", device_id),
            Self::ImageTooLarge(v) => ("ancast image too big: ", v),
            Self::Misaligned(addr) => ("misaligned ancast image: ", addr.as_u32()),
        }
    }
}
