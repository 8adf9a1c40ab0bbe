//! # Ancast header
//!
//! Only the four fields needed to place the image are read; signatures and
//! the rest of the header are left to the boot ROM.
//!
//! | Offset  | Field          |
//! |---------|----------------|
//! | `+0x00` | magic          |
//! | `+0x20` | image type     |
//! | `+0xa4` | device id      |
//! | `+0xac` | payload size   |

use crate::error::AncastError;
use crate::slot::Slot;
use latte_info::memory::{ANCAST_HEADER_SIZE, ANCAST_MAX_SIZE};
use latte_mmio::{Mmio, PhysAddr};

pub const ANCAST_MAGIC: u32 = 0xefa2_82d9;

/// Image type of Espresso (PPC) images.
pub const ANCAST_TYPE_PPC: u32 = 1;

const OFFSET_MAGIC: u32 = 0x00;
const OFFSET_TYPE: u32 = 0x20;
const OFFSET_DEVICE: u32 = 0xa4;
const OFFSET_SIZE: u32 = 0xac;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AncastHeader {
    pub magic: u32,
    pub image_type: u32,
    pub device_id: u32,
    /// Size of everything after the header.
    pub payload_size: u32,
}

impl AncastHeader {
    /// Read the header fields of the image at `base`.
    #[must_use]
    pub fn read<B: Mmio + ?Sized>(bus: &B, base: PhysAddr) -> Self {
        Self {
            magic: bus.read32(base + OFFSET_MAGIC),
            image_type: bus.read32(base + OFFSET_TYPE),
            device_id: bus.read32(base + OFFSET_DEVICE),
            payload_size: bus.read32(base + OFFSET_SIZE),
        }
    }

    /// Check the header against `slot`, in the order the fields are listed.
    ///
    /// # Errors
    /// The first failed check, carrying the offending field.
    pub const fn validate(&self, slot: Slot) -> Result<(), AncastError> {
        if self.magic != ANCAST_MAGIC {
            return Err(AncastError::InvalidMagic(self.magic));
        }
        if self.image_type != ANCAST_TYPE_PPC {
            return Err(AncastError::WrongImageType(self.image_type));
        }
        if !slot.is_enabled() || self.device_id != slot.device_id() {
            return Err(AncastError::WrongDevice {
                slot,
                device_id: self.device_id,
            });
        }
        if self.image_len().is_none() {
            return Err(AncastError::ImageTooLarge(self.payload_size));
        }
        Ok(())
    }

    /// Header plus payload, if that fits an ancast slot.
    #[must_use]
    pub const fn image_len(&self) -> Option<u32> {
        match self.payload_size.checked_add(ANCAST_HEADER_SIZE) {
            Some(len) if len <= ANCAST_MAX_SIZE => Some(len),
            _ => None,
        }
    }
}
