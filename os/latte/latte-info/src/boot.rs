//! # Launcher hand-off
//!
//! The launcher runs on the Espresso and can only reach Starbuck memory one
//! word at a time through the privileged channel. It describes what it staged
//! in a small record at [`HANDOFF_ADDR`](crate::memory::HANDOFF_ADDR) before
//! jumping into the Starbuck payload.

/// `"WULL"`: Wii U Linux Launcher.
pub const HANDOFF_MAGIC: u32 = 0x5755_4C4C;

/// Current layout of [`BootHandoff`].
pub const HANDOFF_VERSION: u32 = 1;

/// Number of 32-bit words in a serialized [`BootHandoff`].
pub const HANDOFF_WORDS: usize = 7;

/// Size of a serialized [`BootHandoff`] in bytes.
#[allow(clippy::cast_possible_truncation)]
pub const HANDOFF_LEN: u32 = (HANDOFF_WORDS * 4) as u32;

/// Launcher-to-payload record. Serialized as consecutive 32-bit words in
/// field order.
#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BootHandoff {
    /// [`HANDOFF_MAGIC`].
    pub magic: u32,
    /// [`HANDOFF_VERSION`].
    pub version: u32,
    /// Physical address of the staged ancast image.
    pub image_addr: u32,
    /// Length of the staged image in bytes.
    pub image_len: u32,
    /// Destination slot base address.
    pub slot_base: u32,
    /// Where the Espresso should be sent once the race is won.
    pub redirect: u32,
    /// Non-zero to only detect the entry change, without patching it.
    pub detect_only: u32,
}

impl BootHandoff {
    #[must_use]
    pub const fn new(image_addr: u32, image_len: u32, slot_base: u32, redirect: u32) -> Self {
        Self {
            magic: HANDOFF_MAGIC,
            version: HANDOFF_VERSION,
            image_addr,
            image_len,
            slot_base,
            redirect,
            detect_only: 0,
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.magic == HANDOFF_MAGIC && self.version == HANDOFF_VERSION
    }

    #[must_use]
    pub const fn to_words(&self) -> [u32; HANDOFF_WORDS] {
        [
            self.magic,
            self.version,
            self.image_addr,
            self.image_len,
            self.slot_base,
            self.redirect,
            self.detect_only,
        ]
    }

    #[must_use]
    pub const fn from_words(w: [u32; HANDOFF_WORDS]) -> Self {
        Self {
            magic: w[0],
            version: w[1],
            image_addr: w[2],
            image_len: w[3],
            slot_base: w[4],
            redirect: w[5],
            detect_only: w[6],
        }
    }
}

const _: () = {
    assert!(size_of::<BootHandoff>() == HANDOFF_WORDS * 4);
};
