//! # Memory Layout

use latte_mmio::{PhysAddr, PhysRegion};

/// Size of the ancast container header preceding the payload.
pub const ANCAST_HEADER_SIZE: u32 = 0x100;

/// Largest ancast image (header included) either slot can hold.
pub const ANCAST_MAX_SIZE: u32 = 2 << 20; // 2 MiB

/// Destination of native Wii U (Espresso) boot images, in MEM0.
pub const WIIU_SLOT_BASE: PhysAddr = PhysAddr::new(0x0800_0000);

/// Destination of vWii boot images, in MEM1.
pub const VWII_SLOT_BASE: PhysAddr = PhysAddr::new(0x0133_0000);

/// Boot state shared with the Espresso boot ROM.
///
/// Zeroed before every race; the ROM reports failures in the last word.
pub const BOOT_SCRATCH: PhysRegion = PhysRegion::new(PhysAddr::new(0x016F_FFE0), 0x20);

/// Boot status word inside [`BOOT_SCRATCH`]. A non-zero top byte is an error code.
pub const BOOT_STATUS: PhysAddr = PhysAddr::new(0x016F_FFFC);

/// Framebuffer Starbuck draws diagnostics into (32 bits per pixel).
pub const FRAMEBUFFER_BASE: PhysAddr = PhysAddr::new(0x0070_8000);

/// Pixels per framebuffer row.
pub const FRAMEBUFFER_STRIDE: u32 = 896;

/// Framebuffer rows.
pub const FRAMEBUFFER_HEIGHT: u32 = 504;

/// Framebuffer size in bytes.
pub const FRAMEBUFFER_SIZE: u32 = FRAMEBUFFER_STRIDE * FRAMEBUFFER_HEIGHT * 4;

/// Length-prefixed text buffer the other processor may print through.
pub const MEM_CONSOLE: PhysRegion = PhysRegion::new(PhysAddr::new(0x0820_0000), 0x1_0000);

/// Scratch area for the final SHA-1 block(s) of the staged image.
pub const SHA_SCRATCH: PhysRegion = PhysRegion::new(PhysAddr::new(0x100F_FE00), 0x80);

/// Where the launcher places the hand-off record.
pub const HANDOFF_ADDR: PhysAddr = PhysAddr::new(0x100F_FF00);

/// Where the launcher places the Starbuck payload; the privileged call jumps here.
pub const ARM_PAYLOAD_ADDR: PhysAddr = PhysAddr::new(0x1010_0000);

/// Largest Starbuck payload.
pub const ARM_PAYLOAD_MAX_SIZE: u32 = 0x10_0000; // 1 MiB

/// Where the launcher stages the ancast image before Starbuck relocates it.
pub const IMAGE_STAGING_ADDR: PhysAddr = PhysAddr::new(0x1020_0000);

/// Default Espresso redirect target: the purgatory entry in MEM1.
pub const PPC_REDIRECT_DEFAULT: PhysAddr = PhysAddr::new(0x0000_0100);

const _: () = {
    let wiiu = PhysRegion::new(WIIU_SLOT_BASE, ANCAST_MAX_SIZE);
    let vwii = PhysRegion::new(VWII_SLOT_BASE, ANCAST_MAX_SIZE);
    let fb = PhysRegion::new(FRAMEBUFFER_BASE, FRAMEBUFFER_SIZE);
    let payload = PhysRegion::new(ARM_PAYLOAD_ADDR, ARM_PAYLOAD_MAX_SIZE);
    let staging = PhysRegion::new(IMAGE_STAGING_ADDR, ANCAST_MAX_SIZE);

    assert!(!wiiu.overlaps(vwii));
    assert!(!wiiu.overlaps(MEM_CONSOLE));
    assert!(!vwii.overlaps(BOOT_SCRATCH));
    assert!(!fb.overlaps(vwii));
    assert!(!payload.overlaps(staging));
    assert!(HANDOFF_ADDR.as_u32() + 0x100 <= ARM_PAYLOAD_ADDR.as_u32());
    assert!(SHA_SCRATCH.end() <= HANDOFF_ADDR.as_u32());
    assert!(BOOT_SCRATCH.contains(BOOT_STATUS));
    assert!(BOOT_STATUS.as_u32() + 4 == BOOT_SCRATCH.end());
};
