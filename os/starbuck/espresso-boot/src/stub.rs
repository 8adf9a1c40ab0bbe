//! # Entry redirect stub
//!
//! Six PowerPC instructions that leave the boot ROM's context through `rfi`
//! and continue at an arbitrary physical address in real mode:
//!
//! ```text
//! lis    r3, target@h
//! ori    r3, r3, target@l
//! mtsrr0 r3
//! li     r4, 0
//! mtsrr1 r4
//! rfi
//! ```

use latte_mmio::{Bus, PhysAddr, PhysRegion};

/// Number of instruction words in the stub.
pub const STUB_WORDS: usize = 6;

/// Length of the stub in bytes.
#[allow(clippy::cast_possible_truncation)]
pub const STUB_LEN: u32 = 4 * STUB_WORDS as u32;

const LIS_R3: u32 = 0x3C60_0000;
const ORI_R3_R3: u32 = 0x6063_0000;
const MTSRR0_R3: u32 = 0x7C7A_03A6;
const LI_R4_0: u32 = 0x3880_0000;
const MTSRR1_R4: u32 = 0x7C9B_03A6;
const RFI: u32 = 0x4C00_0064;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EntryStub {
    target: PhysAddr,
}

impl EntryStub {
    #[must_use]
    pub const fn new(target: PhysAddr) -> Self {
        Self { target }
    }

    #[must_use]
    pub const fn target(&self) -> PhysAddr {
        self.target
    }

    /// The encoded instructions.
    #[must_use]
    pub const fn words(&self) -> [u32; STUB_WORDS] {
        let t = self.target.as_u32();
        [
            LIS_R3 | (t >> 16),
            ORI_R3_R3 | (t & 0xffff),
            MTSRR0_R3,
            LI_R4_0,
            MTSRR1_R4,
            RFI,
        ]
    }

    /// Overwrite the instructions at `entry` with the stub and publish them.
    ///
    /// Writing the same stub again leaves memory unchanged.
    ///
    /// Publishing cleans whole cache lines, so the words sharing the last
    /// line with the stub are written back as they were cached. Those words
    /// never execute: `rfi` leaves the image first.
    pub fn write<B: Bus + ?Sized>(&self, bus: &B, entry: PhysAddr) {
        for (offset, word) in (0..STUB_LEN).step_by(4).zip(self.words()) {
            bus.write32(entry + offset, word);
        }
        bus.fence().publish(PhysRegion::new(entry, STUB_LEN));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latte_mmio::sim::SimLatte;

    const ENTRY: PhysAddr = PhysAddr::new(0x0800_0100);

    fn stub_in_memory(sim: &SimLatte) -> Vec<u32> {
        (0..STUB_LEN)
            .step_by(4)
            .map(|o| sim.remote_read32(ENTRY + o))
            .collect()
    }

    #[test]
    fn encodes_the_target_halves() {
        let words = EntryStub::new(PhysAddr::new(0x1234_5678)).words();
        assert_eq!(
            words,
            [
                0x3C60_1234,
                0x6063_5678,
                0x7C7A_03A6,
                0x3880_0000,
                0x7C9B_03A6,
                0x4C00_0064
            ]
        );
    }

    #[test]
    fn written_stub_reaches_memory() {
        let sim = SimLatte::new();
        let stub = EntryStub::new(PhysAddr::new(0x100));
        stub.write(&sim, ENTRY);

        assert_eq!(sim.dirty_lines(), 0);
        assert_eq!(stub_in_memory(&sim), stub.words());
    }

    #[test]
    fn words_sharing_the_last_line_keep_their_contents() {
        const NOP: u32 = 0x6000_0000;
        let sim = SimLatte::new();
        sim.load_words(ENTRY, &[NOP; 16]);
        let stub = EntryStub::new(PhysAddr::new(0x100));
        stub.write(&sim, ENTRY);

        assert_eq!(stub_in_memory(&sim), stub.words());
        assert_eq!(sim.remote_read32(ENTRY + STUB_LEN), NOP);
        assert_eq!(sim.remote_read32(ENTRY + STUB_LEN + 4), NOP);
        assert_eq!(sim.remote_read32(ENTRY + 0x20), NOP);
    }

    #[test]
    fn writing_twice_is_the_same_as_once() {
        let once = SimLatte::new();
        let twice = SimLatte::new();
        let stub = EntryStub::new(PhysAddr::new(0x0010_0000));

        stub.write(&once, ENTRY);
        stub.write(&twice, ENTRY);
        stub.write(&twice, ENTRY);

        assert_eq!(stub_in_memory(&once), stub_in_memory(&twice));
        assert_eq!(twice.remote_read32(ENTRY + STUB_LEN), 0);
    }
}
