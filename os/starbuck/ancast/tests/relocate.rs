use ancast::header::{ANCAST_MAGIC, ANCAST_TYPE_PPC};
use ancast::{AncastError, Slot, validate_and_relocate};
use latte_mmio::sim::{Access, SimLatte};
use latte_mmio::{Mmio, PhysAddr, PhysRegion};

const STAGING: PhysAddr = PhysAddr::new(0x1020_0000);
const WIIU: PhysAddr = PhysAddr::new(0x0800_0000);
const VWII: PhysAddr = PhysAddr::new(0x0133_0000);
const POISON: u32 = 0x5a5a_5a5a;

/// Stage an image with the given header fields and a counting payload.
fn stage(sim: &SimLatte, magic: u32, image_type: u32, device_id: u32, payload_size: u32) {
    let mut words = vec![0u32; 0x40];
    words[0] = magic;
    words[0x20 / 4] = image_type;
    words[0xa4 / 4] = device_id;
    words[0xac / 4] = payload_size;
    words.extend((0..payload_size.min(0x4000) / 4).map(|i| 0xc0de_0000 | i));
    sim.load_words(STAGING, &words);
}

/// Fill both slots with a recognizable pattern.
fn poison_slots(sim: &SimLatte) {
    sim.load_words(WIIU, &[POISON; 0x500]);
    sim.load_words(VWII, &[POISON; 0x40]);
}

fn slots_untouched(sim: &SimLatte) -> bool {
    (0..0x500).all(|i| sim.remote_read32(WIIU + 4 * i) == POISON)
        && (0..0x40).all(|i| sim.remote_read32(VWII + 4 * i) == POISON)
}

#[test]
fn valid_wiiu_image_is_copied_with_its_header() {
    let sim = SimLatte::new();
    poison_slots(&sim);
    stage(&sim, ANCAST_MAGIC, ANCAST_TYPE_PPC, 0x11, 0x1000);

    let relocated = validate_and_relocate(&sim, STAGING, Slot::WiiU).unwrap();
    assert_eq!(relocated.len, 0x1100);
    assert_eq!(relocated.entry(), WIIU + 0x100);

    // Every byte is in memory, not just in the data cache.
    assert_eq!(sim.dirty_lines(), 0);
    for off in (0..0x1100).step_by(4) {
        assert_eq!(
            sim.remote_read32(WIIU + off),
            sim.remote_read32(STAGING + off),
            "offset {off:#x}"
        );
    }
    assert_eq!(sim.remote_read32(WIIU + 0x1100), POISON);
}

#[test]
fn alternate_header_is_cleared_and_published() {
    let sim = SimLatte::new();
    poison_slots(&sim);
    stage(&sim, ANCAST_MAGIC, ANCAST_TYPE_PPC, 0x11, 0x40);

    validate_and_relocate(&sim, STAGING, Slot::WiiU).unwrap();
    assert!((0..0x40).all(|i| sim.remote_read32(VWII + 4 * i) == 0));

    let log = sim.log();
    let publishes_alternate = log
        .iter()
        .any(|a| matches!(a, Access::Flush(r) if r.contains(VWII)));
    assert!(publishes_alternate);
}

#[test]
fn odd_payload_sizes_copy_whole_words() {
    let sim = SimLatte::new();
    poison_slots(&sim);
    stage(&sim, ANCAST_MAGIC, ANCAST_TYPE_PPC, 0x11, 0x101);

    let relocated = validate_and_relocate(&sim, STAGING, Slot::WiiU).unwrap();
    assert_eq!(relocated.len, 0x201);
    assert_eq!(sim.remote_read32(WIIU + 0x200), sim.remote_read32(STAGING + 0x200));
    assert_eq!(sim.remote_read32(WIIU + 0x204), POISON);
}

#[test]
fn wrong_image_type_writes_nothing() {
    let sim = SimLatte::new();
    poison_slots(&sim);
    stage(&sim, ANCAST_MAGIC, 2, 0x11, 0x1000);

    let err = validate_and_relocate(&sim, STAGING, Slot::WiiU).unwrap_err();
    assert_eq!(err, AncastError::WrongImageType(2));
    assert_eq!(err.to_string(), "not a PPC ancast image: 00000002");
    assert_eq!(sim.dirty_lines(), 0);
    assert!(slots_untouched(&sim));
}

#[test]
fn every_rejection_leaves_memory_alone() {
    let cases = [
        (0xdead_beef, 1, 0x11, 0x1000, Slot::WiiU, "invalid ancast magic: deadbeef"),
        (ANCAST_MAGIC, 1, 0x13, 0x1000, Slot::WiiU, "not a Wii U ancast image: 00000013"),
        (ANCAST_MAGIC, 1, 0x13, 0x1000, Slot::VWii, "not a vWii ancast image: 00000013"),
        (ANCAST_MAGIC, 1, 0x11, 0x20_0000, Slot::WiiU, "ancast image too big: 00200000"),
    ];

    for (magic, ty, dev, size, slot, text) in cases {
        let sim = SimLatte::new();
        poison_slots(&sim);
        stage(&sim, magic, ty, dev, size);

        let err = validate_and_relocate(&sim, STAGING, slot).unwrap_err();
        assert_eq!(err.to_string(), text);
        assert_eq!(sim.dirty_lines(), 0, "{text}");
        assert!(slots_untouched(&sim), "{text}");
    }
}

#[test]
fn image_staged_through_the_cache_survives() {
    let sim = SimLatte::new();
    stage(&sim, ANCAST_MAGIC, ANCAST_TYPE_PPC, 0x11, 0x40);
    // Same-core writer: the last payload word only exists in the data cache.
    sim.write32(STAGING + 0x13c, 0x600d_c0de);

    validate_and_relocate(&sim, STAGING, Slot::WiiU).unwrap();
    assert_eq!(sim.remote_read32(WIIU + 0x13c), 0x600d_c0de);
}

#[test]
fn misaligned_source_is_refused() {
    let sim = SimLatte::new();
    let err = validate_and_relocate(&sim, STAGING + 2, Slot::WiiU).unwrap_err();
    assert_eq!(err, AncastError::Misaligned(STAGING + 2));
    assert!(sim.log().is_empty());
}

#[test]
fn header_is_read_from_memory_not_a_stale_cache_line() {
    let sim = SimLatte::new();
    stage(&sim, 0, 0, 0, 0);
    // Pull the stale header into the cache.
    let _ = validate_and_relocate(&sim, STAGING, Slot::WiiU);
    stage(&sim, ANCAST_MAGIC, ANCAST_TYPE_PPC, 0x11, 0x40);

    let relocated = validate_and_relocate(&sim, STAGING, Slot::WiiU).unwrap();
    assert_eq!(relocated.len, 0x140);
    let header = PhysRegion::new(STAGING, 0x100).cache_aligned();
    let log = sim.log();
    let cleaned = log.iter().position(|a| *a == Access::Flush(header));
    let dropped = log.iter().position(|a| *a == Access::Invalidate(header));
    assert!(cleaned.is_some() && cleaned < dropped);
}
