use ancast::{AncastError, Slot};
use espresso_boot::{EntryStub, RaceError, RaceOutcome, RaceState};
use latte_console::{BACKGROUND, Console, Framebuffer};
use latte_info::memory::{
    HANDOFF_ADDR, IMAGE_STAGING_ADDR, PPC_REDIRECT_DEFAULT, VWII_SLOT_BASE, WIIU_SLOT_BASE,
};
use latte_info::{BootHandoff, RaceConfig};
use latte_mmio::sim::SimLatte;
use latte_mmio::{Mmio, PhysAddr, PhysRegion};
use latte_registers::sha::{SHA_CTRL, ShaCtrl};
use latte_registers::timer::LT_TIMER;
use starbuck::{BootError, read_handoff, run};

const STRIDE: usize = 896;
const HEIGHT: usize = 24 * 8;
const STEP: u32 = 1_000;
const CEILING: u32 = 4_000_000;
const IMAGE_LEN: u32 = 0x1100;
const ORIGINAL: u32 = 0x4800_0004;
const DECRYPTED: u32 = 0x7c00_02a6;
const ENTRY: PhysAddr = PhysAddr::new(0x0800_0100);

/// Latte with a SHA engine that completes at once, optionally with an error.
fn hardware(sha_fails: bool) -> SimLatte {
    let sim = SimLatte::new().with_counter(LT_TIMER, 0, STEP);
    sim.on_write(
        PhysRegion::new(SHA_CTRL, 4),
        Box::new(move |_, v| {
            let ctrl = ShaCtrl::from_bits(v);
            if ctrl.exec() {
                ctrl.with_exec(false).with_err(sha_fails).into_bits()
            } else {
                v
            }
        }),
    );
    sim
}

fn stage_image(sim: &SimLatte, image_type: u32, device_id: u32) {
    let mut words = vec![0; (IMAGE_LEN / 4) as usize];
    words[0] = 0xefa2_82d9;
    words[0x20 / 4] = image_type;
    words[0xa4 / 4] = device_id;
    words[0xac / 4] = IMAGE_LEN - 0x100;
    words[0x100 / 4] = ORIGINAL;
    sim.load_words(IMAGE_STAGING_ADDR, &words);
}

fn handoff(slot_base: PhysAddr) -> BootHandoff {
    BootHandoff::new(
        IMAGE_STAGING_ADDR.as_u32(),
        IMAGE_LEN,
        slot_base.as_u32(),
        PPC_REDIRECT_DEFAULT.as_u32(),
    )
}

fn config() -> RaceConfig {
    RaceConfig::default().with_timeout_ticks(CEILING)
}

/// A staged Wii U image whose entry the boot ROM decrypts after a while.
fn ready_to_boot(record: BootHandoff) -> SimLatte {
    let sim = hardware(false);
    stage_image(&sim, 1, 0x11);
    sim.load_words(HANDOFF_ADDR, &record.to_words());
    sim.schedule_remote_write(u64::from(CEILING / 4), ENTRY, DECRYPTED);
    sim
}

fn boot(sim: &SimLatte) -> (Result<RaceOutcome, BootError>, Vec<u32>) {
    let mut px = vec![0; STRIDE * HEIGHT];
    let result = run(sim, &mut Console::new(Framebuffer::new(&mut px, STRIDE)), config());
    (result, px)
}

fn screen_with(reason: &str, value: u32) -> Vec<u32> {
    let mut px = vec![0; STRIDE * HEIGHT];
    let mut console = Console::new(Framebuffer::new(&mut px, STRIDE));
    console.fill(BACKGROUND);
    console.fail_with_hex(reason, value);
    px
}

#[test]
fn relocates_races_and_patches_the_entry() {
    let sim = ready_to_boot(handoff(WIIU_SLOT_BASE));
    let (result, px) = boot(&sim);

    let outcome = result.unwrap();
    let RaceOutcome::Patched {
        entry,
        observed,
        redirect,
        elapsed,
    } = outcome
    else {
        panic!("expected a patch, got {outcome:?}");
    };
    assert_eq!((entry, observed, redirect), (ENTRY, DECRYPTED, PPC_REDIRECT_DEFAULT));

    let stub = EntryStub::new(PPC_REDIRECT_DEFAULT).words();
    for (i, word) in (0u32..).zip(stub) {
        assert_eq!(sim.remote_read32(ENTRY + 4 * i), word);
    }
    assert_eq!(sim.remote_read32(WIIU_SLOT_BASE), 0xefa2_82d9);
    assert_eq!(px, screen_with("ppc race: patched ", elapsed));
}

#[test]
fn detect_only_record_leaves_the_entry_alone() {
    let mut record = handoff(WIIU_SLOT_BASE);
    record.detect_only = 1;
    let sim = ready_to_boot(record);
    let (result, px) = boot(&sim);

    let outcome = result.unwrap();
    assert_eq!(outcome.state(), RaceState::Detected);
    assert_eq!(sim.remote_read32(ENTRY), DECRYPTED);
    assert_eq!(px, screen_with("ppc race: detected ", outcome.elapsed()));
}

#[test]
fn missing_record_is_drawn_and_nothing_is_copied() {
    let sim = hardware(false);
    stage_image(&sim, 1, 0x11);
    let (result, px) = boot(&sim);

    assert_eq!(result, Err(BootError::BadHandoff(0)));
    assert_eq!(sim.remote_read32(WIIU_SLOT_BASE), 0);
    assert_eq!(px, screen_with("bad hand-off magic: ", 0));
}

#[test]
fn unsupported_record_version_is_refused() {
    let mut record = handoff(WIIU_SLOT_BASE);
    record.version = 7;
    let sim = ready_to_boot(record);
    assert_eq!(boot(&sim).0, Err(BootError::HandoffVersion(7)));
}

#[test]
fn unknown_slot_is_refused() {
    let sim = ready_to_boot(handoff(PhysAddr::new(0x0900_0000)));
    let (result, px) = boot(&sim);
    assert_eq!(result, Err(BootError::UnknownSlot(0x0900_0000)));
    assert_eq!(px, screen_with("unknown ancast slot: ", 0x0900_0000));
}

#[test]
fn rejected_image_shows_the_ancast_diagnostic() {
    let sim = hardware(false);
    stage_image(&sim, 2, 0x11);
    sim.load_words(HANDOFF_ADDR, &handoff(WIIU_SLOT_BASE).to_words());
    let (result, px) = boot(&sim);

    assert_eq!(
        result,
        Err(BootError::Image(AncastError::WrongImageType(2)))
    );
    assert_eq!(px, screen_with("not a PPC ancast image: ", 2));
    assert_eq!(sim.remote_read32(WIIU_SLOT_BASE), 0);
}

#[test]
fn vwii_slot_is_refused() {
    let sim = ready_to_boot(handoff(VWII_SLOT_BASE));
    let (result, _) = boot(&sim);
    assert_eq!(
        result,
        Err(BootError::Image(AncastError::WrongDevice {
            slot: Slot::VWii,
            device_id: 0x11
        }))
    );
}

#[test]
fn race_timeout_is_reported() {
    let sim = hardware(false);
    stage_image(&sim, 1, 0x11);
    sim.load_words(HANDOFF_ADDR, &handoff(WIIU_SLOT_BASE).to_words());
    let (result, px) = boot(&sim);

    let Err(BootError::Race(RaceError::TimedOut { elapsed })) = result else {
        panic!("expected a timeout, got {result:?}");
    };
    assert!(elapsed >= CEILING);
    assert_eq!(px, screen_with("ppc race timeout: ", elapsed));
    assert_eq!(sim.remote_read32(ENTRY), ORIGINAL);
}

#[test]
fn hash_failure_does_not_stop_the_boot() {
    let sim = hardware(true);
    stage_image(&sim, 1, 0x11);
    sim.load_words(HANDOFF_ADDR, &handoff(WIIU_SLOT_BASE).to_words());
    sim.schedule_remote_write(u64::from(CEILING / 4), ENTRY, DECRYPTED);

    let (result, _) = boot(&sim);
    assert_eq!(result.unwrap().state(), RaceState::Patched);
}

#[test]
fn record_written_through_the_cache_is_seen() {
    let sim = SimLatte::new();
    let words = handoff(WIIU_SLOT_BASE).to_words();
    for (i, word) in (0u32..).zip(words) {
        sim.write32(HANDOFF_ADDR + 4 * i, word);
    }
    assert_eq!(sim.remote_read32(HANDOFF_ADDR), 0);

    assert_eq!(read_handoff(&sim), Ok(handoff(WIIU_SLOT_BASE)));
}

#[test]
fn record_written_behind_a_stale_line_is_seen() {
    let sim = SimLatte::new();
    assert_eq!(sim.read32(HANDOFF_ADDR), 0);
    sim.load_words(HANDOFF_ADDR, &handoff(WIIU_SLOT_BASE).to_words());

    assert_eq!(read_handoff(&sim), Ok(handoff(WIIU_SLOT_BASE)));
}
