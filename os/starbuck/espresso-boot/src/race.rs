//! # Boot race
//!
//! After the boot ROM has verified the image it decrypts it in place and
//! jumps to the first payload instruction. Between the moment that
//! instruction changes in memory and the moment the Espresso fetches it,
//! Starbuck can overwrite it with an [`EntryStub`]. There is no interrupt or
//! handshake for this; the only tool is polling memory as fast as possible.
//!
//! ```text
//! RaceCoordinator ──arm()──▶ ArmedRace ──release()──▶ Racing ──run()──▶ Ok(Patched | Detected)
//!      Idle                    Armed                   Racing           Err(BootError | TimedOut)
//! ```

use crate::reset::ResetSequencer;
use crate::stub::EntryStub;
use latte_info::{PatchPolicy, RaceConfig};
use latte_mmio::{Bus, PhysAddr, PhysRegion};
use latte_registers::timer::Timer;

/// Where a race is in its lifecycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RaceState {
    Idle,
    Armed,
    /// The Espresso has been released and memory is being polled.
    Racing,
    Patched,
    Detected,
    BootError,
    TimedOut,
}

/// A race that reached the entry point.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RaceOutcome {
    /// The entry point was overwritten with the redirect stub.
    Patched {
        entry: PhysAddr,
        /// Instruction word the boot ROM placed at the entry point.
        observed: u32,
        redirect: PhysAddr,
        elapsed: u32,
    },
    /// The entry point changed and was left alone.
    Detected {
        entry: PhysAddr,
        observed: u32,
        elapsed: u32,
    },
}

impl RaceOutcome {
    #[must_use]
    pub const fn state(&self) -> RaceState {
        match self {
            Self::Patched { .. } => RaceState::Patched,
            Self::Detected { .. } => RaceState::Detected,
        }
    }

    /// Ticks from release until the entry point changed.
    #[must_use]
    pub const fn elapsed(&self) -> u32 {
        match *self {
            Self::Patched { elapsed, .. } | Self::Detected { elapsed, .. } => elapsed,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum RaceError {
    /// The boot ROM reported a failure in the status word.
    #[error("Espresso boot ROM failed with code {code:#04x} (status {status:08x})")]
    BootError { code: u8, status: u32 },
    #[error("Espresso did not reach its entry point within {elapsed} ticks")]
    TimedOut { elapsed: u32 },
}

impl RaceError {
    #[must_use]
    pub const fn state(&self) -> RaceState {
        match self {
            Self::BootError { .. } => RaceState::BootError,
            Self::TimedOut { .. } => RaceState::TimedOut,
        }
    }

    /// The boot ROM's error code, or -1 on timeout.
    #[must_use]
    pub fn status(&self) -> i32 {
        match *self {
            Self::BootError { code, .. } => i32::from(code),
            Self::TimedOut { .. } => -1,
        }
    }

    /// Reason text and value for the diagnostic console.
    #[must_use]
    pub const fn diagnostic(&self) -> (&'static str, u32) {
        match *self {
            Self::BootError { status, .. } => ("ppc boot error: ", status),
            Self::TimedOut { elapsed } => ("ppc race timeout: ", elapsed),
        }
    }
}

/// A race that has not been armed yet.
pub struct RaceCoordinator<'a, B: Bus + ?Sized> {
    bus: &'a B,
    config: RaceConfig,
}

impl<'a, B: Bus + ?Sized> RaceCoordinator<'a, B> {
    #[must_use]
    pub const fn new(bus: &'a B, config: RaceConfig) -> Self {
        Self { bus, config }
    }

    #[must_use]
    pub const fn state(&self) -> RaceState {
        RaceState::Idle
    }

    /// Record the instruction at `entry` and clear the boot scratch area.
    ///
    /// `redirect` is where the Espresso is sent once the race is won.
    #[must_use]
    pub fn arm(self, entry: PhysAddr, redirect: PhysAddr) -> ArmedRace<'a, B> {
        let fence = self.bus.fence();

        fence.observe(PhysRegion::new(entry, 4));
        let original = self.bus.read32(entry);

        self.bus.fill32(self.config.scratch, 0);
        fence.publish(self.config.scratch);

        log::debug!("armed race at {entry} (original {original:#010x}), redirect to {redirect}");
        ArmedRace {
            bus: self.bus,
            config: self.config,
            entry,
            original,
            stub: EntryStub::new(redirect),
        }
    }
}

/// A race ready to start. The relocated image and the scratch area belong to
/// it until the race is over.
pub struct ArmedRace<'a, B: Bus + ?Sized> {
    bus: &'a B,
    config: RaceConfig,
    entry: PhysAddr,
    original: u32,
    stub: EntryStub,
}

impl<'a, B: Bus + ?Sized> ArmedRace<'a, B> {
    #[must_use]
    pub const fn state(&self) -> RaceState {
        RaceState::Armed
    }

    /// Instruction word at the entry point when the race was armed.
    #[must_use]
    pub const fn original(&self) -> u32 {
        self.original
    }

    /// Reset the Espresso and let its boot ROM run. The race clock starts
    /// here; polling begins with [`Racing::run`].
    #[must_use]
    pub fn release(self) -> Racing<'a, B> {
        ResetSequencer::new(self.bus).reset_and_release();
        let start = Timer::new(self.bus).now();
        Racing { armed: self, start }
    }

    /// [`release`](Self::release) the Espresso and [`run`](Racing::run) the race.
    ///
    /// # Errors
    /// See [`Racing::run`].
    pub fn run(self) -> Result<RaceOutcome, RaceError> {
        self.release().run()
    }
}

/// A race in progress: the Espresso is out of reset and its boot ROM is
/// working towards the entry point.
pub struct Racing<'a, B: Bus + ?Sized> {
    armed: ArmedRace<'a, B>,
    start: u32,
}

impl<B: Bus + ?Sized> Racing<'_, B> {
    #[must_use]
    pub const fn state(&self) -> RaceState {
        RaceState::Racing
    }

    /// `LT_TIMER` value at release.
    #[must_use]
    pub const fn started_at(&self) -> u32 {
        self.start
    }

    /// Poll until the entry point changes, the boot ROM reports an error,
    /// or the timeout expires.
    ///
    /// # Errors
    /// [`RaceError::BootError`] or [`RaceError::TimedOut`]. Neither is retried.
    pub fn run(self) -> Result<RaceOutcome, RaceError> {
        let result = self.poll();
        match &result {
            Ok(RaceOutcome::Patched {
                observed,
                redirect,
                elapsed,
                ..
            }) => log::info!(
                "entry changed to {observed:#010x} after {elapsed} ticks, redirected to {redirect}"
            ),
            Ok(RaceOutcome::Detected {
                observed, elapsed, ..
            }) => log::info!("entry changed to {observed:#010x} after {elapsed} ticks"),
            Err(e) => log::error!("{e}"),
        }
        result
    }

    fn poll(&self) -> Result<RaceOutcome, RaceError> {
        let ArmedRace {
            bus,
            config,
            entry,
            original,
            stub,
        } = self.armed;
        let fence = bus.fence();
        let timer = Timer::new(bus);
        let entry_line = PhysRegion::new(entry, 4);
        let status_line = PhysRegion::new(config.status, 4);

        loop {
            fence.observe(entry_line);
            let observed = bus.read32(entry);
            if observed != original {
                let elapsed = timer.elapsed_since(self.start);
                return Ok(match config.patch_policy {
                    PatchPolicy::Redirect => {
                        stub.write(bus, entry);
                        RaceOutcome::Patched {
                            entry,
                            observed,
                            redirect: stub.target(),
                            elapsed,
                        }
                    }
                    PatchPolicy::DetectOnly => RaceOutcome::Detected {
                        entry,
                        observed,
                        elapsed,
                    },
                });
            }

            fence.observe(status_line);
            let status = bus.read32(config.status);
            let [code, ..] = status.to_be_bytes();
            if code != 0 {
                return Err(RaceError::BootError { code, status });
            }

            let elapsed = timer.elapsed_since(self.start);
            if elapsed >= config.timeout_ticks {
                return Err(RaceError::TimedOut { elapsed });
            }
        }
    }
}
