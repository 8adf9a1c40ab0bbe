use crate::console::Console;
use core::cell::UnsafeCell;
use core::fmt::Write;
use core::sync::atomic::{AtomicBool, Ordering};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// `log` backend that renders records onto a [`Console`].
pub struct ConsoleLogger<'a> {
    console: UnsafeCell<Console<'a>>,
    busy: AtomicBool,
    max_level: LevelFilter,
}

// SAFETY: the boot code runs on a single core with interrupts disabled, and
// `busy` turns re-entrant logging into a no-op, so the console is never
// borrowed twice.
#[allow(unsafe_code)]
unsafe impl Sync for ConsoleLogger<'_> {}

impl<'a> ConsoleLogger<'a> {
    #[must_use]
    pub const fn new(console: Console<'a>, max_level: LevelFilter) -> Self {
        Self {
            console: UnsafeCell::new(console),
            busy: AtomicBool::new(false),
            max_level,
        }
    }

    #[must_use]
    pub fn into_console(self) -> Console<'a> {
        self.console.into_inner()
    }
}

impl ConsoleLogger<'static> {
    /// Call this once during early init.
    #[allow(static_mut_refs, unsafe_code, clippy::missing_errors_doc)]
    pub fn init(self) -> Result<(), SetLoggerError> {
        static mut LOGGER: Option<ConsoleLogger<'static>> = None;

        let max_level = self.max_level;
        // SAFETY: single core, and nothing reads LOGGER before set_logger succeeds.
        unsafe {
            let logger: &'static ConsoleLogger<'static> = LOGGER.insert(self);
            log::set_logger(logger)?;
        }
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for ConsoleLogger<'_> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    #[allow(unsafe_code)]
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) || self.busy.load(Ordering::Acquire) {
            return;
        }
        self.busy.store(true, Ordering::Relaxed);

        // SAFETY: `busy` is set, so this is the only live borrow.
        let console = unsafe { &mut *self.console.get() };
        writeln!(
            console,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        )
        .ok();

        self.busy.store(false, Ordering::Release);
    }

    fn flush(&self) {}
}
