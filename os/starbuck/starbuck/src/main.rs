//! # Starbuck Payload Entry Point
//!
//! The launcher's privileged call branches to `_start` in supervisor mode,
//! on the IOSU kernel's stack. We zero `.bss`, run one boot attempt and
//! keep drawing the memory console until its writer signs off, then return
//! to the caller.

#![cfg_attr(target_os = "none", no_std, no_main)]
#![allow(unsafe_code)]

#[cfg(target_os = "none")]
mod payload {
    use core::hint::spin_loop;
    use latte_console::{
        Console, ConsoleLogger, Drain, starbuck_framebuffer, starbuck_mem_console,
    };
    use latte_info::RaceConfig;
    use latte_info::memory::{FRAMEBUFFER_BASE, FRAMEBUFFER_SIZE};
    use latte_mmio::{Bus, LatteBus, PhysRegion};
    use log::LevelFilter;

    /// Pixel rows kept for the status line and the memory console; log
    /// records go below.
    const STATUS_ROWS: usize = 24 * 8;

    #[panic_handler]
    fn panic(_info: &core::panic::PanicInfo) -> ! {
        loop {
            spin_loop();
        }
    }

    /// The payload entry point.
    ///
    /// # Naked function
    /// `.bss` holds the logger, so it has to be cleared before any Rust code
    /// runs. Only caller-saved registers are touched and `lr` is left alone,
    /// so [`starbuck_main`] returns straight to the privileged call.
    #[unsafe(no_mangle)]
    #[unsafe(naked)]
    #[unsafe(link_section = ".text.start")]
    pub extern "C" fn _start() -> i32 {
        core::arch::naked_asm!(
            "ldr r0, =__bss_start",
            "ldr r1, =__bss_end",
            "mov r2, #0",
            "1:",
            "cmp r0, r1",
            "strlo r2, [r0], #4",
            "blo 1b",
            "b {main}",
            ".ltorg",
            main = sym starbuck_main,
        );
    }

    #[unsafe(no_mangle)]
    extern "C" fn starbuck_main() -> i32 {
        // SAFETY: we run on Starbuck with the IOSU kernel's 1:1 mapping, and
        // this is the only bus and the only framebuffer view.
        let bus = unsafe { LatteBus::new() };
        let fb = unsafe { starbuck_framebuffer() };

        let (status, log_area) = fb.split_at_row(STATUS_ROWS);
        let mut console = Console::new(status);
        // Logging is a diagnostic aid; carry on without it.
        let _ = ConsoleLogger::new(Console::new(log_area), LevelFilter::Info).init();

        // The outcome is on screen either way.
        let _ = starbuck::run(&bus, &mut console, RaceConfig::default());

        let fb_region = PhysRegion::new(FRAMEBUFFER_BASE, FRAMEBUFFER_SIZE);
        let fence = bus.fence();
        fence.publish(fb_region);

        let mut mem_console = starbuck_mem_console(&bus);
        while mem_console.poll(&mut console) == Drain::Pending {
            fence.publish(fb_region);
            spin_loop();
        }
        fence.publish(fb_region);
        0
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
