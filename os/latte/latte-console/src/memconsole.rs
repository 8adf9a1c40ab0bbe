//! # Memory console
//!
//! The other processor prints by appending bytes to a buffer in shared
//! memory and then bumping the length word in front of it:
//!
//! ```text
//! +0  u32  number of valid bytes
//! +4  u8[] text; `\n` starts a new line, NUL ends the stream
//! ```

use crate::console::{Console, Cursor};
use latte_mmio::{Bus, PhysRegion};

/// Where drained text starts on screen.
pub const MEM_CONSOLE_HOME: Cursor = Cursor::new(0x10, 0x12);

/// State of the stream after a [`MemConsole::poll`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Drain {
    /// More text may follow.
    Pending,
    /// The writer sent NUL; nothing more will be drawn.
    Finished,
}

/// Reader side of a memory console.
pub struct MemConsole<'b, B: Bus + ?Sized> {
    bus: &'b B,
    region: PhysRegion,
    pos: u32,
    cursor: Cursor,
    finished: bool,
}

impl<'b, B: Bus + ?Sized> MemConsole<'b, B> {
    #[must_use]
    pub const fn new(bus: &'b B, region: PhysRegion) -> Self {
        Self {
            bus,
            region,
            pos: 0,
            cursor: MEM_CONSOLE_HOME,
            finished: false,
        }
    }

    #[must_use]
    pub const fn with_home(mut self, home: Cursor) -> Self {
        self.cursor = home;
        self
    }

    /// Bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.pos
    }

    /// Draw everything written since the last poll.
    pub fn poll(&mut self, console: &mut Console<'_>) -> Drain {
        if self.finished {
            return Drain::Finished;
        }

        let fence = self.bus.fence();
        let base = self.region.base;
        fence.observe(PhysRegion::new(base, 4));

        let capacity = self.region.len.saturating_sub(4);
        let len = self.bus.read32(base).min(capacity);
        if self.pos >= len {
            return Drain::Pending;
        }

        let text = base + 4;
        fence.observe(PhysRegion::new(text + self.pos, len - self.pos));
        while self.pos < len {
            let c = self.bus.read8(text + self.pos);
            self.pos += 1;
            if c == 0 {
                self.finished = true;
                return Drain::Finished;
            }
            console.put_byte(&mut self.cursor, c);
        }
        Drain::Pending
    }
}
