//! # Simulated Latte bus
//!
//! A host-side model of the parts of the hardware the boot code depends on:
//!
//! * word-addressed RAM (unwritten words read as zero),
//! * a **non-coherent write-back data cache** in front of RAM, so that a
//!   missing [`publish`](crate::CoherencyFence::publish) or
//!   [`observe`](crate::CoherencyFence::observe) shows up as stale data,
//! * the uncached register window, with optional write hooks that emulate
//!   device side effects,
//! * a free-running counter register that advances on every read,
//! * writes performed by "the other processor" at a given tick, which land in
//!   RAM behind the cache,
//! * a log of register accesses and cache maintenance operations.
//!
//! ```rust,ignore
//! # use latte_mmio::{Bus, Mmio, PhysAddr, PhysRegion};
//! # use latte_mmio::sim::SimLatte;
//! let sim = SimLatte::new();
//! let pa = PhysAddr::new(0x0800_0000);
//! sim.write32(pa, 0x1234_5678);
//! assert_eq!(sim.remote_read32(pa), 0, "still only in the data cache");
//! sim.fence().publish(PhysRegion::new(pa, 4));
//! assert_eq!(sim.remote_read32(pa), 0x1234_5678);
//! ```

extern crate alloc;

use crate::access::{CacheControl, Mmio};
use crate::address::{CACHE_LINE, PhysAddr, PhysRegion};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::cell::RefCell;

const WORDS_PER_LINE: usize = (CACHE_LINE / 4) as usize;

/// A recorded bus event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Access {
    /// A register read (the counter register is not recorded).
    Read { addr: PhysAddr, value: u32 },
    /// A register write, with the value as written by the driver.
    Write { addr: PhysAddr, value: u32 },
    Flush(PhysRegion),
    Invalidate(PhysRegion),
}

/// Device side effect for a register write.
///
/// Receives the address and the written value and returns the value the
/// register holds afterwards.
pub type WriteHook = Box<dyn FnMut(PhysAddr, u32) -> u32>;

#[derive(Copy, Clone)]
struct Line {
    words: [u32; WORDS_PER_LINE],
    dirty: bool,
}

struct Counter {
    addr: PhysAddr,
    value: u32,
    step: u32,
}

struct RemoteWrite {
    at: u64,
    addr: PhysAddr,
    value: u32,
}

#[derive(Default)]
struct State {
    ram: BTreeMap<u32, u32>,
    lines: BTreeMap<u32, Line>,
    counter: Option<Counter>,
    ticks: u64,
    remote: Vec<RemoteWrite>,
    hooks: Vec<(PhysRegion, WriteHook)>,
    log: Vec<Access>,
}

impl State {
    fn ram_read(&self, addr: PhysAddr) -> u32 {
        self.ram.get(&addr.as_u32()).copied().unwrap_or(0)
    }

    fn ram_write(&mut self, addr: PhysAddr, value: u32) {
        self.ram.insert(addr.as_u32(), value);
    }

    fn apply_due_remote_writes(&mut self) {
        let ticks = self.ticks;
        let mut i = 0;
        while i < self.remote.len() {
            if self.remote[i].at <= ticks {
                let w = self.remote.remove(i);
                self.ram_write(w.addr, w.value);
            } else {
                i += 1;
            }
        }
    }

    fn line_mut(&mut self, addr: PhysAddr) -> (&mut Line, usize) {
        let base = addr.align_down(CACHE_LINE);
        let index = ((addr.as_u32() - base.as_u32()) / 4) as usize;
        if !self.lines.contains_key(&base.as_u32()) {
            let mut words = [0; WORDS_PER_LINE];
            for (i, w) in words.iter_mut().enumerate() {
                *w = self.ram_read(base + (i as u32) * 4);
            }
            self.lines.insert(base.as_u32(), Line { words, dirty: false });
        }
        let line = self
            .lines
            .get_mut(&base.as_u32())
            .unwrap_or_else(|| unreachable!("line was just filled"));
        (line, index)
    }
}

/// Simulated Latte hardware. See the [module documentation](self).
#[derive(Default)]
pub struct SimLatte {
    state: RefCell<State>,
}

impl SimLatte {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a free-running counter register at `addr`, starting at
    /// `start` and advancing by `step` ticks on every read.
    #[must_use]
    pub fn with_counter(self, addr: PhysAddr, start: u32, step: u32) -> Self {
        self.state.borrow_mut().counter = Some(Counter {
            addr,
            value: start,
            step,
        });
        self
    }

    /// Emulate a device: writes to registers inside `region` go through `hook`.
    pub fn on_write(&self, region: PhysRegion, hook: WriteHook) {
        self.state.borrow_mut().hooks.push((region, hook));
    }

    /// Have the other processor store `value` at `addr` once the counter has
    /// advanced by `at` ticks in total.
    pub fn schedule_remote_write(&self, at: u64, addr: PhysAddr, value: u32) {
        self.state.borrow_mut().remote.push(RemoteWrite {
            at,
            addr: addr.align_down(4),
            value,
        });
    }

    /// Read memory the way the other processor sees it, bypassing the cache.
    #[must_use]
    pub fn remote_read32(&self, addr: PhysAddr) -> u32 {
        self.state.borrow().ram_read(addr.align_down(4))
    }

    /// Store to memory on behalf of the other processor, bypassing the cache.
    pub fn remote_write32(&self, addr: PhysAddr, value: u32) {
        self.state.borrow_mut().ram_write(addr.align_down(4), value);
    }

    /// Place `words` in memory starting at `base`, bypassing the cache.
    pub fn load_words(&self, base: PhysAddr, words: &[u32]) {
        let mut state = self.state.borrow_mut();
        for (i, &w) in words.iter().enumerate() {
            state.ram_write(base.align_down(4) + (i as u32) * 4, w);
        }
    }

    /// Total number of counter ticks elapsed so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.state.borrow().ticks
    }

    /// Number of cache lines holding data not yet written back.
    #[must_use]
    pub fn dirty_lines(&self) -> usize {
        self.state
            .borrow()
            .lines
            .values()
            .filter(|l| l.dirty)
            .count()
    }

    #[must_use]
    pub fn log(&self) -> Vec<Access> {
        self.state.borrow().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    /// Values written to the register at `addr`, in order.
    #[must_use]
    pub fn writes_to(&self, addr: PhysAddr) -> Vec<u32> {
        self.state
            .borrow()
            .log
            .iter()
            .filter_map(|a| match *a {
                Access::Write { addr: a, value } if a == addr => Some(value),
                _ => None,
            })
            .collect()
    }
}

impl Mmio for SimLatte {
    fn read32(&self, addr: PhysAddr) -> u32 {
        let addr = addr.align_down(4);
        let mut state = self.state.borrow_mut();
        state.apply_due_remote_writes();

        if let Some(counter) = state.counter.as_mut()
            && counter.addr == addr
        {
            let value = counter.value;
            counter.value = counter.value.wrapping_add(counter.step);
            let step = u64::from(counter.step);
            state.ticks += step;
            return value;
        }

        if addr.is_register() {
            let value = state.ram_read(addr);
            state.log.push(Access::Read { addr, value });
            return value;
        }

        let (line, index) = state.line_mut(addr);
        line.words[index]
    }

    fn write32(&self, addr: PhysAddr, value: u32) {
        let addr = addr.align_down(4);
        let mut state = self.state.borrow_mut();
        state.apply_due_remote_writes();

        if addr.is_register() {
            state.log.push(Access::Write { addr, value });
            let mut stored = value;
            for (region, hook) in &mut state.hooks {
                if region.contains(addr) {
                    stored = hook(addr, stored);
                }
            }
            state.ram_write(addr, stored);
            return;
        }

        let (line, index) = state.line_mut(addr);
        line.words[index] = value;
        line.dirty = true;
    }
}

impl CacheControl for SimLatte {
    fn flush(&self, region: PhysRegion) {
        let mut state = self.state.borrow_mut();
        state.log.push(Access::Flush(region));
        for base in region.lines() {
            let Some(line) = state.lines.get_mut(&base.as_u32()) else {
                continue;
            };
            if !line.dirty {
                continue;
            }
            line.dirty = false;
            let words = line.words;
            for (i, w) in words.into_iter().enumerate() {
                state.ram_write(base + (i as u32) * 4, w);
            }
        }
    }

    fn invalidate(&self, region: PhysRegion) {
        let mut state = self.state.borrow_mut();
        state.log.push(Access::Invalidate(region));
        for base in region.lines() {
            state.lines.remove(&base.as_u32());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Bus;

    const MEM: PhysAddr = PhysAddr::new(0x0100_0000);
    const REG: PhysAddr = PhysAddr::new(0x0d80_0100);
    const COUNTER: PhysAddr = PhysAddr::new(0x0d80_0010);

    #[test]
    fn local_writes_stay_in_cache_until_published() {
        let sim = SimLatte::new();
        sim.write32(MEM, 0xdead_beef);
        assert_eq!(sim.read32(MEM), 0xdead_beef);
        assert_eq!(sim.remote_read32(MEM), 0);
        assert_eq!(sim.dirty_lines(), 1);

        sim.fence().publish(PhysRegion::new(MEM, 4));
        assert_eq!(sim.remote_read32(MEM), 0xdead_beef);
        assert_eq!(sim.dirty_lines(), 0);
    }

    #[test]
    fn remote_writes_are_hidden_by_a_cached_line() {
        let sim = SimLatte::new();
        assert_eq!(sim.read32(MEM), 0);
        sim.remote_write32(MEM, 7);
        assert_eq!(sim.read32(MEM), 0, "stale line must still be served");

        sim.fence().observe(PhysRegion::new(MEM, 4));
        assert_eq!(sim.read32(MEM), 7);
    }

    #[test]
    fn invalidate_discards_unpublished_writes() {
        let sim = SimLatte::new();
        sim.remote_write32(MEM, 1);
        sim.write32(MEM, 2);
        sim.fence().observe(PhysRegion::new(MEM, 4));
        assert_eq!(sim.read32(MEM), 1);
    }

    #[test]
    fn registers_bypass_the_cache_and_are_logged() {
        let sim = SimLatte::new();
        sim.set32(REG, 0x30);
        assert_eq!(sim.remote_read32(REG), 0x30);
        assert_eq!(
            sim.log(),
            [
                Access::Read { addr: REG, value: 0 },
                Access::Write {
                    addr: REG,
                    value: 0x30
                },
            ]
        );
    }

    #[test]
    fn write_hooks_transform_the_stored_value() {
        let sim = SimLatte::new();
        sim.on_write(PhysRegion::new(REG, 4), Box::new(|_, v| v & !0x8000_0000));
        sim.write32(REG, 0x8000_0003);
        assert_eq!(sim.read32(REG), 3);
        assert_eq!(sim.writes_to(REG), [0x8000_0003]);
    }

    #[test]
    fn counter_advances_and_triggers_remote_writes() {
        let sim = SimLatte::new().with_counter(COUNTER, u32::MAX - 1, 2);
        sim.schedule_remote_write(4, MEM, 0x55);

        assert_eq!(sim.read32(COUNTER), u32::MAX - 1);
        assert_eq!(sim.read32(COUNTER), 0);
        assert_eq!(sim.remote_read32(MEM), 0);
        assert_eq!(sim.ticks(), 4);

        // The next access applies the due write.
        assert_eq!(sim.read32(COUNTER), 2);
        assert_eq!(sim.remote_read32(MEM), 0x55);
        assert!(sim.log().is_empty(), "counter reads are not logged");
    }

    #[test]
    fn byte_access_uses_big_endian_lanes() {
        let sim = SimLatte::new();
        sim.write32(MEM, 0x1122_3344);
        assert_eq!(sim.read8(MEM), 0x11);
        assert_eq!(sim.read8(MEM + 3), 0x44);
        sim.write8(MEM + 1, 0xaa);
        assert_eq!(sim.read32(MEM), 0x11aa_3344);
    }

    #[test]
    fn copy_rounds_up_to_whole_words() {
        let sim = SimLatte::new();
        sim.load_words(MEM, &[1, 2, 3]);
        sim.copy32(MEM + 0x100, MEM, 9);
        assert_eq!(sim.read32(MEM + 0x100), 1);
        assert_eq!(sim.read32(MEM + 0x104), 2);
        assert_eq!(sim.read32(MEM + 0x108), 3);
        assert_eq!(sim.read32(MEM + 0x10c), 0);
    }
}
