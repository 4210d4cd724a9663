pub mod types;

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

pub use types::{GatedCounter, SoftCounter};

use crate::engine::overflow::OverflowAccumulator;
use crate::types::RawCount;

impl<'a> SoftCounter<'a> {
    /// `overflows` receives the wrap events, the way the overflow interrupt
    /// handler does on hardware.
    pub const fn new(limit: u32, overflows: &'a OverflowAccumulator) -> Self {
        Self {
            limit,
            count: AtomicU32::new(0),
            gate: AtomicBool::new(false),
            mirror: AtomicBool::new(false),
            overflows,
        }
    }

    /// Feeds one signal transition. Returns `true` if it caused an overflow.
    ///
    /// The whole edge is one critical section, like a hardware count: a
    /// freeze from the window end lands before it or after it, never inside.
    pub fn edge(&self) -> bool {
        critical_section::with(|_| {
            self.mirror.fetch_xor(true, Ordering::Relaxed);
            if !self.gate.load(Ordering::Acquire) {
                return false;
            }

            let next = self.count.load(Ordering::Relaxed) + 1;
            if next >= self.limit {
                self.count.store(0, Ordering::Relaxed);
                self.overflows.on_overflow();
                true
            } else {
                self.count.store(next, Ordering::Relaxed);
                false
            }
        })
    }

    /// Level of the indicator output. It toggles on every input edge.
    pub fn mirror_level(&self) -> bool {
        self.mirror.load(Ordering::Relaxed)
    }

    /// Feeds `n` transitions, returning how many overflows they raised.
    pub fn edges(&self, n: u64) -> u32 {
        let mut raised = 0;
        for _ in 0..n {
            if self.edge() {
                raised += 1;
            }
        }
        raised
    }

    /// A square wave is two edges per cycle.
    pub fn square_wave(&self, cycles: u64) -> u32 {
        self.edges(cycles * 2)
    }
}

impl GatedCounter for SoftCounter<'_> {
    fn arm(&self) {
        self.clear();
        self.gate.store(true, Ordering::Release);
    }

    fn disarm(&self) {
        self.gate.store(false, Ordering::Release);
    }

    fn read(&self) -> RawCount {
        self.count.load(Ordering::Relaxed)
    }

    fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
    }

    fn is_armed(&self) -> bool {
        self.gate.load(Ordering::Acquire)
    }
}
