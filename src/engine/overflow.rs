use core::sync::atomic::{AtomicU32, Ordering};

/// Number of counter wraps seen during the current window.
///
/// `on_overflow` belongs to the overflow interrupt, `take_and_reset` to the
/// consumer. Both are a single atomic instruction, so the interrupt never
/// waits on the consumer.
pub struct OverflowAccumulator {
    count: AtomicU32,
}

impl Default for OverflowAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl OverflowAccumulator {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn on_overflow(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads the accumulated count and zeroes it in one step.
    #[inline]
    pub fn take_and_reset(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    pub fn peek(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}
