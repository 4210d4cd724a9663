use core::sync::atomic::{AtomicBool, AtomicU32};

use crate::engine::overflow::OverflowAccumulator;
use crate::types::RawCount;

/// An edge counter that only counts while its gate is asserted.
///
/// It counts rising and falling edges alike. At the configured limit it raises
/// one overflow event and continues from zero. All methods take `&self`: the
/// counter is shared between the window timer context and the consumer, like
/// a peripheral register block.
pub trait GatedCounter {
    /// Clears the count and asserts the gate.
    fn arm(&self);
    /// Deasserts the gate. The count stays readable.
    fn disarm(&self);
    fn read(&self) -> RawCount;
    /// Resets the visible count. Accumulated overflows are not touched.
    fn clear(&self);
    fn is_armed(&self) -> bool;
}

/// Software model of a gated edge counter.
///
/// Also models the indicator output that follows the input whether or not
/// the gate is open.
pub struct SoftCounter<'a> {
    pub(super) limit: u32,
    pub(super) count: AtomicU32,
    pub(super) gate: AtomicBool,
    pub(super) mirror: AtomicBool,
    pub(super) overflows: &'a OverflowAccumulator,
}
