use core::sync::atomic::{AtomicU32, Ordering};

use async_flag::AsyncFlag;

use crate::drivers::counter::GatedCounter;
use crate::types::RawCount;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowState {
    /// Waiting for `start_window`.
    Idle,
    /// Counting, the window timer is running.
    Armed,
}

/// One-shot timer that bounds a measurement window.
///
/// After `start_once` the implementation must call [`WindowEnd::on_expiry`]
/// exactly once, `window_us` microseconds later. It never repeats by itself.
pub trait WindowTimer {
    fn start_once(&mut self, window_us: u32);
}

/// Raw count handed from the window-end handler to the consumer.
///
/// One writer, one reader, one value per window. The count is stored before
/// the ready flag is raised and the flag is raised with Release, so a consumer
/// that saw the flag also sees the count.
pub struct WindowCapture {
    raw: AtomicU32,
    ready: AsyncFlag,
}

impl Default for WindowCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowCapture {
    pub const fn new() -> Self {
        Self {
            raw: AtomicU32::new(0),
            ready: AsyncFlag::new(),
        }
    }

    /// Stores the count and raises the ready flag. Returns `true` if the
    /// previous capture was never consumed.
    pub fn publish(&self, raw: RawCount) -> bool {
        self.raw.store(raw, Ordering::Relaxed);
        self.ready.set()
    }

    /// Test-and-clear of the ready flag.
    pub fn take(&self) -> Option<RawCount> {
        if self.ready.take() {
            Some(self.raw.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Waits for the next capture.
    pub async fn wait(&self) -> RawCount {
        self.ready.wait().await;
        self.raw.load(Ordering::Relaxed)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_set()
    }

    pub(crate) fn discard(&self) {
        self.ready.reset();
    }
}

/// The part of the engine that runs when the window timer fires.
pub struct WindowEnd<'a, C> {
    counter: &'a C,
    capture: &'a WindowCapture,
}

impl<C> Clone for WindowEnd<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for WindowEnd<'_, C> {}

impl<'a, C: GatedCounter> WindowEnd<'a, C> {
    pub fn new(counter: &'a C, capture: &'a WindowCapture) -> Self {
        Self { counter, capture }
    }

    /// Freezes the counter, captures it and signals the consumer.
    ///
    /// The freeze and the read happen under a critical section, so an
    /// overflow interrupt can land before or after them but never between.
    pub fn on_expiry(&self) {
        let (raw, missed) = critical_section::with(|_| {
            self.counter.disarm();
            let raw = self.counter.read();
            (raw, self.capture.publish(raw))
        });

        if missed {
            warn!("Previous window was never consumed, raw {} overwritten", raw);
        }
        trace!("Window closed, raw count {}", raw);
    }
}
