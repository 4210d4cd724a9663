pub mod overflow;
pub mod window;

use overflow::OverflowAccumulator;
use window::{WindowCapture, WindowEnd, WindowState, WindowTimer};

use crate::config::MeterConfig;
use crate::drivers::counter::GatedCounter;
use crate::report::MeasurementSink;
use crate::types::{Error, Measurement, RawCount};

/// State touched from outside the consumer: the overflow interrupt and the
/// window timer. Lives in a `static` on the target.
pub struct EngineShared {
    pub overflows: OverflowAccumulator,
    pub capture: WindowCapture,
}

impl Default for EngineShared {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineShared {
    pub const fn new() -> Self {
        Self {
            overflows: OverflowAccumulator::new(),
            capture: WindowCapture::new(),
        }
    }
}

/// Measurement engine context.
///
/// Owns the window timer and the output sink, borrows the counter and the
/// shared state. One window at a time: `start_window` arms, the timer calls
/// the [`WindowEnd`] handler, the consumer picks up the result with `poll` or
/// `next_measurement`, which also re-arms the next window.
pub struct MeasurementEngine<'a, C, T, S> {
    config: MeterConfig,
    counter: &'a C,
    shared: &'a EngineShared,
    timer: T,
    sink: S,
    state: WindowState,
    windows: u32,
}

impl<'a, C, T, S> MeasurementEngine<'a, C, T, S>
where
    C: GatedCounter,
    T: WindowTimer,
    S: MeasurementSink,
{
    pub fn new(
        config: MeterConfig,
        counter: &'a C,
        shared: &'a EngineShared,
        timer: T,
        sink: S,
    ) -> Result<Self, Error> {
        let config = config.verify()?;

        Ok(Self {
            config,
            counter,
            shared,
            timer,
            sink,
            state: WindowState::Idle,
            windows: 0,
        })
    }

    /// Handler for the window timer context.
    pub fn window_end(&self) -> WindowEnd<'a, C> {
        WindowEnd::new(self.counter, &self.shared.capture)
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Completed windows since start-up.
    pub fn windows(&self) -> u32 {
        self.windows
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Starts the very first window. Anything counted before is thrown away.
    pub fn start(&mut self) {
        self.shared.overflows.take_and_reset();
        self.shared.capture.discard();
        self.start_window();
    }

    /// Idle -> Armed: clears and gates the counter, then schedules the end of
    /// the window.
    pub fn start_window(&mut self) {
        self.counter.arm();
        self.timer.start_once(self.config.window_us);
        self.state = WindowState::Armed;
    }

    /// Consumes a finished window if there is one.
    pub fn poll(&mut self) -> Option<Measurement> {
        let raw = self.shared.capture.take()?;
        Some(self.complete(raw))
    }

    /// Waits for the current window to finish and consumes it.
    pub async fn next_measurement(&mut self) -> Measurement {
        let raw = self.shared.capture.wait().await;
        self.complete(raw)
    }

    fn complete(&mut self, raw: RawCount) -> Measurement {
        self.state = WindowState::Idle;
        let overflows = self.shared.overflows.take_and_reset();
        let measurement = Measurement::from_counts(
            raw,
            overflows,
            self.config.overflow_limit,
            self.config.window_us,
        );

        self.counter.clear();
        self.start_window();

        self.windows = self.windows.wrapping_add(1);
        debug!(
            "Window {}: raw {} overflows {} -> {} Hz",
            self.windows,
            raw,
            overflows,
            measurement.frequency_hz
        );
        self.sink.emit(&measurement);

        measurement
    }
}
