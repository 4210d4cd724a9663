use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant};

use freqmeter_fw::engine::window::WindowTimer;

/// Deadline of the running window, picked up by the window task.
pub static WINDOW_DEADLINE: Signal<CriticalSectionRawMutex, Instant> = Signal::new();

/// Past the hardware gate closing, covers the RTC tick the deadline is
/// rounded to.
const GATE_SETTLE: Duration = Duration::from_micros(100);

/// Schedules the capture of a window on the embassy time driver.
///
/// The window itself is closed by the gate timer in `nrf::counter`. This
/// only has to fire after it, so the RTC tick resolution does not shorten
/// the window.
pub struct SignalWindowTimer;

impl WindowTimer for SignalWindowTimer {
    fn start_once(&mut self, window_us: u32) {
        let window = Duration::from_micros(window_us.into());
        WINDOW_DEADLINE.signal(Instant::now() + window + GATE_SETTLE);
    }
}
