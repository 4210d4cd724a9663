use defmt::{info, unwrap, warn};
use embassy_futures::join::join;
use embassy_nrf::peripherals;
use embassy_nrf::uarte::{Uarte, UarteRx, UarteTx};
use embassy_nrf::wdt::Watchdog;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;

use freqmeter_fw::console::LineBuffer;
use freqmeter_fw::drivers::generator::TestSignalGenerator;
use freqmeter_fw::engine::window::WindowEnd;
use freqmeter_fw::report::{NoDisplay, Reporter};
use freqmeter_fw::{Error, MeasurementEngine, MeterConfig};

use crate::nrf::counter::EdgeCounter;
use crate::nrf::generator::{GeneratorPeripherals, ToneGenerator};
use crate::nrf::serial::{self, SerialPeripherals, UartLines, TX_LINES};
use crate::nrf::window::{SignalWindowTimer, WINDOW_DEADLINE};

pub type Engine = MeasurementEngine<
    'static,
    EdgeCounter,
    SignalWindowTimer,
    Reporter<UartLines, NoDisplay>,
>;

/// Raised with the window number every time a measurement comes out.
pub static HEARTBEAT: Signal<CriticalSectionRawMutex, u32> = Signal::new();

/// Watchdog period in 32.768 kHz ticks: three windows.
fn watchdog_ticks(window_us: u32) -> u32 {
    let ticks = u64::from(window_us) * 3 * 32_768 / 1_000_000;
    u32::try_from(ticks).unwrap_or(u32::MAX).max(15)
}

/// Fires the end of each window at the deadline the engine posted when it
/// armed the window.
#[embassy_executor::task]
pub async fn window_task(end: WindowEnd<'static, EdgeCounter>) {
    loop {
        let deadline = WINDOW_DEADLINE.wait().await;
        Timer::at(deadline).await;
        end.on_expiry();
    }
}

#[embassy_executor::task]
pub async fn measurement_task(mut engine: Engine) {
    engine.sink_mut().begin();
    engine.start();
    info!("Measuring, window of {} us", engine.config().window_us);

    loop {
        let measurement = engine.next_measurement().await;
        info!(
            "frequencia: {} Hz (raw {}, overflows {})",
            measurement.frequency_hz,
            measurement.raw,
            measurement.overflows
        );
        HEARTBEAT.signal(engine.windows());
    }
}

/// UART: report lines out, generator requests in.
#[embassy_executor::task]
pub async fn serial_task(
    per: SerialPeripherals,
    generator: GeneratorPeripherals,
    meter: MeterConfig,
) {
    info!("serial task created.");
    let uart = Uarte::new(
        per.instance,
        serial::Irqs,
        per.pin_rx,
        per.pin_tx,
        serial::uart_config(),
    );
    let (tx, rx) = uart.split();

    let mut generator = TestSignalGenerator::from_config(ToneGenerator::new(generator), &meter);
    unwrap!(generator.configure(meter.generator_frequency_hz));

    join(write_lines(tx), console(rx, generator)).await;
}

async fn write_lines(mut tx: UarteTx<'_, peripherals::UARTE0>) {
    loop {
        let line = TX_LINES.receive().await;
        if let Err(e) = tx.write(line.as_bytes()).await {
            warn!("UART write failed: {}", e);
        }
    }
}

async fn console(
    mut rx: UarteRx<'_, peripherals::UARTE0>,
    mut generator: TestSignalGenerator<ToneGenerator>,
) {
    let mut lines = LineBuffer::new();
    let mut byte = [0u8; 1];

    loop {
        if let Err(e) = rx.read(&mut byte).await {
            warn!("{}: {}", Error::Console, e);
            continue;
        }

        let Some(frequency_hz) = lines.push(byte[0]) else {
            continue;
        };
        if let Err(e) = generator.configure(frequency_hz) {
            warn!("Generator kept {}: {}", generator.current(), e);
        }
    }
}

/// Only fed when a window completes, so a stalled measurement resets the chip.
#[embassy_executor::task]
pub async fn watchdog_task(wdt: peripherals::WDT, window_us: u32) {
    let mut wdt_config = embassy_nrf::wdt::Config::default();
    wdt_config.timeout_ticks = watchdog_ticks(window_us);
    wdt_config.run_during_sleep = true;
    wdt_config.run_during_debug_halt = false; // false so that we can see the panic message in debug mode.

    let (_wdt, [mut handle]) = match Watchdog::try_new(wdt, wdt_config) {
        Ok(x) => x,
        Err(_) => {
            panic!("Watchdog already active with wrong config, waiting for it to timeout...");
        }
    };

    loop {
        let window = HEARTBEAT.wait().await;
        handle.pet();
        defmt::trace!("Watchdog fed after window {}", window);
    }
}
