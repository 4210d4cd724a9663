#![no_std]
#![no_main]

mod nrf;
mod tasks;

use cortex_m_rt::entry;
use defmt::{info, unwrap};
use defmt_rtt as _; // global logger
use embassy_executor::{Executor, Spawner};
use embassy_nrf::gpio::Pin;
use embassy_nrf::interrupt::Priority;
#[cfg(not(debug_assertions))]
use panic_persist as _; // panic handler that logs error into RAM, then soft-resets
#[cfg(debug_assertions)]
use panic_probe as _;
use static_cell::StaticCell;

use freqmeter_fw::report::Reporter;
use freqmeter_fw::{EngineShared, MeasurementEngine, MeterConfig};

use nrf::counter::{CounterPeripherals, EdgeCounter, GATE_CLOCK_HZ};
use nrf::generator::{GeneratorPeripherals, TIMER_CLOCK_HZ};
use nrf::serial::{SerialPeripherals, UartLines};
use nrf::window::SignalWindowTimer;

/// Overflow accumulator and window capture, shared with the TIMER1 interrupt.
pub static SHARED: EngineShared = EngineShared::new();

static EXECUTOR: StaticCell<Executor> = StaticCell::new();
static COUNTER: StaticCell<EdgeCounter> = StaticCell::new();

fn meter_config() -> MeterConfig {
    MeterConfig::default().with_generator_base_clock_hz(TIMER_CLOCK_HZ)
}

/// Prints the message of the panic that caused the last reset, if any.
#[cfg(not(debug_assertions))]
fn report_previous_panic() {
    if let Some(msg) = panic_persist::get_panic_message_utf8() {
        defmt::error!("Reset after panic: {}", msg);
    }
}

#[cfg(debug_assertions)]
fn report_previous_panic() {}

#[embassy_executor::task]
async fn main_task() {
    let spawner = Spawner::for_current_executor().await;

    let mut config = embassy_nrf::config::Config::default();
    // The gate, the generator and the time driver run from these.
    config.hfclk_source = embassy_nrf::config::HfclkSource::ExternalXtal;
    config.lfclk_source = embassy_nrf::config::LfclkSource::ExternalXtal;
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    report_previous_panic();
    let meter = unwrap!(meter_config().verify());

    spawner.must_spawn(tasks::watchdog_task(p.WDT, meter.window_us)); // This has to be the first one.

    let window_ticks = unwrap!(meter.window_ticks(GATE_CLOCK_HZ));
    let counter: &'static EdgeCounter = COUNTER.init(EdgeCounter::new(
        CounterPeripherals {
            timer: p.TIMER1,
            gate_timer: p.TIMER0,
            gpiote_ch: p.GPIOTE_CH0,
            led_gpiote_ch: p.GPIOTE_CH2,
            ppi_ch: p.PPI_CH0,
            gate_ppi_ch: p.PPI_CH2,
            pin_input: p.P0_11.degrade(),
            pin_led: p.P0_17.degrade(), // LED1 on the DK
        },
        meter.overflow_limit,
        window_ticks,
    ));
    let engine = unwrap!(MeasurementEngine::new(
        meter,
        counter,
        &SHARED,
        SignalWindowTimer,
        Reporter::without_display(UartLines),
    ));
    // Has to preempt the executor.
    counter.enable_overflow_interrupt(Priority::P1);

    spawner.must_spawn(tasks::window_task(engine.window_end()));
    spawner.must_spawn(tasks::serial_task(
        SerialPeripherals {
            instance: p.UARTE0,
            pin_tx: p.P0_06.degrade(),
            pin_rx: p.P0_08.degrade(),
        },
        GeneratorPeripherals {
            timer: p.TIMER2,
            gpiote_ch: p.GPIOTE_CH1,
            ppi_ch: p.PPI_CH1,
            pin_output: p.P0_12.degrade(),
        },
        meter,
    ));
    spawner.must_spawn(tasks::measurement_task(engine));
}

#[entry]
fn main() -> ! {
    info!("Booted successfully!");

    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| spawner.must_spawn(main_task()));
}
