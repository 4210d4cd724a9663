//! Gated edge counter on TIMER1, gated in hardware by TIMER0.
//!
//! GPIOTE channel 0 raises an event on every transition of the input pin and
//! PPI channel 0 routes it to the COUNT task, so edges are counted without the
//! CPU. The same PPI channel forks to GPIOTE channel 2, which toggles the LED
//! so it follows the input. CC1 holds the overflow limit: reaching it clears
//! the timer through the COMPARE1_CLEAR short and raises the TIMER1 interrupt,
//! which is the overflow event.
//!
//! TIMER0 runs from the 16 MHz clock for exactly one window and its COMPARE0
//! stops TIMER1 through PPI channel 2. The window task only picks up the
//! frozen count afterwards, so its latency does not change the window.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_nrf::gpio::{AnyPin, Pin};
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_nrf::pac::{self, interrupt};
use embassy_nrf::peripherals;

use freqmeter_fw::drivers::counter::GatedCounter;
use freqmeter_fw::types::RawCount;

use super::{gpiote, ppi_connect, ppi_fork};
use crate::SHARED;

/// TIMER0 with a prescaler of 0.
pub const GATE_CLOCK_HZ: u32 = 16_000_000;

const CAPTURE_CC: usize = 0;
const LIMIT_CC: usize = 1;
const GATE_CC: usize = 0;
const GPIOTE_CH: usize = 0;
const LED_GPIOTE_CH: usize = 2;
const PPI_CH: usize = 0;
const GATE_PPI_CH: usize = 2;

pub struct CounterPeripherals {
    pub timer: peripherals::TIMER1,
    pub gate_timer: peripherals::TIMER0,
    pub gpiote_ch: peripherals::GPIOTE_CH0,
    pub led_gpiote_ch: peripherals::GPIOTE_CH2,
    pub ppi_ch: peripherals::PPI_CH0,
    pub gate_ppi_ch: peripherals::PPI_CH2,
    pub pin_input: AnyPin,
    pub pin_led: AnyPin,
}

pub struct EdgeCounter {
    _per: CounterPeripherals,
    armed: AtomicBool,
}

fn timer1() -> &'static pac::timer0::RegisterBlock {
    unsafe { &*pac::TIMER1::ptr() }
}

fn timer0() -> &'static pac::timer0::RegisterBlock {
    unsafe { &*pac::TIMER0::ptr() }
}

impl EdgeCounter {
    /// Sets up the counting path. Both timers stay stopped until `arm`.
    ///
    /// `window_ticks` is the window length in `GATE_CLOCK_HZ` ticks.
    pub fn new(per: CounterPeripherals, limit: u32, window_ticks: u32) -> Self {
        let timer = timer1();
        timer.tasks_stop.write(|w| unsafe { w.bits(1) });
        timer.tasks_clear.write(|w| unsafe { w.bits(1) });
        timer.mode.write(|w| w.mode().counter());
        timer.bitmode.write(|w| w.bitmode()._16bit());
        timer.cc[LIMIT_CC].write(|w| unsafe { w.bits(limit) });
        timer.shorts.write(|w| w.compare1_clear().enabled());
        timer.events_compare[LIMIT_CC].write(|w| unsafe { w.bits(0) });
        timer.intenset.write(|w| w.compare1().set());

        let gate = timer0();
        gate.tasks_stop.write(|w| unsafe { w.bits(1) });
        gate.mode.write(|w| w.mode().timer());
        gate.bitmode.write(|w| w.bitmode()._32bit());
        gate.prescaler.write(|w| unsafe { w.prescaler().bits(0) });
        gate.cc[GATE_CC].write(|w| unsafe { w.bits(window_ticks) });
        gate.shorts
            .write(|w| w.compare0_clear().enabled().compare0_stop().enabled());
        ppi_connect(GATE_PPI_CH, &gate.events_compare[GATE_CC], &timer.tasks_stop);

        let pin = per.pin_input.pin();
        gpiote().config[GPIOTE_CH].write(|w| unsafe {
            w.mode().event().psel().bits(pin).polarity().toggle()
        });
        // The LED is active low, start with it off.
        let led = per.pin_led.pin();
        gpiote().config[LED_GPIOTE_CH].write(|w| unsafe {
            w.mode()
                .task()
                .psel()
                .bits(led)
                .polarity()
                .toggle()
                .outinit()
                .high()
        });
        ppi_fork(PPI_CH, &gpiote().tasks_out[LED_GPIOTE_CH]);
        ppi_connect(PPI_CH, &gpiote().events_in[GPIOTE_CH], &timer.tasks_count);

        Self {
            _per: per,
            armed: AtomicBool::new(false),
        }
    }

    /// Unmasks the overflow interrupt. Call once the accumulator can take it.
    pub fn enable_overflow_interrupt(&self, priority: Priority) {
        embassy_nrf::interrupt::TIMER1.set_priority(priority);
        unsafe { embassy_nrf::interrupt::TIMER1.enable() };
    }
}

impl GatedCounter for EdgeCounter {
    fn arm(&self) {
        let timer = timer1();
        let gate = timer0();
        timer.tasks_clear.write(|w| unsafe { w.bits(1) });
        gate.tasks_clear.write(|w| unsafe { w.bits(1) });
        gate.events_compare[GATE_CC].write(|w| unsafe { w.bits(0) });

        // Back to back, the gate opens and closes a fixed few cycles late.
        timer.tasks_start.write(|w| unsafe { w.bits(1) });
        gate.tasks_start.write(|w| unsafe { w.bits(1) });
        self.armed.store(true, Ordering::Release);
    }

    /// Usually the gate timer has already stopped the counter by now.
    fn disarm(&self) {
        timer1().tasks_stop.write(|w| unsafe { w.bits(1) });
        timer0().tasks_stop.write(|w| unsafe { w.bits(1) });
        self.armed.store(false, Ordering::Release);
    }

    fn read(&self) -> RawCount {
        let timer = timer1();
        timer.tasks_capture[CAPTURE_CC].write(|w| unsafe { w.bits(1) });
        timer.cc[CAPTURE_CC].read().bits()
    }

    fn clear(&self) {
        timer1().tasks_clear.write(|w| unsafe { w.bits(1) });
    }

    fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

#[interrupt]
fn TIMER1() {
    let timer = timer1();
    if timer.events_compare[LIMIT_CC].read().bits() != 0 {
        timer.events_compare[LIMIT_CC].write(|w| unsafe { w.bits(0) });
        SHARED.overflows.on_overflow();
    }
}
