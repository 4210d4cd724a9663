//! Square wave output on TIMER2.
//!
//! TIMER2 runs from the 16 MHz clock and clears itself on COMPARE0. Each
//! compare toggles the pin through GPIOTE channel 1 and PPI channel 1, so CC0
//! is half a period.

use defmt::Format;
use embassy_nrf::gpio::{AnyPin, Pin};
use embassy_nrf::{pac, peripherals};

use freqmeter_fw::drivers::generator::{GeneratorConfig, PwmTimer};

use super::{gpiote, ppi_connect};

/// TIMER2 with a prescaler of 0.
pub const TIMER_CLOCK_HZ: u32 = 16_000_000;

const PERIOD_CC: usize = 0;
const GPIOTE_CH: usize = 1;
const PPI_CH: usize = 1;

pub struct GeneratorPeripherals {
    pub timer: peripherals::TIMER2,
    pub gpiote_ch: peripherals::GPIOTE_CH1,
    pub ppi_ch: peripherals::PPI_CH1,
    pub pin_output: AnyPin,
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneError {
    /// The half period is under one tick or over 32 bits.
    OutOfRange,
}

pub struct ToneGenerator {
    _per: GeneratorPeripherals,
}

fn timer2() -> &'static pac::timer0::RegisterBlock {
    unsafe { &*pac::TIMER2::ptr() }
}

impl ToneGenerator {
    /// Output starts low and stays there until the first `apply`.
    pub fn new(per: GeneratorPeripherals) -> Self {
        let timer = timer2();
        timer.tasks_stop.write(|w| unsafe { w.bits(1) });
        timer.mode.write(|w| w.mode().timer());
        timer.bitmode.write(|w| w.bitmode()._32bit());
        timer.prescaler.write(|w| unsafe { w.prescaler().bits(0) });
        timer.shorts.write(|w| w.compare0_clear().enabled());

        let pin = per.pin_output.pin();
        gpiote().config[GPIOTE_CH].write(|w| unsafe {
            w.mode()
                .task()
                .psel()
                .bits(pin)
                .polarity()
                .toggle()
                .outinit()
                .low()
        });
        ppi_connect(
            PPI_CH,
            &timer.events_compare[PERIOD_CC],
            &gpiote().tasks_out[GPIOTE_CH],
        );

        Self { _per: per }
    }
}

impl PwmTimer for ToneGenerator {
    type Error = ToneError;

    fn apply(&mut self, config: &GeneratorConfig) -> Result<(), ToneError> {
        let ticks = config
            .half_period_ticks(TIMER_CLOCK_HZ)
            .ok_or(ToneError::OutOfRange)?;

        let timer = timer2();
        timer.tasks_stop.write(|w| unsafe { w.bits(1) });
        timer.tasks_clear.write(|w| unsafe { w.bits(1) });
        timer.cc[PERIOD_CC].write(|w| unsafe { w.bits(ticks) });
        timer.tasks_start.write(|w| unsafe { w.bits(1) });

        Ok(())
    }
}
