//! nRF52832 bindings for the meter traits.
//!
//! TIMER1, TIMER2, GPIOTE and PPI are driven at register level. The HAL
//! singletons are still taken and kept in the drivers, so nothing else in the
//! firmware can claim the same channels.

pub mod counter;
pub mod generator;
pub mod serial;
pub mod window;

use embassy_nrf::pac;

pub(crate) fn gpiote() -> &'static pac::gpiote::RegisterBlock {
    unsafe { &*pac::GPIOTE::ptr() }
}

/// Connects the `event` register to the `task` register on PPI channel `ch`
/// and enables the channel.
pub(crate) fn ppi_connect<E, T>(ch: usize, event: &E, task: &T) {
    let ppi = unsafe { &*pac::PPI::ptr() };
    ppi.ch[ch].eep.write(|w| unsafe { w.bits(event as *const E as u32) });
    ppi.ch[ch].tep.write(|w| unsafe { w.bits(task as *const T as u32) });
    ppi.chenset.write(|w| unsafe { w.bits(1 << ch) });
}

/// Adds `task` as the second task of PPI channel `ch`.
pub(crate) fn ppi_fork<T>(ch: usize, task: &T) {
    let ppi = unsafe { &*pac::PPI::ptr() };
    ppi.fork[ch].tep.write(|w| unsafe { w.bits(task as *const T as u32) });
}
