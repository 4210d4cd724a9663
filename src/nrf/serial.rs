use embassy_nrf::gpio::AnyPin;
use embassy_nrf::{bind_interrupts, peripherals, uarte};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use freqmeter_fw::report::{LineSink, LINE_LEN};

bind_interrupts!(pub struct Irqs {
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

/// A report line plus `\r\n`.
pub const TX_LINE_LEN: usize = LINE_LEN + 2;

pub struct SerialPeripherals {
    pub instance: peripherals::UARTE0,
    pub pin_tx: AnyPin,
    pub pin_rx: AnyPin,
}

/// Lines waiting for the UART writer.
pub static TX_LINES: Channel<CriticalSectionRawMutex, String<TX_LINE_LEN>, 4> = Channel::new();

pub fn uart_config() -> uarte::Config {
    let mut config = uarte::Config::default();
    config.parity = uarte::Parity::EXCLUDED;
    config.baudrate = uarte::Baudrate::BAUD115200;
    config
}

/// Hands report lines to the UART writer task. Never blocks: if the writer
/// falls behind, the line is dropped.
pub struct UartLines;

impl LineSink for UartLines {
    fn write_line(&mut self, line: &str) {
        let mut buf = String::new();
        if buf.push_str(line).and_then(|_| buf.push_str("\r\n")).is_err() {
            defmt::warn!("Line too long for the UART queue");
            return;
        }
        if TX_LINES.try_send(buf).is_err() {
            defmt::warn!("UART busy, line dropped");
        }
    }
}
