use crate::types::Measurement;

/// Where finished measurements go.
pub trait MeasurementSink {
    fn emit(&mut self, measurement: &Measurement);
}

/// Line-oriented text output, for example a UART.
pub trait LineSink {
    fn write_line(&mut self, line: &str);
}

/// A character LCD or anything else addressed by column and row.
pub trait CharacterDisplay {
    type Error;

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), Self::Error>;
    fn print(&mut self, text: &str) -> Result<(), Self::Error>;
}

/// Stand-in display type for builds without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDisplay {}

/// Display backend, picked when the reporter is built.
pub enum DisplaySink<D> {
    None,
    CharacterDisplay(D),
}

/// A number rendered with a `.` between every group of three digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grouped {
    pub(super) negative: bool,
    pub(super) magnitude: u64,
    pub(super) radix: u32,
}

/// Formats measurements and hands them to the text stream and the display.
pub struct Reporter<W, D> {
    pub(super) stream: W,
    pub(super) display: DisplaySink<D>,
}
