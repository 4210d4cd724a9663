pub mod types;

use core::convert::Infallible;
use core::fmt::{self, Write};

use heapless::String;

pub use types::{
    CharacterDisplay, DisplaySink, Grouped, LineSink, MeasurementSink, NoDisplay, Reporter,
};

use crate::types::Measurement;

/// Enough for `frequencia: ` and a grouped `u64`.
pub const LINE_LEN: usize = 48;
pub const DISPLAY_COLUMNS: usize = 16;
/// Where the reading goes on the display, (column, row).
pub const DISPLAY_READING_AT: (u8, u8) = (2, 1);
pub const DISPLAY_BANNER: &str = "Frequencimetro";

impl Grouped {
    pub const SEPARATOR: char = '.';

    pub fn new(value: u64) -> Self {
        Self {
            negative: false,
            magnitude: value,
            radix: 10,
        }
    }

    pub fn signed(value: i64) -> Self {
        Self {
            negative: value < 0,
            magnitude: value.unsigned_abs(),
            radix: 10,
        }
    }

    /// Radixes outside `2..=36` render as an empty string.
    pub fn with_radix(mut self, radix: u32) -> Self {
        self.radix = radix;
        self
    }
}

impl fmt::Display for Grouped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !(2..=36).contains(&self.radix) {
            return Ok(());
        }

        // Only decimal output gets a sign. Other radixes print the two's
        // complement bit pattern.
        let magnitude = match (self.negative, self.radix) {
            (true, 10) => {
                f.write_char('-')?;
                self.magnitude
            }
            (true, _) => self.magnitude.wrapping_neg(),
            (false, _) => self.magnitude,
        };

        write_digits(f, magnitude, self.radix, 0)
    }
}

/// Most significant digit first; `pos` counts digits from the right, and a
/// separator follows every digit whose position is a non-zero multiple of 3.
fn write_digits<W: Write>(out: &mut W, value: u64, radix: u32, pos: u32) -> fmt::Result {
    let radix_wide = u64::from(radix);
    if value >= radix_wide {
        write_digits(out, value / radix_wide, radix, pos + 1)?;
    }

    let digit = (value % radix_wide) as u32;
    out.write_char(char::from_digit(digit, radix).unwrap_or('?'))?;
    if pos != 0 && pos % 3 == 0 {
        out.write_char(Grouped::SEPARATOR)?;
    }

    Ok(())
}

/// `frequencia: 1.234.567 Hz`
pub fn measurement_line(measurement: &Measurement) -> String<LINE_LEN> {
    let mut line = String::new();
    // Always fits, see LINE_LEN.
    let _ = write!(line, "frequencia: {} Hz", Grouped::new(measurement.frequency_hz));
    line
}

/// The reading as shown on the display, padded with spaces so a shorter value
/// overwrites a longer one.
pub fn display_text(measurement: &Measurement) -> String<DISPLAY_COLUMNS> {
    let mut text: String<DISPLAY_COLUMNS> = String::new();
    let width = DISPLAY_COLUMNS - DISPLAY_READING_AT.0 as usize;
    let mut full: String<LINE_LEN> = String::new();
    let _ = write!(full, "{} Hz", Grouped::new(measurement.frequency_hz));

    for c in full.chars().chain(core::iter::repeat(' ')).take(width) {
        let _ = text.push(c);
    }
    text
}

impl<T: MeasurementSink + ?Sized> MeasurementSink for &mut T {
    fn emit(&mut self, measurement: &Measurement) {
        (**self).emit(measurement)
    }
}

impl CharacterDisplay for NoDisplay {
    type Error = Infallible;

    fn set_cursor(&mut self, _col: u8, _row: u8) -> Result<(), Self::Error> {
        match *self {}
    }

    fn print(&mut self, _text: &str) -> Result<(), Self::Error> {
        match *self {}
    }
}

impl<D: CharacterDisplay> DisplaySink<D> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, DisplaySink::CharacterDisplay(_))
    }

    fn show_at(&mut self, (col, row): (u8, u8), text: &str) -> Result<(), D::Error> {
        match self {
            DisplaySink::None => Ok(()),
            DisplaySink::CharacterDisplay(display) => {
                display.set_cursor(col, row)?;
                display.print(text)
            }
        }
    }
}

impl<W: LineSink> Reporter<W, NoDisplay> {
    pub fn without_display(stream: W) -> Self {
        Reporter::new(stream, DisplaySink::None)
    }
}

impl<W: LineSink, D: CharacterDisplay> Reporter<W, D> {
    pub fn new(stream: W, display: DisplaySink<D>) -> Self {
        Self { stream, display }
    }

    /// Puts the start-up banner on the display.
    pub fn begin(&mut self) {
        if self.display.show_at((0, 0), DISPLAY_BANNER).is_err() {
            warn!("Display did not accept the banner");
        }
    }

    pub fn stream(&self) -> &W {
        &self.stream
    }

    pub fn display(&self) -> &DisplaySink<D> {
        &self.display
    }
}

impl<W: LineSink, D: CharacterDisplay> MeasurementSink for Reporter<W, D> {
    fn emit(&mut self, measurement: &Measurement) {
        self.stream.write_line(&measurement_line(measurement));

        if self
            .display
            .show_at(DISPLAY_READING_AT, &display_text(measurement))
            .is_err()
        {
            warn!("Display did not accept the reading");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::{String as StdString, ToString};
    use std::vec::Vec;

    fn grouped(value: i64) -> StdString {
        Grouped::signed(value).to_string()
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(grouped(1_234_567), "1.234.567");
        assert_eq!(grouped(0), "0");
        assert_eq!(grouped(7), "7");
        assert_eq!(grouped(999), "999");
        assert_eq!(grouped(1_000), "1.000");
        assert_eq!(grouped(100_000), "100.000");
        assert_eq!(grouped(12_345_678), "12.345.678");
    }

    #[test]
    fn sign_goes_before_the_groups() {
        assert_eq!(grouped(-1), "-1");
        assert_eq!(grouped(-1_234_567), "-1.234.567");
        assert_eq!(grouped(i64::MIN), "-9.223.372.036.854.775.808");
    }

    #[test]
    fn full_u64_range() {
        assert_eq!(
            Grouped::new(u64::MAX).to_string(),
            "18.446.744.073.709.551.615"
        );
    }

    #[test]
    fn other_radixes() {
        assert_eq!(Grouped::new(255).with_radix(16).to_string(), "ff");
        assert_eq!(Grouped::new(0x12345).with_radix(16).to_string(), "12.345");
        assert_eq!(Grouped::new(8).with_radix(2).to_string(), "1.000");
        assert_eq!(
            Grouped::signed(-1).with_radix(16).to_string(),
            "f.fff.fff.fff.fff.fff"
        );
        assert_eq!(Grouped::new(10).with_radix(1).to_string(), "");
        assert_eq!(Grouped::new(10).with_radix(37).to_string(), "");
    }

    #[test]
    fn line_format() {
        let m = Measurement::from_counts(0, 1, 20_000, 1_000_000);
        assert_eq!(measurement_line(&m).as_str(), "frequencia: 10.000 Hz");

        let m = Measurement::from_counts(0, 0, 20_000, 1_000_000);
        assert_eq!(measurement_line(&m).as_str(), "frequencia: 0 Hz");
    }

    #[test]
    fn display_text_is_padded() {
        let m = Measurement::from_counts(0, 1, 20_000, 1_000_000);
        assert_eq!(display_text(&m).as_str(), "10.000 Hz     ");
    }

    #[derive(Default)]
    struct Lines(Vec<StdString>);

    impl LineSink for Lines {
        fn write_line(&mut self, line: &str) {
            self.0.push(line.to_string());
        }
    }

    #[derive(Default)]
    struct FakeLcd {
        writes: Vec<((u8, u8), StdString)>,
        cursor: (u8, u8),
        fail: bool,
    }

    impl CharacterDisplay for FakeLcd {
        type Error = ();

        fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), ()> {
            self.cursor = (col, row);
            Ok(())
        }

        fn print(&mut self, text: &str) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.writes.push((self.cursor, text.to_string()));
            Ok(())
        }
    }

    #[test]
    fn reporter_without_display_only_streams() {
        let mut reporter = Reporter::without_display(Lines::default());
        reporter.begin();
        reporter.emit(&Measurement::from_counts(1_234, 61, 20_000, 1_000_000));

        assert!(!reporter.display().is_enabled());
        assert_eq!(reporter.stream().0, ["frequencia: 610.617 Hz"]);
    }

    #[test]
    fn reporter_drives_the_display() {
        let mut reporter = Reporter::new(
            Lines::default(),
            DisplaySink::CharacterDisplay(FakeLcd::default()),
        );
        reporter.begin();
        reporter.emit(&Measurement::from_counts(0, 2, 20_000, 1_000_000));

        let DisplaySink::CharacterDisplay(lcd) = reporter.display() else {
            panic!("display missing");
        };
        assert_eq!(
            lcd.writes,
            [
                ((0, 0), "Frequencimetro".to_string()),
                ((2, 1), "20.000 Hz     ".to_string()),
            ]
        );
        assert_eq!(reporter.stream().0, ["frequencia: 20.000 Hz"]);
    }

    #[test]
    fn display_errors_do_not_stop_the_stream() {
        let lcd = FakeLcd {
            fail: true,
            ..Default::default()
        };
        let mut reporter = Reporter::new(Lines::default(), DisplaySink::CharacterDisplay(lcd));
        reporter.emit(&Measurement::from_counts(2, 0, 20_000, 1_000_000));
        assert_eq!(reporter.stream().0, ["frequencia: 1 Hz"]);
    }
}
