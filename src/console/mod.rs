//! Operator input: one decimal number per line, asking the test generator
//! for a new frequency.

use heapless::Vec;

/// Longest line we keep. Anything longer is dropped whole.
pub const LINE_CAPACITY: usize = 32;

/// Parses a number the lenient way: leading whitespace and one sign are
/// skipped, digits are read up to the first non-digit. No digits reads as 0.
/// Returns `None` when the value does not fit an `i64`.
pub fn parse_integer(line: &[u8]) -> Option<i64> {
    let mut bytes = line
        .iter()
        .copied()
        .skip_while(|b| b.is_ascii_whitespace())
        .peekable();

    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for digit in bytes.take_while(u8::is_ascii_digit) {
        let digit = i64::from(digit - b'0');
        value = value.checked_mul(10)?;
        value = if negative {
            value.checked_sub(digit)?
        } else {
            value.checked_add(digit)?
        };
    }

    Some(value)
}

/// A generator frequency request. Zero, negative and unreadable input mean
/// "no change".
pub fn parse_frequency(line: &[u8]) -> Option<u32> {
    match parse_integer(line) {
        Some(value) if value > 0 => u32::try_from(value).ok(),
        _ => None,
    }
}

/// Collects console bytes into lines.
pub struct LineBuffer {
    buf: Vec<u8, LINE_CAPACITY>,
    overrun: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overrun: false,
        }
    }

    /// Feeds one byte. On `\n` returns the requested frequency, if the line
    /// held one.
    pub fn push(&mut self, byte: u8) -> Option<u32> {
        if byte != b'\n' {
            if self.buf.push(byte).is_err() {
                self.overrun = true;
            }
            return None;
        }

        let request = if self.overrun {
            warn!("Console line longer than {} bytes dropped", LINE_CAPACITY);
            None
        } else {
            parse_frequency(&self.buf)
        };
        self.buf.clear();
        self.overrun = false;

        request
    }

    /// Feeds a chunk, returning the last request it completed.
    pub fn extend(&mut self, bytes: &[u8]) -> Option<u32> {
        bytes.iter().fold(None, |last, &b| self.push(b).or(last))
    }

    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_like_the_console_expects() {
        assert_eq!(parse_integer(b"50000"), Some(50_000));
        assert_eq!(parse_integer(b"  42\r"), Some(42));
        assert_eq!(parse_integer(b"+7"), Some(7));
        assert_eq!(parse_integer(b"-12"), Some(-12));
        assert_eq!(parse_integer(b"12abc"), Some(12));
        assert_eq!(parse_integer(b"abc"), Some(0));
        assert_eq!(parse_integer(b""), Some(0));
        assert_eq!(parse_integer(b"99999999999999999999"), None);
    }

    #[test]
    fn only_positive_values_are_requests() {
        assert_eq!(parse_frequency(b"1000"), Some(1_000));
        assert_eq!(parse_frequency(b"0"), None);
        assert_eq!(parse_frequency(b"-5"), None);
        assert_eq!(parse_frequency(b"hello"), None);
        assert_eq!(parse_frequency(b"4294967296"), None);
    }

    #[test]
    fn line_buffer_yields_on_newline() {
        let mut lines = LineBuffer::new();
        for &b in b"2500\r" {
            assert_eq!(lines.push(b), None);
        }
        assert_eq!(lines.pending(), b"2500\r");
        assert_eq!(lines.push(b'\n'), Some(2_500));
        assert!(lines.pending().is_empty());

        assert_eq!(lines.extend(b"0\n"), None);
        assert_eq!(lines.extend(b"10\n20\n"), Some(20));
    }

    #[test]
    fn overlong_lines_are_dropped() {
        let mut lines = LineBuffer::new();
        let long = [b'1'; LINE_CAPACITY + 5];
        assert_eq!(lines.extend(&long), None);
        assert_eq!(lines.push(b'\n'), None);
        // The next line is parsed normally again.
        assert_eq!(lines.extend(b"300\n"), Some(300));
    }
}
