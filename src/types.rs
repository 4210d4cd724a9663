use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The meter configuration failed verification.
    Config(ConfigError),
    /// The generator peripheral rejected a configuration.
    Generator,
    /// Console receive failed.
    Console,
}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        Error::Config(value)
    }
}

const ONE_SECOND_US: u32 = 1_000_000;

/// Edge count captured at the end of a window, always below the overflow limit.
pub type RawCount = u32;

/// One completed measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub frequency_hz: u64,
    pub raw: RawCount,
    pub overflows: u32,
}

impl Measurement {
    /// Builds a measurement from the captured counter state.
    pub fn from_counts(raw: RawCount, overflows: u32, overflow_limit: u32, window_us: u32) -> Self {
        let frequency_hz = if window_us == ONE_SECOND_US {
            compute_frequency(raw, overflows, overflow_limit)
        } else {
            let edges = u128::from(raw) + u128::from(overflows) * u128::from(overflow_limit);
            let hz = edges * u128::from(ONE_SECOND_US) / (2 * u128::from(window_us.max(1)));
            u64::try_from(hz).unwrap_or(u64::MAX)
        };

        Self {
            frequency_hz,
            raw,
            overflows,
        }
    }

    /// Total number of counted edges, rising and falling.
    pub fn edges(&self, overflow_limit: u32) -> u64 {
        u64::from(self.raw) + u64::from(self.overflows) * u64::from(overflow_limit)
    }
}

/// Frequency in Hz over a one second window.
///
/// The counter sees both edges of every cycle, hence the division by two. Odd
/// totals truncate, which costs at most half a hertz.
#[inline]
pub fn compute_frequency(raw: RawCount, overflows: u32, overflow_limit: u32) -> u64 {
    (u64::from(raw) + u64::from(overflows) * u64::from(overflow_limit)) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u32 = 20_000;

    #[test]
    fn frequency_table() {
        let cases: &[(u32, u32, u64)] = &[
            (0, 0, 0),
            (100, 0, 50),
            (0, 1, 10_000),
            (1, 1, 10_000),
            (19_999, 0, 9_999),
            (19_999, 1, 19_999),
            (2, 3, 30_001),
            (0, 1_000, 10_000_000),
        ];

        for &(raw, overflows, expected) in cases {
            assert_eq!(
                compute_frequency(raw, overflows, LIMIT),
                expected,
                "raw={raw} overflows={overflows}"
            );
        }
    }

    #[test]
    fn large_overflow_counts_do_not_wrap() {
        let hz = compute_frequency(LIMIT - 1, u32::MAX, LIMIT);
        assert_eq!(hz, (u64::from(u32::MAX) * 20_000 + 19_999) / 2);
    }

    #[test]
    fn measurement_keeps_inputs() {
        let m = Measurement::from_counts(7, 2, LIMIT, ONE_SECOND_US);
        assert_eq!(m.frequency_hz, 20_003);
        assert_eq!(m.raw, 7);
        assert_eq!(m.overflows, 2);
        assert_eq!(m.edges(LIMIT), 40_007);
    }

    #[test]
    fn shorter_windows_scale_up() {
        // 100 ms of a 10 kHz square wave: 2000 edges.
        let m = Measurement::from_counts(2_000, 0, LIMIT, 100_000);
        assert_eq!(m.frequency_hz, 10_000);

        // 2 s of the same signal: 40 000 edges, two wraps.
        let m = Measurement::from_counts(0, 2, LIMIT, 2_000_000);
        assert_eq!(m.frequency_hz, 10_000);
    }
}
