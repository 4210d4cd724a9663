use super::{
    DEFAULT_BASE_CLOCK_HZ, DEFAULT_GENERATOR_FREQUENCY_HZ, DEFAULT_HARDWARE_CEILING,
    DEFAULT_OVERFLOW_LIMIT, DEFAULT_WINDOW_US,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroOverflowLimit,
    /// The limit has to stay strictly below what the counter can hold.
    LimitAboveCeiling,
    ZeroWindow,
    ZeroBaseClock,
}

// Declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeterConfig {
    /// Count at which the edge counter wraps and raises an overflow event.
    pub overflow_limit: u32,
    /// Largest value the counting hardware can hold.
    pub hardware_ceiling: u32,
    /// Measurement window in microseconds.
    pub window_us: u32,
    /// Frequency the test generator starts with.
    pub generator_frequency_hz: u32,
    /// Clock the test generator divides down from.
    pub generator_base_clock_hz: u32,
}

// Implementations
impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            overflow_limit: DEFAULT_OVERFLOW_LIMIT,
            hardware_ceiling: DEFAULT_HARDWARE_CEILING,
            window_us: DEFAULT_WINDOW_US,
            generator_frequency_hz: DEFAULT_GENERATOR_FREQUENCY_HZ,
            generator_base_clock_hz: DEFAULT_BASE_CLOCK_HZ,
        }
    }
}

impl MeterConfig {
    pub fn with_overflow_limit(mut self, limit: u32) -> Self {
        self.overflow_limit = limit;
        self
    }

    pub fn with_hardware_ceiling(mut self, ceiling: u32) -> Self {
        self.hardware_ceiling = ceiling;
        self
    }

    pub fn with_window_us(mut self, window_us: u32) -> Self {
        self.window_us = window_us;
        self
    }

    pub fn with_generator_frequency_hz(mut self, frequency_hz: u32) -> Self {
        self.generator_frequency_hz = frequency_hz;
        self
    }

    pub fn with_generator_base_clock_hz(mut self, base_clock_hz: u32) -> Self {
        self.generator_base_clock_hz = base_clock_hz;
        self
    }

    /// Window length in ticks of a `tick_hz` hardware timer. `None` if it
    /// rounds to zero or does not fit 32 bits.
    pub fn window_ticks(&self, tick_hz: u32) -> Option<u32> {
        let ticks = u64::from(self.window_us) * u64::from(tick_hz) / 1_000_000;
        match ticks {
            0 => None,
            ticks => u32::try_from(ticks).ok(),
        }
    }

    /// Checks that the fields are in the expected ranges.
    pub fn verify(self) -> Result<Self, ConfigError> {
        if self.overflow_limit == 0 {
            return Err(ConfigError::ZeroOverflowLimit);
        }
        if self.overflow_limit >= self.hardware_ceiling {
            return Err(ConfigError::LimitAboveCeiling);
        }
        if self.window_us == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.generator_base_clock_hz == 0 {
            return Err(ConfigError::ZeroBaseClock);
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MeterConfig::default();
        assert_eq!(config.overflow_limit, 20_000);
        assert_eq!(config.window_us, 1_000_000);
        assert_eq!(config.generator_frequency_hz, 2);
        assert_eq!(config.verify(), Ok(config));
    }

    #[test]
    fn limit_must_leave_headroom() {
        let config = MeterConfig::default()
            .with_hardware_ceiling(u16::MAX as u32)
            .with_overflow_limit(u16::MAX as u32);
        assert_eq!(config.verify(), Err(ConfigError::LimitAboveCeiling));

        let config = config.with_overflow_limit(u16::MAX as u32 - 1);
        assert!(config.verify().is_ok());
    }

    #[test]
    fn window_in_timer_ticks() {
        let config = MeterConfig::default();
        assert_eq!(config.window_ticks(16_000_000), Some(16_000_000));
        assert_eq!(config.window_ticks(1_000_000), Some(1_000_000));

        let config = config.with_window_us(250_000);
        assert_eq!(config.window_ticks(16_000_000), Some(4_000_000));

        // 300 s at 16 MHz is past 32 bits, 1 us at 32 kHz is under a tick.
        assert_eq!(config.with_window_us(300_000_000).window_ticks(16_000_000), None);
        assert_eq!(config.with_window_us(1).window_ticks(32_768), None);
    }

    #[test]
    fn rejects_zero_values() {
        let base = MeterConfig::default();
        assert_eq!(
            base.with_overflow_limit(0).verify(),
            Err(ConfigError::ZeroOverflowLimit)
        );
        assert_eq!(base.with_window_us(0).verify(), Err(ConfigError::ZeroWindow));
        assert_eq!(
            base.with_generator_base_clock_hz(0).verify(),
            Err(ConfigError::ZeroBaseClock)
        );
    }
}
