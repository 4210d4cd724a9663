pub mod types;

pub use types::{GeneratorConfig, PwmTimer, TestSignalGenerator};

use crate::config::MeterConfig;
use crate::types::Error;

impl GeneratorConfig {
    /// Timing for `frequency_hz` derived from `base_clock_hz`.
    ///
    /// `resolution_bits = ceil(log2(base / f)) + 1`, done in integers: the
    /// smallest `k` with `f * 2^k >= base`, plus one. The duty for 50% is half
    /// of `2^resolution_bits`. Returns `None` for 0 Hz.
    ///
    /// There is no range check against what the peripheral can reach, that
    /// is up to the `PwmTimer`.
    pub fn for_frequency(base_clock_hz: u32, frequency_hz: u32) -> Option<Self> {
        if frequency_hz == 0 {
            return None;
        }

        let base = u64::from(base_clock_hz);
        let mut k: u8 = 0;
        while u64::from(frequency_hz) << k < base {
            k += 1;
        }

        let resolution_bits = k + 1;
        Some(Self {
            frequency_hz,
            resolution_bits,
            duty: (1u64 << resolution_bits) / 2,
        })
    }

    /// Period length in `2^resolution_bits` steps.
    pub fn period_steps(&self) -> u64 {
        1u64 << self.resolution_bits
    }

    /// Ticks of a `clock_hz` timer the output stays high, for toggle-style
    /// outputs. `None` if that is below one tick or does not fit a `u32`.
    pub fn half_period_ticks(&self, clock_hz: u32) -> Option<u32> {
        let ticks = (u64::from(clock_hz) * self.duty / self.period_steps())
            .checked_div(u64::from(self.frequency_hz))?;
        match ticks {
            0 => None,
            ticks => u32::try_from(ticks).ok(),
        }
    }
}

impl<P: PwmTimer> TestSignalGenerator<P> {
    pub fn new(pwm: P, base_clock_hz: u32) -> Self {
        Self {
            pwm,
            base_clock_hz,
            current: None,
        }
    }

    /// Generator dividing down from the configured base clock. Nothing is
    /// applied until the first `configure`.
    pub fn from_config(pwm: P, config: &MeterConfig) -> Self {
        Self::new(pwm, config.generator_base_clock_hz)
    }

    /// Retimes the output to `frequency_hz` at 50% duty.
    ///
    /// 0 Hz leaves the generator untouched and returns `Ok(None)`. Nothing
    /// else in the system is stopped for this.
    pub fn configure(&mut self, frequency_hz: u32) -> Result<Option<GeneratorConfig>, Error> {
        let Some(config) = GeneratorConfig::for_frequency(self.base_clock_hz, frequency_hz) else {
            debug!("Generator request of 0 Hz ignored");
            return Ok(None);
        };

        self.pwm.apply(&config).map_err(|_| Error::Generator)?;
        info!(
            "Generator at {} Hz, resolution {} bits, duty {}",
            config.frequency_hz,
            config.resolution_bits,
            config.duty
        );
        self.current = Some(config);

        Ok(Some(config))
    }

    /// Last configuration the peripheral accepted.
    pub fn current(&self) -> Option<GeneratorConfig> {
        self.current
    }

    pub fn base_clock_hz(&self) -> u32 {
        self.base_clock_hz
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    const APB: u32 = 80_000_000;

    #[test]
    fn resolution_uses_base_two_log() {
        // 80 MHz / 50 kHz = 1600, log2(1600) = 10.64, ceil 11, plus one.
        let config = GeneratorConfig::for_frequency(APB, 50_000).unwrap();
        assert_eq!(config.resolution_bits, 12);
        assert_eq!(config.duty, 2_048);
        assert_eq!(config.period_steps(), 4_096);

        // Exact powers of two are not rounded up.
        let config = GeneratorConfig::for_frequency(1_024, 1).unwrap();
        assert_eq!(config.resolution_bits, 11);

        // 80 MHz / 2 Hz = 40e6, needs 26 bits to cover, plus one.
        let config = GeneratorConfig::for_frequency(APB, 2).unwrap();
        assert_eq!(config.resolution_bits, 27);
        assert_eq!(config.duty, 1 << 26);
    }

    #[test]
    fn duty_is_half_the_period() {
        for f in [1, 3, 1_000, 123_457, 40_000_000] {
            let config = GeneratorConfig::for_frequency(APB, f).unwrap();
            assert_eq!(config.duty * 2, config.period_steps(), "f={f}");
        }
    }

    #[test]
    fn at_or_above_the_base_clock() {
        let config = GeneratorConfig::for_frequency(APB, APB).unwrap();
        assert_eq!(config.resolution_bits, 1);
        assert_eq!(config.duty, 1);

        let config = GeneratorConfig::for_frequency(APB, u32::MAX).unwrap();
        assert_eq!(config.resolution_bits, 1);
    }

    #[test]
    fn toggle_compare_values() {
        const HF: u32 = 16_000_000;
        let ticks = |f| GeneratorConfig::for_frequency(HF, f).unwrap().half_period_ticks(HF);

        assert_eq!(ticks(2), Some(4_000_000));
        assert_eq!(ticks(50_000), Some(160));
        assert_eq!(ticks(8_000_000), Some(1));
        // Faster than the timer can toggle.
        assert_eq!(ticks(9_000_000), None);
    }

    #[test]
    fn zero_is_not_a_frequency() {
        assert_eq!(GeneratorConfig::for_frequency(APB, 0), None);
    }

    #[derive(Default)]
    struct FakePwm {
        applied: Vec<GeneratorConfig>,
        reject_above: Option<u32>,
    }

    impl PwmTimer for FakePwm {
        type Error = ();

        fn apply(&mut self, config: &GeneratorConfig) -> Result<(), ()> {
            if self.reject_above.is_some_and(|max| config.frequency_hz > max) {
                return Err(());
            }
            self.applied.push(*config);
            Ok(())
        }
    }

    #[test]
    fn reconfigures_at_runtime() {
        let mut generator = TestSignalGenerator::new(FakePwm::default(), APB);
        assert_eq!(generator.current(), None);

        let first = generator.configure(2).unwrap().unwrap();
        let second = generator.configure(50_000).unwrap().unwrap();
        assert_eq!(generator.current(), Some(second));
        assert_eq!(generator.pwm().applied, [first, second]);
    }

    #[test]
    fn zero_request_is_a_no_op() {
        let mut generator = TestSignalGenerator::new(FakePwm::default(), APB);
        generator.configure(1_000).unwrap();
        assert_eq!(generator.configure(0), Ok(None));
        assert_eq!(generator.pwm().applied.len(), 1);
        assert_eq!(generator.current().unwrap().frequency_hz, 1_000);
    }

    #[test]
    fn base_clock_comes_from_the_meter_config() {
        let meter = MeterConfig::default().with_generator_base_clock_hz(16_000_000);
        let mut generator = TestSignalGenerator::from_config(FakePwm::default(), &meter);
        assert_eq!(generator.base_clock_hz(), 16_000_000);
        assert_eq!(generator.current(), None);

        // 16 MHz / 50 kHz = 320, needs 9 bits, plus one. At 80 MHz it would be 12.
        let config = generator.configure(50_000).unwrap().unwrap();
        assert_eq!(config.resolution_bits, 10);
        assert_eq!(config.half_period_ticks(meter.generator_base_clock_hz), Some(160));
    }

    #[test]
    fn rejected_config_keeps_the_old_one() {
        let pwm = FakePwm {
            reject_above: Some(10_000),
            ..Default::default()
        };
        let mut generator = TestSignalGenerator::new(pwm, APB);
        generator.configure(500).unwrap();
        assert_eq!(generator.configure(20_000), Err(Error::Generator));
        assert_eq!(generator.current().unwrap().frequency_hz, 500);
    }
}
