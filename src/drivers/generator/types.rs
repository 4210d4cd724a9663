/// Timing for a 50% duty square wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GeneratorConfig {
    pub frequency_hz: u32,
    /// Duty resolution in bits.
    pub resolution_bits: u8,
    /// Compare value for 50% at `resolution_bits`.
    pub duty: u64,
}

/// A PWM-class peripheral that can be retimed while running.
pub trait PwmTimer {
    type Error;

    fn apply(&mut self, config: &GeneratorConfig) -> Result<(), Self::Error>;
}

/// Square wave source used to check the counter path end to end.
pub struct TestSignalGenerator<P> {
    pub(super) pwm: P,
    pub(super) base_clock_hz: u32,
    pub(super) current: Option<GeneratorConfig>,
}
