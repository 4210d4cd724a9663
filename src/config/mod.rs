// Public interfaces.
pub mod types;

pub use types::{ConfigError, MeterConfig};

/// Counter value that triggers an overflow event. Well below the 16-bit
/// ceiling so a late overflow interrupt can't lose counts.
pub const DEFAULT_OVERFLOW_LIMIT: u32 = 20_000;
/// Usable range of a 16-bit counter.
pub const DEFAULT_HARDWARE_CEILING: u32 = u16::MAX as u32;
/// One second.
pub const DEFAULT_WINDOW_US: u32 = 1_000_000;
pub const DEFAULT_GENERATOR_FREQUENCY_HZ: u32 = 2;
/// 80 MHz APB-style peripheral clock.
pub const DEFAULT_BASE_CLOCK_HZ: u32 = 80_000_000;
