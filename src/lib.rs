#![cfg_attr(not(test), no_std)]

//! Frequency meter core.
//!
//! A gated edge counter counts both edges of the input over a fixed window.
//! Counter wraps are accumulated from the overflow interrupt, the window
//! timer freezes the counter and hands the raw count over, and the consumer
//! turns the two into a frequency, reports it and starts the next window.

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod console;
pub mod drivers;
pub mod engine;
pub mod report;
pub mod types;

pub use config::MeterConfig;
pub use engine::{EngineShared, MeasurementEngine};
pub use types::{Error, Measurement};
