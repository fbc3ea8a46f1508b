//! Dynamics effects backed by the system dynamics and limiter units.
//!
//! ## Compressors
//!
//! - [`Compressor`] - Threshold, head room, attack/release, master gain
//! - [`DynamicsProcessor`] - Compressor plus downward expansion
//!
//! ## Limiters
//!
//! - [`PeakLimiter`] - Look-ahead peak limiter
//!
//! ## Example
//!
//! ```
//! use stagebox_dsp::{Compressor, CompressorConfig};
//!
//! let comp = Compressor::new(CompressorConfig {
//!     threshold: -12.0,
//!     attack_time: 0.005,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! assert_eq!(comp.threshold(), -12.0);
//! assert!(comp.is_started());
//! ```

mod compressor;
mod dynamics_processor;
mod peak_limiter;

pub use compressor::{Compressor, CompressorConfig};
pub use dynamics_processor::{DynamicsProcessor, DynamicsProcessorConfig};
pub use peak_limiter::{PeakLimiter, PeakLimiterConfig};

use stagebox_core::{ComponentDescriptor, ParameterSpec, ParameterUnit};

/// Parameter and metric ids of the dynamics processor unit.
pub mod params {
    use stagebox_core::ParameterId;

    pub const THRESHOLD: ParameterId = ParameterId(0);
    pub const HEAD_ROOM: ParameterId = ParameterId(1);
    pub const EXPANSION_RATIO: ParameterId = ParameterId(2);
    pub const EXPANSION_THRESHOLD: ParameterId = ParameterId(3);
    pub const ATTACK_TIME: ParameterId = ParameterId(4);
    pub const RELEASE_TIME: ParameterId = ParameterId(5);
    pub const MASTER_GAIN: ParameterId = ParameterId(6);

    // Read-only metering
    pub const COMPRESSION_AMOUNT: ParameterId = ParameterId(1000);
    pub const INPUT_AMPLITUDE: ParameterId = ParameterId(2000);
    pub const OUTPUT_AMPLITUDE: ParameterId = ParameterId(3000);
}

pub(crate) const DYNAMICS_UNIT: ComponentDescriptor = ComponentDescriptor::effect(*b"dcmp");

pub(crate) const THRESHOLD: ParameterSpec =
    ParameterSpec::new(params::THRESHOLD, "Threshold", -40.0, 20.0, -20.0)
        .with_unit(ParameterUnit::Decibels);
pub(crate) const HEAD_ROOM: ParameterSpec =
    ParameterSpec::new(params::HEAD_ROOM, "Head Room", 0.1, 40.0, 5.0)
        .with_unit(ParameterUnit::Decibels);
pub(crate) const ATTACK_TIME: ParameterSpec =
    ParameterSpec::new(params::ATTACK_TIME, "Attack Time", 0.0001, 0.2, 0.001)
        .with_unit(ParameterUnit::Seconds);
pub(crate) const MASTER_GAIN: ParameterSpec =
    ParameterSpec::new(params::MASTER_GAIN, "Master Gain", -40.0, 40.0, 0.0)
        .with_unit(ParameterUnit::Decibels);

/// Release time with a per-effect default.
pub(crate) const fn release_time(default: f32) -> ParameterSpec {
    ParameterSpec::new(params::RELEASE_TIME, "Release Time", 0.01, 3.0, default)
        .with_unit(ParameterUnit::Seconds)
}

