//! Effect nodes: black-box units behind a clamped parameter surface and a
//! dry/wet bypass crossfade.
//!
//! Every effect wraps an [`EffectNode`], which owns the parameter values, the
//! bridge to the backing unit and the crossfade mixer. Concrete effects add a
//! config struct and typed accessors.

mod effect;
pub use effect::EffectNode;

#[cfg(feature = "dynamics")]
pub mod dynamics;
#[cfg(feature = "dynamics")]
pub use dynamics::{
    Compressor, CompressorConfig, DynamicsProcessor, DynamicsProcessorConfig, PeakLimiter,
    PeakLimiterConfig,
};

#[cfg(feature = "delay")]
pub mod delay;
#[cfg(feature = "delay")]
pub use delay::{Delay, DelayConfig};
