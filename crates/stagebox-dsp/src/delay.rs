//! Feedback delay on the system delay unit.

use serde::{Deserialize, Serialize};
use stagebox_core::{ComponentDescriptor, ParameterSpec, ParameterUnit, Result};

use crate::effect::{delegate_audio_node, EffectNode};

/// Parameter ids of the delay unit. Its own wet/dry (id 0) is left at the
/// unit default; mixing happens in the node's crossfade.
pub mod params {
    use stagebox_core::ParameterId;

    pub const TIME: ParameterId = ParameterId(1);
    pub const FEEDBACK: ParameterId = ParameterId(2);
    pub const LOW_PASS_CUTOFF: ParameterId = ParameterId(3);
}

static SPECS: [ParameterSpec; 3] = [
    ParameterSpec::new(params::TIME, "Delay Time", 0.0, 2.0, 1.0).with_unit(ParameterUnit::Seconds),
    ParameterSpec::new(params::FEEDBACK, "Feedback", -100.0, 100.0, 50.0)
        .with_unit(ParameterUnit::Percent),
    ParameterSpec::new(params::LOW_PASS_CUTOFF, "Low Pass Cutoff", 10.0, 22050.0, 15000.0)
        .with_unit(ParameterUnit::Hertz),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Seconds, 0 to 2
    pub time: f32,
    /// Percent, -100 to 100
    pub feedback: f32,
    /// Hz, 10 to 22050
    pub low_pass_cutoff: f32,
    pub dry_wet_mix: f32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            time: 1.0,
            feedback: 50.0,
            low_pass_cutoff: 15000.0,
            dry_wet_mix: 50.0,
        }
    }
}

/// Stereo delay with feedback and a low-pass filter in the feedback path.
#[derive(Debug, Clone)]
pub struct Delay {
    node: EffectNode,
}

impl Delay {
    pub const DESCRIPTOR: ComponentDescriptor = ComponentDescriptor::effect(*b"dely");

    pub fn new(config: DelayConfig) -> Result<Self> {
        let initial = [config.time, config.feedback, config.low_pass_cutoff];
        Ok(Self {
            node: EffectNode::new("Delay", Self::DESCRIPTOR, &SPECS, &initial, config.dry_wet_mix)?,
        })
    }

    pub fn specs() -> &'static [ParameterSpec] {
        &SPECS
    }

    pub fn node(&self) -> &EffectNode {
        &self.node
    }

    pub fn set_time(&self, seconds: f32) -> Result<()> {
        self.node.set_value_at(0, seconds)
    }

    pub fn time(&self) -> f32 {
        self.node.value_at(0)
    }

    pub fn set_feedback(&self, percent: f32) -> Result<()> {
        self.node.set_value_at(1, percent)
    }

    pub fn feedback(&self) -> f32 {
        self.node.value_at(1)
    }

    pub fn set_low_pass_cutoff(&self, hz: f32) -> Result<()> {
        self.node.set_value_at(2, hz)
    }

    pub fn low_pass_cutoff(&self) -> f32 {
        self.node.value_at(2)
    }
}

delegate_audio_node!(Delay);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stagebox_core::{clamp, Gains};

    #[test]
    fn test_delay_defaults_half_wet() {
        let delay = Delay::new(DelayConfig::default()).unwrap();
        assert_eq!(delay.time(), 1.0);
        assert_eq!(delay.feedback(), 50.0);
        assert_eq!(delay.low_pass_cutoff(), 15000.0);
        assert_eq!(delay.dry_wet_mix(), 50.0);
        assert_eq!(delay.gains(), Gains { dry: 0.5, wet: 0.5 });
    }

    #[test]
    fn test_delay_stop_start_restores_half_mix() {
        let delay = Delay::new(DelayConfig::default()).unwrap();
        delay.stop();
        assert_eq!(delay.gains(), Gains::BYPASS);
        delay.start();
        assert_eq!(delay.dry_wet_mix(), 50.0);
    }

    #[test]
    fn test_generic_access_matches_typed() {
        let delay = Delay::new(DelayConfig::default()).unwrap();
        let _ = delay.set_value(params::FEEDBACK, -150.0);
        assert_eq!(delay.feedback(), -100.0);
        assert_eq!(delay.value(params::FEEDBACK), Some(-100.0));
    }

    proptest! {
        #[test]
        fn cutoff_is_always_in_range(hz in proptest::num::f32::ANY) {
            let delay = Delay::new(DelayConfig::default()).unwrap();
            let _ = delay.set_low_pass_cutoff(hz);
            prop_assert_eq!(delay.low_pass_cutoff(), clamp(hz, 10.0, 22050.0));
        }
    }
}
